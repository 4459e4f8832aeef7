// Copyright 2025 The secquest Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::Form;
use axum::extract::State;
use axum::response::Redirect;
use secquest_core::answer::Answer;
use secquest_core::error::ErrorReport;
use secquest_core::error::Fallible;
use secquest_core::error::fail;
use secquest_core::game::RunStart;
use secquest_core::run::RunSetup;
use secquest_core::types::question::Domain;
use secquest_core::types::question::QuestionBody;
use secquest_core::types::run::RunMode;
use secquest_core::types::timestamp::Timestamp;

use crate::cmd::play::state::MutableState;
use crate::cmd::play::state::ServerState;

/// Questions in an adventure or boss run unless the form says otherwise.
pub const DEFAULT_RUN_SIZE: usize = 10;

/// A submitted form, kept as ordered pairs since some fields repeat.
struct Fields(Vec<(String, String)>);

impl Fields {
    fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn all(&self, name: &str) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(move |(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn require(&self, name: &str) -> Fallible<&str> {
        match self.get(name) {
            Some(value) => Ok(value),
            None => fail(format!("missing field '{name}'")),
        }
    }

    fn indices(&self, name: &str) -> Fallible<Vec<usize>> {
        self.all(name).map(parse_index).collect()
    }
}

fn parse_index(value: &str) -> Fallible<usize> {
    value
        .parse()
        .map_err(|_| ErrorReport::new(format!("invalid number: '{value}'")))
}

pub async fn post_handler(
    State(state): State<ServerState>,
    Form(form): Form<Vec<(String, String)>>,
) -> Redirect {
    let fields = Fields(form);
    let action = fields.get("action").unwrap_or_default().to_string();
    if action == "Shutdown" {
        shutdown(&state);
        return Redirect::to("/");
    }
    match state.lock() {
        Ok(mut mutable) => {
            if let Err(e) = action_handler(&mut mutable, &action, &fields) {
                log::warn!("Action '{action}' failed: {e}");
                mutable.error = Some(e.message().to_string());
            }
        }
        Err(e) => log::error!("{e}"),
    }
    Redirect::to("/")
}

fn shutdown(state: &ServerState) {
    log::debug!("Shutdown requested");
    if let Ok(mut tx) = state.shutdown_tx.lock() {
        if let Some(tx) = tx.take() {
            let _ = tx.send(());
        }
    }
}

fn action_handler(mutable: &mut MutableState, action: &str, fields: &Fields) -> Fallible<()> {
    let now = Timestamp::now();
    match action {
        "Start" => {
            let mode = RunMode::try_from(fields.require("mode")?.to_string())?;
            let domains = fields
                .all("domain")
                .map(|d| Domain::try_from(parse_index(d)?.min(u8::MAX as usize) as u8))
                .collect::<Fallible<Vec<_>>>()?;
            let count = match mode {
                RunMode::Forge => mutable.game.settings().forge_size,
                RunMode::Adventure | RunMode::Boss => match fields.get("count") {
                    Some(count) => parse_index(count)?.max(1),
                    None => DEFAULT_RUN_SIZE,
                },
            };
            let setup = RunSetup {
                mode,
                domains,
                count,
            };
            if let RunStart::Started { .. } = mutable.game.start_run(setup, now)? {
                mutable.show_result = false;
            }
        }
        "Answer" => {
            let answer = read_answer(mutable, fields)?;
            mutable.game.submit_answer(&answer, now)?;
        }
        "Choose" => {
            let index = parse_index(fields.require("choice")?)?;
            mutable.game.choose_scenario(index, now)?;
        }
        "Next" => {
            mutable.game.next_question();
        }
        "End" => {
            if mutable.game.end_run(now)?.is_some() {
                mutable.show_result = true;
            }
        }
        "Continue" => {
            mutable.show_result = false;
        }
        _ => return fail(format!("unknown action '{action}'")),
    }
    Ok(())
}

/// Build an answer of the shape the current question expects.
fn read_answer(mutable: &MutableState, fields: &Fields) -> Fallible<Answer> {
    let Some(question) = mutable.game.run().and_then(|r| r.current_question()) else {
        return fail("no question to answer");
    };
    match &question.body {
        QuestionBody::Mcq { .. } => match fields.get("choice") {
            Some(choice) => Ok(Answer::Choice(parse_index(choice)?)),
            None => fail("pick an answer first"),
        },
        QuestionBody::Multi { .. } => Ok(Answer::Choices(fields.indices("choice")?)),
        QuestionBody::Matching { .. } => Ok(Answer::Matches(fields.indices("match")?)),
        QuestionBody::Ordering { .. } => Ok(Answer::Order(fields.indices("order")?)),
        QuestionBody::Scenario { .. } => fail("scenario questions are answered with Choose"),
    }
}
