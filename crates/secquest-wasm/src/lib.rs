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

//! WASM bindings for secquest - runs the game in the browser.

use std::fmt::Display;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use secquest_core::answer::Answer;
use secquest_core::bank::QuestionBank;
use secquest_core::game::Game;
use secquest_core::game::RunStart;
use secquest_core::markdown::markdown_to_html;
use secquest_core::run::RunSetup;
use secquest_core::storage::SaveFile;
use secquest_core::types::date::Date;
use secquest_core::types::question::Domain;
use secquest_core::types::run::RunMode;
use secquest_core::types::settings::SettingsPatch;
use secquest_core::types::timestamp::Timestamp;

mod storage;

use storage::LocalStorage;

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("secquest WASM initialized");
}

fn js_error(e: impl Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_json(value: &impl Serialize) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(js_error)
}

fn parse_now(now: &str) -> Result<Timestamp, JsValue> {
    Timestamp::try_from(now.to_string()).map_err(|e| js_error(format!("Invalid timestamp: {e}")))
}

/// The game as seen from JavaScript. Structured values cross the boundary as
/// JSON strings.
#[wasm_bindgen]
pub struct QuestApp {
    game: Game<LocalStorage>,
}

#[wasm_bindgen]
impl QuestApp {
    /// Load the game. Takes an array of [filename, content] pairs holding
    /// question pack JSON, and today's date (YYYY-MM-DD).
    #[wasm_bindgen(constructor)]
    pub fn new(files_json: &str, today: &str) -> Result<QuestApp, JsValue> {
        let files: Vec<(String, String)> = serde_json::from_str(files_json)
            .map_err(|e| js_error(format!("Failed to parse files JSON: {e}")))?;
        let bank = QuestionBank::load(
            files
                .iter()
                .map(|(name, content)| (name.as_str(), content.as_str())),
        );
        let today = Date::try_from(today.to_string())
            .map_err(|e| js_error(format!("Invalid date: {e}")))?;
        let seed = js_sys::Date::now() as u64;
        let game = Game::load(LocalStorage::new(), bank, today, seed).map_err(js_error)?;
        Ok(Self { game })
    }

    /// Number of questions in the bank.
    #[wasm_bindgen]
    pub fn bank_size(&self) -> usize {
        self.game.bank().len()
    }

    #[wasm_bindgen]
    pub fn profile_json(&self) -> Result<String, JsValue> {
        to_json(self.game.profile())
    }

    #[wasm_bindgen]
    pub fn settings_json(&self) -> Result<String, JsValue> {
        to_json(self.game.settings())
    }

    #[wasm_bindgen]
    pub fn history_json(&self) -> Result<String, JsValue> {
        to_json(&self.game.history())
    }

    /// The current run, or `null`.
    #[wasm_bindgen]
    pub fn run_json(&self) -> Result<String, JsValue> {
        to_json(&self.game.run())
    }

    /// The walk through the current scenario question, or `null`.
    #[wasm_bindgen]
    pub fn scenario_json(&self) -> Result<String, JsValue> {
        to_json(&self.game.scenario())
    }

    /// The result of the run that just ended, or `null`.
    #[wasm_bindgen]
    pub fn last_result_json(&self) -> Result<String, JsValue> {
        to_json(&self.game.last_result())
    }

    /// Pending notices. Each call drains them.
    #[wasm_bindgen]
    pub fn take_notices_json(&mut self) -> Result<String, JsValue> {
        to_json(&self.game.take_notices())
    }

    /// Start a run. `mode` is "adventure", "boss" or "forge"; `domains_json`
    /// is an array of domain numbers. Returns "started", "none_due" or
    /// "none_available".
    #[wasm_bindgen]
    pub fn start_run(
        &mut self,
        mode: &str,
        domains_json: &str,
        count: usize,
        now: &str,
    ) -> Result<String, JsValue> {
        let mode = RunMode::try_from(mode.to_string()).map_err(js_error)?;
        let domains: Vec<Domain> = serde_json::from_str(domains_json)
            .map_err(|e| js_error(format!("Invalid domains: {e}")))?;
        let count = match mode {
            RunMode::Forge => self.game.settings().forge_size,
            RunMode::Adventure | RunMode::Boss => count,
        };
        let setup = RunSetup {
            mode,
            domains,
            count,
        };
        let started = self
            .game
            .start_run(setup, parse_now(now)?)
            .map_err(js_error)?;
        Ok(match started {
            RunStart::Started { .. } => "started",
            RunStart::NoneDue => "none_due",
            RunStart::NoneAvailable => "none_available",
        }
        .to_string())
    }

    /// Grade and record an answer to the current question. `answer_json` is
    /// e.g. `{"kind": "choice", "value": 2}`. Returns whether it was correct,
    /// or `undefined` if nothing was recorded.
    #[wasm_bindgen]
    pub fn submit_answer(&mut self, answer_json: &str, now: &str) -> Result<Option<bool>, JsValue> {
        let answer: Answer = serde_json::from_str(answer_json)
            .map_err(|e| js_error(format!("Invalid answer: {e}")))?;
        let recorded = self
            .game
            .submit_answer(&answer, parse_now(now)?)
            .map_err(js_error)?;
        Ok(recorded.and_then(|_| self.game.run().and_then(|r| r.last_answer_correct)))
    }

    /// Record an answer graded by the page itself.
    #[wasm_bindgen]
    pub fn answer_question(
        &mut self,
        correct: bool,
        xp_override: Option<u32>,
        coin_override: Option<u32>,
        now: &str,
    ) -> Result<bool, JsValue> {
        let recorded = self
            .game
            .answer_question(
                correct,
                xp_override.map(u64::from),
                coin_override.map(u64::from),
                parse_now(now)?,
            )
            .map_err(js_error)?;
        Ok(recorded.is_some())
    }

    /// Take a choice in the current scenario question. Returns the step as
    /// JSON, or `null` if there is nothing to choose.
    #[wasm_bindgen]
    pub fn choose_scenario(&mut self, index: usize, now: &str) -> Result<String, JsValue> {
        let step = self
            .game
            .choose_scenario(index, parse_now(now)?)
            .map_err(js_error)?;
        to_json(&step)
    }

    #[wasm_bindgen]
    pub fn next_question(&mut self) -> bool {
        self.game.next_question()
    }

    /// End the run. Returns the result as JSON, or `null` without a run.
    #[wasm_bindgen]
    pub fn end_run(&mut self, now: &str) -> Result<String, JsValue> {
        let result = self.game.end_run(parse_now(now)?).map_err(js_error)?;
        to_json(&result)
    }

    #[wasm_bindgen]
    pub fn due_cards_json(&self, now: &str) -> Result<String, JsValue> {
        to_json(&self.game.due_cards(parse_now(now)?))
    }

    #[wasm_bindgen]
    pub fn domain_stats_json(&self, domain: u8) -> Result<String, JsValue> {
        let domain = Domain::try_from(domain).map_err(js_error)?;
        to_json(&self.game.domain_stats(domain))
    }

    #[wasm_bindgen]
    pub fn buy_cosmetic(&mut self, id: &str) -> Result<(), JsValue> {
        self.game.buy_cosmetic(id).map_err(js_error)
    }

    #[wasm_bindgen]
    pub fn equip_cosmetic(&mut self, id: &str) -> Result<(), JsValue> {
        self.game.equip_cosmetic(id).map_err(js_error)
    }

    /// Apply a partial settings object.
    #[wasm_bindgen]
    pub fn update_settings(&mut self, patch_json: &str) -> Result<(), JsValue> {
        let patch: SettingsPatch = serde_json::from_str(patch_json)
            .map_err(|e| js_error(format!("Invalid settings: {e}")))?;
        self.game.update_settings(patch).map_err(js_error)
    }

    #[wasm_bindgen]
    pub fn reset_progress(&mut self) -> Result<(), JsValue> {
        self.game.reset_progress().map_err(js_error)
    }

    #[wasm_bindgen]
    pub fn export_save(&self) -> Result<String, JsValue> {
        self.game.export_save().to_json().map_err(js_error)
    }

    #[wasm_bindgen]
    pub fn import_save(&mut self, json: &str) -> Result<(), JsValue> {
        let save = SaveFile::parse(json).map_err(js_error)?;
        self.game.import_save(&save).map_err(js_error)
    }
}

/// Render question Markdown to HTML.
#[wasm_bindgen]
pub fn render_markdown(markdown: &str) -> String {
    markdown_to_html(markdown)
}

/// Get the current timestamp as an ISO string.
#[wasm_bindgen]
pub fn now_timestamp() -> String {
    let date = js_sys::Date::new_0();
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}",
        date.get_full_year(),
        date.get_month() + 1,
        date.get_date(),
        date.get_hours(),
        date.get_minutes(),
        date.get_seconds(),
        date.get_milliseconds()
    )
}

/// Get today's date as a string (YYYY-MM-DD).
#[wasm_bindgen]
pub fn today_date() -> String {
    let date = js_sys::Date::new_0();
    format!(
        "{:04}-{:02}-{:02}",
        date.get_full_year(),
        date.get_month() + 1,
        date.get_date()
    )
}
