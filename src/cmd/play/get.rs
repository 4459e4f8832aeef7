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

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use maud::Markup;
use maud::PreEscaped;
use maud::html;
use secquest_core::cosmetics::get_cosmetic;
use secquest_core::error::Fallible;
use secquest_core::game::Game;
use secquest_core::game::Notice;
use secquest_core::game::NoticeKind;
use secquest_core::markdown::markdown_to_html;
use secquest_core::markdown::markdown_to_html_inline;
use secquest_core::run::RunPhase;
use secquest_core::run::RunState;
use secquest_core::types::question::Domain;
use secquest_core::types::question::Question;
use secquest_core::types::question::QuestionBody;
use secquest_core::types::run::RunResult;
use secquest_core::types::timestamp::Timestamp;

use crate::cmd::play::post::DEFAULT_RUN_SIZE;
use crate::cmd::play::state::ServerState;
use crate::cmd::play::template::PageStyle;
use crate::cmd::play::template::page_template;
use crate::db::Database;

pub async fn get_handler(State(state): State<ServerState>) -> (StatusCode, Html<String>) {
    match render_page(&state) {
        Ok((body, style)) => (StatusCode::OK, Html(page_template(body, &style).into_string())),
        Err(e) => {
            let body = html! {
                div.error { (e.message()) }
            };
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(page_template(body, &PageStyle::default()).into_string()),
            )
        }
    }
}

fn render_page(state: &ServerState) -> Fallible<(Markup, PageStyle)> {
    let mut mutable = state.lock()?;
    let notices = mutable.game.take_notices();
    let error = mutable.error.take();
    let game = &mutable.game;
    let main = match (game.run(), game.last_result()) {
        (Some(run), _) => render_run(game, run),
        (None, Some(result)) if mutable.show_result => render_result(result),
        _ => render_home(game, Timestamp::now()),
    };
    let body = html! {
        div.root {
            @if let Some(error) = error {
                div.error { (error) }
            }
            (render_notices(&notices))
            (main)
        }
    };
    Ok((body, PageStyle::of(game)))
}

fn render_notices(notices: &[Notice]) -> Markup {
    html! {
        @if !notices.is_empty() {
            ul.notices {
                @for notice in notices {
                    li class=(format!("notice notice-{}", kind_class(notice))) {
                        span.icon { (notice.icon) } " " (notice.text)
                    }
                }
            }
        }
    }
}

fn kind_class(notice: &Notice) -> &'static str {
    match notice.kind {
        NoticeKind::Achievement => "achievement",
        NoticeKind::Loot => "loot",
        NoticeKind::Info => "info",
        NoticeKind::Xp => "xp",
    }
}

fn percent(part: u64, whole: u64) -> u64 {
    if whole == 0 { 100 } else { (part * 100 / whole).min(100) }
}

fn render_home(game: &Game<Database>, now: Timestamp) -> Markup {
    let profile = game.profile();
    let due = game.due_cards(now).len();
    let xp_style = format!("width: {}%;", percent(profile.xp, profile.xp_to_next));
    let equipped: Vec<&str> = profile
        .equipped_cosmetics
        .values()
        .filter_map(|id| get_cosmetic(id))
        .map(|c| c.icon)
        .collect();
    let recent: Vec<&RunResult> = game.history().iter().rev().take(5).collect();
    html! {
        div.profile {
            h1 { (profile.name) " " @for icon in &equipped { span.cosmetic { (icon) } } }
            div.level { "Level " (profile.level) }
            div.progress-bar title=(format!("{}/{} XP", profile.xp, profile.xp_to_next)) {
                div.progress-fill style=(xp_style) {}
            }
            div.wallet {
                span { "🪙 " (profile.coins) }
                span { "🔥 " (profile.streak) "-day streak" }
                span { "🏆 " (profile.achievement_ids.len()) " achievements" }
            }
        }
        div.modes {
            form.mode action="/" method="post" {
                h2 { "Adventure" }
                p { "Random questions from the domains you pick (none means all)." }
                input type="hidden" name="mode" value="adventure";
                div.domains {
                    @for domain in Domain::ALL {
                        label {
                            input type="checkbox" name="domain" value=(domain.number());
                            " " (domain.number()) ". " (domain.name())
                        }
                    }
                }
                label {
                    "Questions "
                    input type="number" name="count" value=(DEFAULT_RUN_SIZE) min="1" max="50";
                }
                button #adventure type="submit" name="action" value="Start" { "Start Adventure" }
            }
            form.mode action="/" method="post" {
                h2 { "Forge" }
                p { (due) " question(s) due for review." }
                input type="hidden" name="mode" value="forge";
                button #forge type="submit" name="action" value="Start" disabled[due == 0] { "Enter the Forge" }
            }
        }
        h2 { "Domains" }
        table.domains {
            tbody {
                @for domain in Domain::ALL {
                    @let stats = game.domain_stats(domain);
                    tr {
                        td.key { (domain.number()) ". " (domain.biome()) }
                        td { (domain.name()) }
                        td.val { (stats.seen) "/" (stats.total) " seen" }
                        td.val { (stats.mastered) " mastered" }
                        td {
                            @if profile.bosses_defeated.contains(&domain) {
                                span.defeated { "🐉 Defeated" }
                            } @else {
                                form action="/" method="post" {
                                    input type="hidden" name="mode" value="boss";
                                    input type="hidden" name="domain" value=(domain.number());
                                    button type="submit" name="action" value="Start" disabled[stats.total == 0] { "Fight Boss" }
                                }
                            }
                        }
                    }
                }
            }
        }
        @if !recent.is_empty() {
            h2 { "Recent Runs" }
            table.history {
                tbody {
                    @for result in &recent {
                        tr {
                            td.key { (result.mode) }
                            td.val { (result.correct) "/" (result.total_questions) }
                            td.val { (result.grade()) }
                            td.val { "+" (result.xp_earned) " XP" }
                            td { (result.timestamp) }
                        }
                    }
                }
            }
        }
        div.shutdown-container {
            form action="/" method="post" {
                input #shutdown .shutdown-button type="submit" name="action" value="Shutdown" title="Shut down the server";
            }
        }
    }
}

fn render_run(game: &Game<Database>, run: &RunState) -> Markup {
    let progress_style = format!("width: {}%;", (run.progress() * 100.0).round() as u64);
    let hearts = "❤️".repeat(run.lives as usize);
    let shields = "🛡️".repeat(run.shields as usize);
    let content = match run.current_question() {
        Some(question) => match run.phase {
            RunPhase::Active => render_question(game, question),
            RunPhase::Answered | RunPhase::Finished => render_feedback(game, run, question),
        },
        None => html! { p { "No question." } },
    };
    html! {
        div.header {
            div.status { span.lives { (hearts) } " " span.shields { (shields) } }
            div.progress-bar {
                div.progress-fill style=(progress_style) {}
            }
            div.status { "+" (run.xp_earned) " XP" }
            form.header-action action="/" method="post" {
                input #end type="submit" name="action" value="End" title="End the run (progress is saved)";
            }
        }
        div.card-container {
            div.card {
                (content)
            }
        }
    }
}

fn question_header(question: &Question) -> Markup {
    html! {
        div.card-header {
            h1 { (question.domain.biome()) }
            span.difficulty { (question.difficulty.as_str()) }
        }
        div.prompt.rich-text { (PreEscaped(markdown_to_html(&question.prompt))) }
    }
}

fn inline(text: &str) -> PreEscaped<String> {
    PreEscaped(markdown_to_html_inline(text))
}

fn render_question(game: &Game<Database>, question: &Question) -> Markup {
    let input = match &question.body {
        QuestionBody::Mcq { choices, .. } => html! {
            form.answer action="/" method="post" {
                @for (i, choice) in choices.iter().enumerate() {
                    label.choice {
                        input type="radio" name="choice" value=(i) required;
                        " " (inline(choice))
                    }
                }
                button #answer type="submit" name="action" value="Answer" { "Answer" }
            }
        },
        QuestionBody::Multi {
            choices,
            select_count_hint,
            ..
        } => html! {
            form.answer action="/" method="post" {
                @if let Some(n) = select_count_hint {
                    p.hint { "Select " (n) "." }
                }
                @for (i, choice) in choices.iter().enumerate() {
                    label.choice {
                        input type="checkbox" name="choice" value=(i);
                        " " (inline(choice))
                    }
                }
                button #answer type="submit" name="action" value="Answer" { "Answer" }
            }
        },
        QuestionBody::Matching { left, right, .. } => html! {
            form.answer action="/" method="post" {
                table.matching {
                    tbody {
                        @for item in left {
                            tr {
                                td { (inline(item)) }
                                td {
                                    select name="match" {
                                        @for (j, choice) in right.iter().enumerate() {
                                            option value=(j) { (choice) }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
                button #answer type="submit" name="action" value="Answer" { "Answer" }
            }
        },
        QuestionBody::Ordering { steps, .. } => html! {
            form.answer action="/" method="post" {
                ol.ordering {
                    @for position in 0..steps.len() {
                        li {
                            select name="order" {
                                @for (j, step) in steps.iter().enumerate() {
                                    option value=(j) selected[j == position] { (step) }
                                }
                            }
                        }
                    }
                }
                button #answer type="submit" name="action" value="Answer" { "Answer" }
            }
        },
        QuestionBody::Scenario {
            start_node_id,
            nodes,
        } => {
            let walk = game.scenario().filter(|w| w.question_id == question.id);
            let node_id = walk.map(|w| w.node_id.as_str()).unwrap_or(start_node_id.as_str());
            let node = nodes.iter().find(|n| n.id == node_id);
            html! {
                @if let Some(feedback) = walk.and_then(|w| w.feedback.as_ref()) {
                    div.scenario-feedback { (inline(feedback)) }
                }
                @if let Some(node) = node {
                    div.scenario-node.rich-text { (PreEscaped(markdown_to_html(&node.text))) }
                    form.answer action="/" method="post" {
                        input type="hidden" name="action" value="Choose";
                        @for (i, choice) in node.choices.iter().enumerate() {
                            button.scenario-choice type="submit" name="choice" value=(i) { (inline(&choice.label)) }
                        }
                    }
                }
            }
        }
    };
    html! {
        (question_header(question))
        (input)
    }
}

fn correct_answer(question: &Question) -> Markup {
    match &question.body {
        QuestionBody::Mcq {
            choices,
            answer_index,
        } => html! {
            p { "Answer: " (inline(choices.get(*answer_index).map(String::as_str).unwrap_or(""))) }
        },
        QuestionBody::Multi {
            choices,
            answer_indices,
            ..
        } => html! {
            p { "Answers:" }
            ul {
                @for &i in answer_indices {
                    li { (inline(choices.get(i).map(String::as_str).unwrap_or(""))) }
                }
            }
        },
        QuestionBody::Matching { left, right, pairs } => html! {
            table.matching {
                tbody {
                    @for (item, &j) in left.iter().zip(pairs) {
                        tr {
                            td { (inline(item)) }
                            td { "→ " (right.get(j).map(String::as_str).unwrap_or("")) }
                        }
                    }
                }
            }
        },
        QuestionBody::Ordering {
            steps,
            correct_order,
        } => html! {
            ol {
                @for &i in correct_order {
                    li { (steps.get(i).map(String::as_str).unwrap_or("")) }
                }
            }
        },
        QuestionBody::Scenario { .. } => html! {},
    }
}

fn render_feedback(game: &Game<Database>, run: &RunState, question: &Question) -> Markup {
    let correct = run.last_answer_correct.unwrap_or(false);
    let walk = game.scenario().filter(|w| w.question_id == question.id);
    html! {
        (question_header(question))
        @if correct {
            div.verdict.correct { "✅ Correct!" }
        } @else {
            div.verdict.incorrect { "❌ Incorrect" }
        }
        @if let Some(feedback) = walk.and_then(|w| w.feedback.as_ref()) {
            div.scenario-feedback { (inline(feedback)) }
        }
        (correct_answer(question))
        div.explanation.rich-text { (PreEscaped(markdown_to_html(&question.explanation))) }
        @if let Some(mnemonic) = &question.mnemonic {
            div.mnemonic { "💡 " (mnemonic) }
        }
        @if !question.references.is_empty() {
            ul.references {
                @for reference in &question.references {
                    li { (reference) }
                }
            }
        }
        div.controls {
            form action="/" method="post" {
                @if run.phase == RunPhase::Finished {
                    @if run.lives == 0 {
                        p.game-over { "Out of lives!" }
                    }
                    input #finish type="submit" name="action" value="End" title="See the results";
                } @else {
                    input #next type="submit" name="action" value="Next";
                }
            }
        }
    }
}

fn render_result(result: &RunResult) -> Markup {
    let seconds = result.duration / 1000;
    html! {
        div.finished {
            h1 { "Run Complete" }
            div.grade { "Grade: " (result.grade()) }
            h2 { "Run Stats" }
            div.stats {
                table {
                    tbody {
                        tr {
                            td.key { "Mode" }
                            td.val { (result.mode) }
                        }
                        tr {
                            td.key { "Correct" }
                            td.val { (result.correct) "/" (result.total_questions) }
                        }
                        tr {
                            td.key { "Accuracy" }
                            td.val { (result.accuracy_percent()) "%" }
                        }
                        tr {
                            td.key { "XP Earned" }
                            td.val { (result.xp_earned) }
                        }
                        tr {
                            td.key { "Coins Earned" }
                            td.val { (result.coins_earned) }
                        }
                        tr {
                            td.key { "Duration (seconds)" }
                            td.val { (seconds) }
                        }
                    }
                }
            }
            div.controls {
                form action="/" method="post" {
                    input #continue type="submit" name="action" value="Continue";
                }
            }
        }
    }
}
