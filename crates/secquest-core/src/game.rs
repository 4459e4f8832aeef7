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

//! The game controller: the single owner of all player state.

use std::collections::HashSet;

use serde::Serialize;

use crate::achievements::AchievementContext;
use crate::achievements::check_achievements;
use crate::achievements::get_achievement;
use crate::answer::Answer;
use crate::answer::ScenarioStep;
use crate::answer::ScenarioWalk;
use crate::answer::grade;
use crate::bank::QuestionBank;
use crate::cosmetics;
use crate::error::Fallible;
use crate::error::fail;
use crate::rng::TinyRng;
use crate::run::AnswerEffect;
use crate::run::RunPhase;
use crate::run::RunSetup;
use crate::run::RunState;
use crate::scheduler::MasteryMap;
use crate::scheduler::due_question_ids;
use crate::scheduler::get_or_create;
use crate::scheduler::update_mastery;
use crate::scoring::apply_xp;
use crate::scoring::coins_for_correct;
use crate::scoring::compute_xp;
use crate::scoring::should_drop_shield;
use crate::scoring::update_streak;
use crate::storage;
use crate::storage::HISTORY_LIMIT;
use crate::storage::KeyValueStore;
use crate::storage::SaveFile;
use crate::types::date::Date;
use crate::types::mastery::MasteryStatus;
use crate::types::profile::PlayerProfile;
use crate::types::question::Domain;
use crate::types::question::Question;
use crate::types::run::RunMode;
use crate::types::run::RunResult;
use crate::types::settings::GameSettings;
use crate::types::settings::SettingsPatch;
use crate::types::timestamp::Timestamp;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Achievement,
    Loot,
    Info,
    Xp,
}

/// A short message for the player about something that just happened.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub icon: String,
    pub text: String,
}

/// The outcome of asking for a new run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStart {
    Started { questions: usize },
    /// A forge run was requested but nothing is due.
    NoneDue,
    /// No question in the bank matches the requested domains.
    NoneAvailable,
}

/// Progress on the questions of one domain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DomainStats {
    pub total: usize,
    pub mastered: usize,
    pub correct: u64,
    pub seen: usize,
}

pub struct Game<S: KeyValueStore> {
    store: S,
    bank: QuestionBank,
    profile: PlayerProfile,
    mastery: MasteryMap,
    history: Vec<RunResult>,
    settings: GameSettings,
    run: Option<RunState>,
    scenario: Option<ScenarioWalk>,
    last_result: Option<RunResult>,
    notices: Vec<Notice>,
    rng: TinyRng,
}

impl<S: KeyValueStore> Game<S> {
    /// Load persisted state and record today's activity for the streak.
    pub fn load(store: S, bank: QuestionBank, today: Date, seed: u64) -> Fallible<Self> {
        let mut game = Self::open(store, bank, seed);
        game.check_in(today)?;
        log::info!(
            "Loaded game for '{}' with {} questions in the bank",
            game.profile.name,
            game.bank.len()
        );
        Ok(game)
    }

    /// Load persisted state without counting it as activity.
    pub fn open(store: S, bank: QuestionBank, seed: u64) -> Self {
        let profile = storage::load_profile(&store);
        let mastery = storage::load_mastery(&store);
        let history = storage::load_history(&store);
        let settings = storage::load_settings(&store);
        Self {
            store,
            bank,
            profile,
            mastery,
            history,
            settings,
            run: None,
            scenario: None,
            last_result: None,
            notices: Vec::new(),
            rng: TinyRng::from_seed(seed),
        }
    }

    /// Record that the player was active on `today`.
    pub fn check_in(&mut self, today: Date) -> Fallible<()> {
        if update_streak(&mut self.profile, today) {
            log::debug!("Streak is now {} day(s)", self.profile.streak);
        }
        self.save_profile()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn profile(&self) -> &PlayerProfile {
        &self.profile
    }

    pub fn mastery(&self) -> &MasteryMap {
        &self.mastery
    }

    pub fn history(&self) -> &[RunResult] {
        &self.history
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn run(&self) -> Option<&RunState> {
        self.run.as_ref()
    }

    /// The walk through the current scenario question, once a choice was made.
    pub fn scenario(&self) -> Option<&ScenarioWalk> {
        self.scenario.as_ref()
    }

    /// The result of the most recently ended run.
    pub fn last_result(&self) -> Option<&RunResult> {
        self.last_result.as_ref()
    }

    /// Remove and return pending notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn notify(&mut self, kind: NoticeKind, icon: &str, text: impl Into<String>) {
        self.notices.push(Notice {
            kind,
            icon: icon.to_string(),
            text: text.into(),
        });
    }

    fn save_profile(&mut self) -> Fallible<()> {
        storage::save_profile(&mut self.store, &self.profile)
    }

    pub fn start_run(&mut self, setup: RunSetup, now: Timestamp) -> Fallible<RunStart> {
        let questions: Vec<Question> = match setup.mode {
            RunMode::Forge => {
                let questions: Vec<Question> = due_question_ids(&self.mastery, setup.count, now)
                    .iter()
                    .filter_map(|id| self.bank.get(id))
                    .cloned()
                    .collect();
                if questions.is_empty() {
                    self.notify(NoticeKind::Info, "📭", "No cards due for review!");
                    return Ok(RunStart::NoneDue);
                }
                questions
            }
            RunMode::Adventure | RunMode::Boss => {
                if setup.mode == RunMode::Boss && setup.domains.is_empty() {
                    return fail("a boss run needs a domain");
                }
                self.bank
                    .pick_random(setup.count, &setup.domains, &HashSet::new(), &mut self.rng)
            }
        };
        if questions.is_empty() {
            self.notify(NoticeKind::Info, "📭", "No questions available.");
            return Ok(RunStart::NoneAvailable);
        }
        let count = questions.len();
        log::info!("Starting {} run with {count} questions", setup.mode);
        self.run = Some(RunState::new(setup, questions, now));
        self.scenario = None;
        Ok(RunStart::Started { questions: count })
    }

    /// Record the outcome of the current question.
    ///
    /// The overrides replace the computed XP and coin rewards. Returns `None`
    /// when there is no run, or the current question was already answered.
    pub fn answer_question(
        &mut self,
        correct: bool,
        xp_override: Option<u64>,
        coin_override: Option<u64>,
        now: Timestamp,
    ) -> Fallible<Option<AnswerEffect>> {
        let Some(run) = self.run.as_mut() else {
            return Ok(None);
        };
        let Some(question) = run.current_question() else {
            return Ok(None);
        };
        let question_id = question.id.clone();
        let difficulty = question.difficulty;

        let xp = xp_override.unwrap_or_else(|| {
            if correct {
                compute_xp(difficulty, self.profile.streak)
            } else {
                0
            }
        });
        let coins = match coin_override {
            Some(coins) => coins,
            None if correct => coins_for_correct(difficulty, &mut self.rng),
            None => 0,
        };
        let shield_dropped = correct && should_drop_shield(&mut self.rng);
        let Some(effect) = run.record_answer(correct, xp, coins, shield_dropped) else {
            return Ok(None);
        };

        let state = get_or_create(&question_id, &self.mastery);
        self.mastery
            .insert(question_id, update_mastery(&state, correct, now));

        self.profile.total_answered += 1;
        if correct {
            self.profile.total_correct += 1;
        }
        self.profile.coins += coins;
        let levels = apply_xp(&mut self.profile, xp);

        if correct && xp > 0 {
            self.notify(NoticeKind::Xp, "⚡", format!("+{xp} XP"));
        }
        if levels > 0 {
            let level = self.profile.level;
            self.notify(NoticeKind::Info, "⬆️", format!("Level up! You are now level {level}."));
        }
        if effect.shield_gained {
            self.notify(NoticeKind::Loot, "🛡️", "Shield dropped!");
        }
        if effect.shield_absorbed {
            self.notify(NoticeKind::Info, "🛡️", "Shield absorbed the hit!");
        }
        self.award_achievements();

        self.save_profile()?;
        storage::save_mastery(&mut self.store, &self.mastery)?;
        Ok(Some(effect))
    }

    /// Grade a submission for the current question and record it.
    pub fn submit_answer(&mut self, answer: &Answer, now: Timestamp) -> Fallible<Option<AnswerEffect>> {
        let Some(question) = self.run.as_ref().and_then(|r| r.current_question()) else {
            return Ok(None);
        };
        let correct = grade(question, answer)?;
        self.answer_question(correct, None, None, now)
    }

    /// Take a choice in the current scenario question. When the scenario
    /// resolves, the question is recorded as answered, with rewards from the
    /// choices' deltas when they carry any. Shield deltas land after the
    /// outcome is recorded, so they cannot absorb the scenario's own loss.
    pub fn choose_scenario(&mut self, index: usize, now: Timestamp) -> Fallible<Option<ScenarioStep>> {
        let Some(run) = self.run.as_ref() else {
            return Ok(None);
        };
        if run.phase != RunPhase::Active {
            return Ok(None);
        }
        let Some(question) = run.current_question() else {
            return Ok(None);
        };
        let mut walk = match self.scenario.take() {
            Some(walk) if walk.question_id == question.id => walk,
            _ => ScenarioWalk::start(question)?,
        };
        let step = walk.choose(question, index);
        let xp = walk.xp_override();
        let coins = walk.coin_override();
        let shields = walk.shield_delta();
        self.scenario = Some(walk);
        let step = step?;
        if let ScenarioStep::Resolved { won, .. } = &step {
            self.answer_question(*won, xp, coins, now)?;
            if let Some(run) = self.run.as_mut() {
                run.adjust_shields(shields);
            }
        }
        Ok(Some(step))
    }

    /// Move on to the next question. Returns false if the run can't advance.
    pub fn next_question(&mut self) -> bool {
        match self.run.as_mut() {
            Some(run) => {
                let advanced = run.advance();
                if advanced {
                    self.scenario = None;
                }
                advanced
            }
            None => false,
        }
    }

    /// Finish the current run and log it to the history.
    pub fn end_run(&mut self, now: Timestamp) -> Fallible<Option<RunResult>> {
        let Some(run) = self.run.take() else {
            return Ok(None);
        };
        self.scenario = None;
        let result = run.to_result(now);
        if let Some(domain) = run.defeated_boss() {
            if self.profile.defeat_boss(domain) {
                self.notify(
                    NoticeKind::Achievement,
                    "🐉",
                    format!("Boss defeated: {}!", domain.name()),
                );
            }
        }
        log::info!(
            "Ended {} run: {}/{} correct, grade {}",
            result.mode,
            result.correct,
            result.total_questions,
            result.grade()
        );
        self.history.push(result.clone());
        if self.history.len() > HISTORY_LIMIT {
            let excess = self.history.len() - HISTORY_LIMIT;
            self.history = self.history.split_off(excess);
        }
        self.award_achievements();
        self.save_profile()?;
        storage::save_history(&mut self.store, &self.history)?;
        self.last_result = Some(result.clone());
        Ok(Some(result))
    }

    fn award_achievements(&mut self) {
        let unlocked = check_achievements(&AchievementContext {
            profile: &self.profile,
            mastery: &self.mastery,
            history: &self.history,
            bank: &self.bank,
        });
        for id in unlocked {
            let Some(def) = get_achievement(id) else {
                continue;
            };
            log::info!("Unlocked achievement '{id}'");
            self.profile.achievement_ids.push(id.to_string());
            if let Some(reward) = def.reward_cosmetic {
                cosmetics::grant_cosmetic(&mut self.profile, reward);
            }
            self.notify(
                NoticeKind::Achievement,
                def.icon,
                format!("Achievement: {}", def.name),
            );
        }
    }

    /// The questions a forge run would draw right now.
    pub fn due_cards(&self, now: Timestamp) -> Vec<&Question> {
        due_question_ids(&self.mastery, self.settings.forge_size, now)
            .iter()
            .filter_map(|id| self.bank.get(id))
            .collect()
    }

    pub fn domain_stats(&self, domain: Domain) -> DomainStats {
        let mut stats = DomainStats::default();
        for question in self.bank.by_domain(domain) {
            stats.total += 1;
            if let Some(state) = self.mastery.get(&question.id) {
                if state.status == MasteryStatus::Mastered {
                    stats.mastered += 1;
                }
                if state.times_seen > 0 {
                    stats.seen += 1;
                }
                stats.correct += state.times_correct as u64;
            }
        }
        stats
    }

    pub fn buy_cosmetic(&mut self, id: &str) -> Fallible<()> {
        let cosmetic = cosmetics::buy_cosmetic(&mut self.profile, id)?;
        self.notify(NoticeKind::Loot, cosmetic.icon, format!("Bought {}", cosmetic.name));
        self.save_profile()
    }

    pub fn equip_cosmetic(&mut self, id: &str) -> Fallible<()> {
        cosmetics::equip_cosmetic(&mut self.profile, id)?;
        self.save_profile()
    }

    pub fn rename_player(&mut self, name: &str) -> Fallible<()> {
        if name.trim().is_empty() {
            return fail("player name can't be empty");
        }
        self.profile.name = name.trim().to_string();
        self.save_profile()
    }

    pub fn update_settings(&mut self, patch: SettingsPatch) -> Fallible<()> {
        self.settings.apply(patch);
        storage::save_settings(&mut self.store, &self.settings)
    }

    /// Wipe profile, mastery and history. Settings are kept.
    pub fn reset_progress(&mut self) -> Fallible<()> {
        storage::reset_progress(&mut self.store)?;
        self.profile = PlayerProfile::default();
        self.mastery.clear();
        self.history.clear();
        self.run = None;
        self.scenario = None;
        self.last_result = None;
        log::info!("Progress reset");
        Ok(())
    }

    pub fn export_save(&self) -> SaveFile {
        SaveFile {
            profile: Some(self.profile.clone()),
            mastery: Some(self.mastery.clone()),
            history: Some(self.history.clone()),
            settings: Some(self.settings.clone()),
        }
    }

    /// Overwrite stored state with the sections present in `save`. Any run in
    /// progress is abandoned.
    pub fn import_save(&mut self, save: &SaveFile) -> Fallible<()> {
        storage::import_save(&mut self.store, save)?;
        self.profile = storage::load_profile(&self.store);
        self.mastery = storage::load_mastery(&self.store);
        self.history = storage::load_history(&self.store);
        self.settings = storage::load_settings(&self.store);
        self.run = None;
        self.scenario = None;
        Ok(())
    }
}
