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

//! A single play session.

use serde::Deserialize;
use serde::Serialize;

use crate::types::question::Domain;
use crate::types::question::Question;
use crate::types::run::RunMode;
use crate::types::run::RunResult;
use crate::types::timestamp::Timestamp;

/// How a run is configured before it starts.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSetup {
    pub mode: RunMode,
    /// Empty means every domain. Boss runs use the first entry.
    pub domains: Vec<Domain>,
    pub count: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunPhase {
    /// Waiting for an answer to the current question.
    Active,
    /// The current question was answered; waiting to advance.
    Answered,
    /// Out of lives, or the last question was answered.
    Finished,
}

/// What answering a question did to the run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnswerEffect {
    pub shield_gained: bool,
    pub shield_absorbed: bool,
    pub life_lost: bool,
    pub finished: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunState {
    pub mode: RunMode,
    pub domains: Vec<Domain>,
    pub questions: Vec<Question>,
    pub current_index: usize,
    pub correct: usize,
    pub wrong: usize,
    pub lives: u32,
    /// Shields picked up during this run.
    pub shields: u32,
    pub xp_earned: u64,
    pub coins_earned: u64,
    pub started_at: Timestamp,
    pub phase: RunPhase,
    pub last_answer_correct: Option<bool>,
}

impl RunState {
    pub fn new(setup: RunSetup, questions: Vec<Question>, now: Timestamp) -> Self {
        Self {
            mode: setup.mode,
            domains: setup.domains,
            lives: setup.mode.starting_lives(),
            questions,
            current_index: 0,
            correct: 0,
            wrong: 0,
            shields: 0,
            xp_earned: 0,
            coins_earned: 0,
            started_at: now,
            phase: RunPhase::Active,
            last_answer_correct: None,
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    pub fn is_finished(&self) -> bool {
        self.phase == RunPhase::Finished
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// Fraction of the run's questions already answered.
    pub fn progress(&self) -> f64 {
        if self.questions.is_empty() {
            return 1.0;
        }
        let answered = match self.phase {
            RunPhase::Active => self.current_index,
            RunPhase::Answered | RunPhase::Finished => self.current_index + 1,
        };
        answered as f64 / self.questions.len() as f64
    }

    /// Add (or remove) shields, never dropping below zero.
    pub fn adjust_shields(&mut self, delta: i32) {
        self.shields = self.shields.saturating_add_signed(delta);
    }

    /// Record the outcome of the current question.
    ///
    /// Returns `None` if the current question was already answered or the run
    /// is over.
    pub fn record_answer(
        &mut self,
        correct: bool,
        xp: u64,
        coins: u64,
        shield_dropped: bool,
    ) -> Option<AnswerEffect> {
        if self.phase != RunPhase::Active || self.current_question().is_none() {
            return None;
        }
        let shield_gained = correct && shield_dropped;
        if shield_gained {
            self.shields += 1;
        }
        let mut shield_absorbed = false;
        let mut life_lost = false;
        if correct {
            self.correct += 1;
        } else {
            self.wrong += 1;
            if self.shields > 0 {
                self.shields -= 1;
                shield_absorbed = true;
            } else {
                self.lives = self.lives.saturating_sub(1);
                life_lost = true;
            }
        }
        self.xp_earned += xp;
        self.coins_earned += coins;
        self.last_answer_correct = Some(correct);
        let finished = self.lives == 0 || self.current_index + 1 >= self.questions.len();
        self.phase = if finished {
            RunPhase::Finished
        } else {
            RunPhase::Answered
        };
        log::debug!(
            "Answered {}/{} correct={correct} lives={} shields={}",
            self.current_index + 1,
            self.questions.len(),
            self.lives,
            self.shields
        );
        Some(AnswerEffect {
            shield_gained,
            shield_absorbed,
            life_lost,
            finished,
        })
    }

    /// Move to the next question. Only an answered, unfinished run advances.
    pub fn advance(&mut self) -> bool {
        if self.phase != RunPhase::Answered {
            return false;
        }
        self.current_index += 1;
        self.phase = RunPhase::Active;
        self.last_answer_correct = None;
        true
    }

    /// The boss domain this run defeated, if any.
    pub fn defeated_boss(&self) -> Option<Domain> {
        if self.mode == RunMode::Boss && self.correct > self.wrong {
            self.domains.first().copied()
        } else {
            None
        }
    }

    /// Snapshot the run for the history log.
    pub fn to_result(&self, now: Timestamp) -> RunResult {
        RunResult {
            id: format!("run-{}", now.epoch_millis()),
            mode: self.mode,
            domains: self.domains.clone(),
            total_questions: self.questions.len(),
            correct: self.correct,
            wrong: self.wrong,
            xp_earned: self.xp_earned,
            coins_earned: self.coins_earned,
            timestamp: now,
            loot_drops: Vec::new(),
            duration: now.millis_since(self.started_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::tests::sample_bank;
    use crate::error::Fallible;

    fn ts(s: &str) -> Fallible<Timestamp> {
        Timestamp::try_from(s.to_string())
    }

    fn run(mode: RunMode, n: usize) -> Fallible<RunState> {
        let bank = sample_bank();
        let questions = bank.questions().iter().take(n).cloned().collect();
        let setup = RunSetup {
            mode,
            domains: vec![Domain::try_from(1)?],
            count: n,
        };
        Ok(RunState::new(setup, questions, ts("2024-03-01T10:00:00.000")?))
    }

    #[test]
    fn test_boss_run_ends_after_two_wrong() -> Fallible<()> {
        let mut state = run(RunMode::Boss, 5)?;
        assert_eq!(state.lives, 2);
        let first = state.record_answer(false, 0, 0, false).unwrap();
        assert!(first.life_lost);
        assert!(!first.finished);
        assert!(state.advance());
        let second = state.record_answer(false, 0, 0, false).unwrap();
        assert!(second.finished);
        assert!(state.is_finished());
        assert_eq!(state.lives, 0);
        assert!(!state.advance());
        Ok(())
    }

    #[test]
    fn test_answer_twice_is_noop() -> Fallible<()> {
        let mut state = run(RunMode::Adventure, 3)?;
        assert!(state.record_answer(true, 20, 3, false).is_some());
        assert!(state.record_answer(false, 0, 0, false).is_none());
        assert_eq!(state.correct, 1);
        assert_eq!(state.wrong, 0);
        assert_eq!(state.xp_earned, 20);
        Ok(())
    }

    #[test]
    fn test_shield_absorbs_before_life() -> Fallible<()> {
        let mut state = run(RunMode::Adventure, 3)?;
        let effect = state.record_answer(true, 0, 0, true).unwrap();
        assert!(effect.shield_gained);
        assert_eq!(state.shields, 1);
        state.advance();
        let effect = state.record_answer(false, 0, 0, true).unwrap();
        assert!(effect.shield_absorbed);
        assert!(!effect.shield_gained);
        assert_eq!(state.lives, 3);
        assert_eq!(state.shields, 0);
        Ok(())
    }

    #[test]
    fn test_last_question_finishes() -> Fallible<()> {
        let mut state = run(RunMode::Forge, 2)?;
        state.record_answer(true, 0, 0, false);
        state.advance();
        assert!(!state.advance());
        let effect = state.record_answer(true, 0, 0, false).unwrap();
        assert!(effect.finished);
        assert_eq!(state.progress(), 1.0);
        Ok(())
    }

    #[test]
    fn test_advance_requires_answer() -> Fallible<()> {
        let mut state = run(RunMode::Adventure, 3)?;
        assert!(!state.advance());
        assert_eq!(state.current_index, 0);
        Ok(())
    }

    #[test]
    fn test_result_snapshot() -> Fallible<()> {
        let mut state = run(RunMode::Boss, 3)?;
        state.record_answer(true, 20, 3, false);
        state.advance();
        state.record_answer(true, 20, 3, false);
        state.advance();
        state.record_answer(false, 0, 0, false);
        let result = state.to_result(ts("2024-03-01T10:02:30.000")?);
        assert_eq!(result.total_questions, 3);
        assert_eq!(result.correct, 2);
        assert_eq!(result.wrong, 1);
        assert_eq!(result.xp_earned, 40);
        assert_eq!(result.duration, 150_000);
        assert_eq!(state.defeated_boss(), Some(Domain::try_from(1)?));
        Ok(())
    }

    #[test]
    fn test_boss_not_defeated_on_tie() -> Fallible<()> {
        let mut state = run(RunMode::Boss, 2)?;
        state.record_answer(true, 0, 0, false);
        state.advance();
        state.record_answer(false, 0, 0, false);
        assert_eq!(state.defeated_boss(), None);
        Ok(())
    }
}
