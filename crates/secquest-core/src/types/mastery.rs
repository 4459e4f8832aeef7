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

use serde::Deserialize;
use serde::Serialize;

use crate::types::timestamp;
use crate::types::timestamp::Timestamp;

/// The starting ease factor of a question that has never been answered.
pub const INITIAL_EASE: f64 = 2.5;

/// The lowest ease factor a question can decay to.
pub const MIN_EASE: f64 = 1.3;

/// The highest ease factor a question can grow to.
pub const MAX_EASE: f64 = 3.0;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MasteryStatus {
    New,
    Learning,
    Review,
    Mastered,
}

impl MasteryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MasteryStatus::New => "new",
            MasteryStatus::Learning => "learning",
            MasteryStatus::Review => "review",
            MasteryStatus::Mastered => "mastered",
        }
    }
}

/// Spaced repetition state for a single question.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryState {
    pub question_id: String,
    pub times_seen: u32,
    pub times_correct: u32,
    /// When the question was last answered. Absent for new questions.
    #[serde(default, deserialize_with = "timestamp::deserialize_optional")]
    pub last_seen: Option<Timestamp>,
    /// When the question next becomes due. Absent means due immediately.
    #[serde(default, deserialize_with = "timestamp::deserialize_optional")]
    pub next_due: Option<Timestamp>,
    pub ease_factor: f64,
    pub status: MasteryStatus,
}

impl MasteryState {
    pub fn new(question_id: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            times_seen: 0,
            times_correct: 0,
            last_seen: None,
            next_due: None,
            ease_factor: INITIAL_EASE,
            status: MasteryStatus::New,
        }
    }

    /// The fraction of answers that were correct, or zero if never seen.
    pub fn accuracy(&self) -> f64 {
        if self.times_seen == 0 {
            0.0
        } else {
            self.times_correct as f64 / self.times_seen as f64
        }
    }

    pub fn is_due(&self, now: Timestamp) -> bool {
        match self.next_due {
            None => true,
            Some(due) => due <= now,
        }
    }
}
