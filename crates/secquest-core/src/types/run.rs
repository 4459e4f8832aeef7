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

use std::fmt::Display;
use std::fmt::Formatter;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::fail;
use crate::types::question::Domain;
use crate::types::timestamp::Timestamp;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// A random sample across the chosen domains.
    Adventure,
    /// A single-domain run with fewer lives.
    Boss,
    /// Review of the questions the scheduler says are due.
    Forge,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Adventure => "adventure",
            RunMode::Boss => "boss",
            RunMode::Forge => "forge",
        }
    }

    /// How many wrong answers a run of this mode can absorb without shields.
    pub fn starting_lives(&self) -> u32 {
        match self {
            RunMode::Boss => 2,
            RunMode::Adventure | RunMode::Forge => 3,
        }
    }
}

impl Display for RunMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for RunMode {
    type Error = ErrorReport;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "adventure" => Ok(RunMode::Adventure),
            "boss" => Ok(RunMode::Boss),
            "forge" => Ok(RunMode::Forge),
            _ => fail(format!("invalid run mode: {value}")),
        }
    }
}

/// The record of a finished run, kept in the history log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub id: String,
    pub mode: RunMode,
    pub domains: Vec<Domain>,
    pub total_questions: usize,
    pub correct: usize,
    pub wrong: usize,
    pub xp_earned: u64,
    pub coins_earned: u64,
    pub timestamp: Timestamp,
    #[serde(default)]
    pub loot_drops: Vec<String>,
    /// Run length in milliseconds.
    pub duration: u64,
}

impl RunResult {
    /// Percentage of the run's questions answered correctly, rounded.
    pub fn accuracy_percent(&self) -> u32 {
        if self.total_questions == 0 {
            0
        } else {
            ((self.correct as f64 / self.total_questions as f64) * 100.0).round() as u32
        }
    }

    /// Letter grade shown on the results screen.
    pub fn grade(&self) -> &'static str {
        match self.accuracy_percent() {
            90.. => "S",
            80..=89 => "A",
            70..=79 => "B",
            60..=69 => "C",
            _ => "F",
        }
    }

    /// Every question was answered, and answered correctly.
    pub fn is_flawless(&self) -> bool {
        self.total_questions > 0 && self.correct == self.total_questions
    }
}
