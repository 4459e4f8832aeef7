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

/// One of the five exam content categories.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Domain(u8);

impl Domain {
    pub const ALL: [Domain; 5] = [Domain(1), Domain(2), Domain(3), Domain(4), Domain(5)];

    pub fn number(self) -> u8 {
        self.0
    }

    /// The exam objective title.
    pub fn name(self) -> &'static str {
        match self.0 {
            1 => "Attacks, Threats & Vulnerabilities",
            2 => "Architecture & Design",
            3 => "Implementation",
            4 => "Operations & Incident Response",
            _ => "Governance, Risk & Compliance",
        }
    }

    /// The themed region name shown on the map.
    pub fn biome(self) -> &'static str {
        match self.0 {
            1 => "Haunted Network",
            2 => "Sci-Fi Facility",
            3 => "Cyber Workshop",
            4 => "Command Center",
            _ => "Courthouse Vault",
        }
    }
}

impl TryFrom<u8> for Domain {
    type Error = ErrorReport;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (1..=5).contains(&value) {
            Ok(Domain(value))
        } else {
            fail(format!("invalid domain: {value}"))
        }
    }
}

impl From<Domain> for u8 {
    fn from(domain: Domain) -> u8 {
        domain.0
    }
}

impl Display for Domain {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl TryFrom<String> for Difficulty {
    type Error = ErrorReport;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => fail(format!("invalid difficulty: {value}")),
        }
    }
}

/// An immutable quiz question.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub domain: Domain,
    #[serde(default)]
    pub objectives: Vec<String>,
    pub difficulty: Difficulty,
    pub prompt: String,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mnemonic: Option<String>,
    #[serde(flatten)]
    pub body: QuestionBody,
}

/// The format-specific part of a question, tagged by `type` in JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum QuestionBody {
    /// Single choice.
    Mcq {
        choices: Vec<String>,
        answer_index: usize,
    },
    /// Select every correct choice.
    Multi {
        choices: Vec<String>,
        answer_indices: Vec<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        select_count_hint: Option<usize>,
    },
    /// `pairs[i]` is the index into `right` that matches `left[i]`.
    Matching {
        left: Vec<String>,
        right: Vec<String>,
        pairs: Vec<usize>,
    },
    Ordering {
        steps: Vec<String>,
        correct_order: Vec<usize>,
    },
    /// A branching scenario, entered at `start_node_id`.
    Scenario {
        start_node_id: String,
        nodes: Vec<ScenarioNode>,
    },
}

impl QuestionBody {
    pub fn type_name(&self) -> &'static str {
        match self {
            QuestionBody::Mcq { .. } => "mcq",
            QuestionBody::Multi { .. } => "multi",
            QuestionBody::Matching { .. } => "matching",
            QuestionBody::Ordering { .. } => "ordering",
            QuestionBody::Scenario { .. } => "scenario",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioNode {
    pub id: String,
    pub text: String,
    pub choices: Vec<ScenarioChoice>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioChoice {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<ScenarioOutcome>,
    #[serde(default)]
    pub feedback: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<ScenarioDelta>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioOutcome {
    Win,
    Lose,
    Continue,
}

/// Reward adjustments attached to a scenario choice.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioDelta {
    pub xp: Option<i32>,
    pub coins: Option<i32>,
    pub shields: Option<i32>,
}

impl ScenarioDelta {
    /// Sum two deltas, keeping a field present if either side had it.
    pub fn combine(self, other: ScenarioDelta) -> ScenarioDelta {
        fn add(a: Option<i32>, b: Option<i32>) -> Option<i32> {
            match (a, b) {
                (None, None) => None,
                (a, b) => Some(a.unwrap_or(0).saturating_add(b.unwrap_or(0))),
            }
        }
        ScenarioDelta {
            xp: add(self.xp, other.xp),
            coins: add(self.coins, other.coins),
            shields: add(self.shields, other.shields),
        }
    }
}

/// A content file: a titled, versioned collection of questions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPack {
    pub pack_id: String,
    pub title: String,
    pub version: String,
    #[serde(default)]
    pub created_at: String,
    pub questions: Vec<Question>,
}
