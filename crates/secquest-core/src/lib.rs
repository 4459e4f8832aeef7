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

//! secquest-core: the game engine behind secquest.
//!
//! This library holds everything that does not touch the outside world, so it
//! builds for WASM as well as the CLI:
//! - The question bank and answer grading
//! - The mastery scheduler that brings missed questions back
//! - Scoring, levels, streaks, achievements and cosmetics
//! - The run state machine and the game controller that owns all state
//! - Persistence over an abstract key-value store

pub mod achievements;
pub mod answer;
pub mod bank;
pub mod cosmetics;
pub mod error;
pub mod game;
pub mod markdown;
pub mod rng;
pub mod run;
pub mod scheduler;
pub mod scoring;
pub mod storage;
pub mod types;

pub use answer::{Answer, ScenarioStep, ScenarioWalk};
pub use bank::{ContentIssue, QuestionBank};
pub use error::{ErrorReport, Fallible, fail};
pub use game::{DomainStats, Game, Notice, NoticeKind, RunStart};
pub use run::{RunPhase, RunSetup, RunState};
pub use scheduler::MasteryMap;
pub use storage::{KeyValueStore, MemoryStore, SaveFile};
pub use types::date::Date;
pub use types::question::{Difficulty, Domain, Question, QuestionBody, QuestionPack};
pub use types::run::{RunMode, RunResult};
pub use types::timestamp::Timestamp;
