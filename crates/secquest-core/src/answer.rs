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

//! Grading submitted answers.

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::error::Fallible;
use crate::error::fail;
use crate::types::question::Question;
use crate::types::question::QuestionBody;
use crate::types::question::ScenarioDelta;
use crate::types::question::ScenarioNode;
use crate::types::question::ScenarioOutcome;

/// A player's submission for a non-scenario question.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Answer {
    /// The chosen index of a single-choice question.
    Choice(usize),
    /// Every selected index of a multi-select question.
    Choices(Vec<usize>),
    /// For each left item, the index of the right item it was matched with.
    Matches(Vec<usize>),
    /// Step indices in the submitted order.
    Order(Vec<usize>),
}

/// Decide whether `answer` is a correct response to `question`.
pub fn grade(question: &Question, answer: &Answer) -> Fallible<bool> {
    match (&question.body, answer) {
        (QuestionBody::Mcq { answer_index, .. }, Answer::Choice(choice)) => {
            Ok(choice == answer_index)
        }
        (QuestionBody::Multi { answer_indices, .. }, Answer::Choices(selected)) => {
            let expected: BTreeSet<usize> = answer_indices.iter().copied().collect();
            let selected: BTreeSet<usize> = selected.iter().copied().collect();
            Ok(expected == selected)
        }
        (QuestionBody::Matching { pairs, .. }, Answer::Matches(matches)) => Ok(pairs == matches),
        (QuestionBody::Ordering { correct_order, .. }, Answer::Order(order)) => {
            Ok(correct_order == order)
        }
        (QuestionBody::Scenario { .. }, _) => {
            fail("scenario questions are answered one choice at a time")
        }
        (body, _) => fail(format!(
            "answer does not fit a {} question",
            body.type_name()
        )),
    }
}

/// What happened after picking a scenario choice.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ScenarioStep {
    /// The scenario goes on at another (or the same) node.
    Continue { feedback: String },
    /// The scenario ended.
    Resolved { won: bool, feedback: String },
}

/// Progress through a branching scenario question.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioWalk {
    pub question_id: String,
    pub node_id: String,
    /// Deltas of every choice taken so far.
    pub delta: ScenarioDelta,
    /// Feedback of the most recent choice.
    pub feedback: Option<String>,
    /// Set once a winning or losing choice is taken.
    pub won: Option<bool>,
}

impl ScenarioWalk {
    pub fn start(question: &Question) -> Fallible<Self> {
        match &question.body {
            QuestionBody::Scenario { start_node_id, .. } => Ok(Self {
                question_id: question.id.clone(),
                node_id: start_node_id.clone(),
                delta: ScenarioDelta::default(),
                feedback: None,
                won: None,
            }),
            body => fail(format!(
                "question '{}' is a {} question, not a scenario",
                question.id,
                body.type_name()
            )),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.won.is_some()
    }

    pub fn current_node<'q>(&self, question: &'q Question) -> Option<&'q ScenarioNode> {
        match &question.body {
            QuestionBody::Scenario { nodes, .. } => nodes.iter().find(|n| n.id == self.node_id),
            _ => None,
        }
    }

    /// Take choice number `index` at the current node.
    pub fn choose(&mut self, question: &Question, index: usize) -> Fallible<ScenarioStep> {
        if question.id != self.question_id {
            return fail(format!(
                "scenario walk is for '{}', not '{}'",
                self.question_id, question.id
            ));
        }
        if self.is_resolved() {
            return fail("scenario already resolved");
        }
        let node = match self.current_node(question) {
            Some(node) => node,
            None => return fail(format!("scenario node '{}' not found", self.node_id)),
        };
        let choice = match node.choices.get(index) {
            Some(choice) => choice.clone(),
            None => return fail(format!("no choice {index} at node '{}'", node.id)),
        };
        if let Some(delta) = choice.delta {
            self.delta = self.delta.combine(delta);
        }
        self.feedback = Some(choice.feedback.clone());
        let step = match (choice.outcome, &choice.next_id) {
            (Some(ScenarioOutcome::Win), _) => {
                self.won = Some(true);
                ScenarioStep::Resolved {
                    won: true,
                    feedback: choice.feedback,
                }
            }
            (Some(ScenarioOutcome::Lose), _) => {
                self.won = Some(false);
                ScenarioStep::Resolved {
                    won: false,
                    feedback: choice.feedback,
                }
            }
            (_, Some(next)) => {
                self.node_id = next.clone();
                ScenarioStep::Continue {
                    feedback: choice.feedback,
                }
            }
            (_, None) => ScenarioStep::Continue {
                feedback: choice.feedback,
            },
        };
        log::debug!("Scenario '{}' now at node '{}'", self.question_id, self.node_id);
        Ok(step)
    }

    /// XP award dictated by the choices taken, if any of them carried one.
    pub fn xp_override(&self) -> Option<u64> {
        self.delta.xp.map(|xp| xp.max(0) as u64)
    }

    /// Net change to the run's shields from the choices taken.
    pub fn shield_delta(&self) -> i32 {
        self.delta.shields.unwrap_or(0)
    }

    /// Coin award dictated by the choices taken, if any of them carried one.
    pub fn coin_override(&self) -> Option<u64> {
        self.delta.coins.map(|coins| coins.max(0) as u64)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::question::Difficulty;
    use crate::types::question::Domain;
    use crate::types::question::ScenarioChoice;

    fn question(body: QuestionBody) -> Question {
        Question {
            id: "q".to_string(),
            domain: Domain::try_from(1).unwrap(),
            objectives: vec![],
            difficulty: Difficulty::Easy,
            prompt: String::new(),
            explanation: String::new(),
            references: vec![],
            mnemonic: None,
            body,
        }
    }

    fn choice(label: &str, next: Option<&str>, outcome: Option<ScenarioOutcome>, xp: Option<i32>) -> ScenarioChoice {
        ScenarioChoice {
            label: label.to_string(),
            next_id: next.map(str::to_string),
            outcome,
            feedback: format!("after {label}"),
            delta: xp.map(|xp| ScenarioDelta {
                xp: Some(xp),
                coins: None,
                shields: None,
            }),
        }
    }

    /// start -> (investigate -> contain: win | ignore: lose)
    pub fn incident_scenario() -> Question {
        let mut q = question(QuestionBody::Scenario {
            start_node_id: "start".to_string(),
            nodes: vec![
                ScenarioNode {
                    id: "start".to_string(),
                    text: "An alert fires.".to_string(),
                    choices: vec![
                        choice("investigate", Some("triage"), Some(ScenarioOutcome::Continue), Some(10)),
                        choice("ignore", None, Some(ScenarioOutcome::Lose), None),
                    ],
                },
                ScenarioNode {
                    id: "triage".to_string(),
                    text: "It's ransomware.".to_string(),
                    choices: vec![
                        choice("contain", None, Some(ScenarioOutcome::Win), Some(15)),
                        choice("pay", None, Some(ScenarioOutcome::Lose), None),
                    ],
                },
            ],
        });
        q.id = "scn".to_string();
        q
    }

    #[test]
    fn test_grade_mcq() -> Fallible<()> {
        let q = question(QuestionBody::Mcq {
            choices: vec!["a".into(), "b".into()],
            answer_index: 1,
        });
        assert!(grade(&q, &Answer::Choice(1))?);
        assert!(!grade(&q, &Answer::Choice(0))?);
        Ok(())
    }

    #[test]
    fn test_grade_multi_ignores_order_and_repeats() -> Fallible<()> {
        let q = question(QuestionBody::Multi {
            choices: vec!["a".into(), "b".into(), "c".into()],
            answer_indices: vec![0, 2],
            select_count_hint: Some(2),
        });
        assert!(grade(&q, &Answer::Choices(vec![2, 0]))?);
        assert!(grade(&q, &Answer::Choices(vec![2, 0, 2]))?);
        assert!(!grade(&q, &Answer::Choices(vec![0]))?);
        assert!(!grade(&q, &Answer::Choices(vec![0, 1, 2]))?);
        Ok(())
    }

    #[test]
    fn test_grade_matching() -> Fallible<()> {
        let q = question(QuestionBody::Matching {
            left: vec!["SSH".into(), "HTTPS".into()],
            right: vec!["443".into(), "22".into()],
            pairs: vec![1, 0],
        });
        assert!(grade(&q, &Answer::Matches(vec![1, 0]))?);
        assert!(!grade(&q, &Answer::Matches(vec![0, 1]))?);
        assert!(!grade(&q, &Answer::Matches(vec![1]))?);
        Ok(())
    }

    #[test]
    fn test_grade_ordering() -> Fallible<()> {
        let q = question(QuestionBody::Ordering {
            steps: vec!["identify".into(), "contain".into(), "eradicate".into()],
            correct_order: vec![0, 1, 2],
        });
        assert!(grade(&q, &Answer::Order(vec![0, 1, 2]))?);
        assert!(!grade(&q, &Answer::Order(vec![1, 0, 2]))?);
        Ok(())
    }

    #[test]
    fn test_grade_wrong_kind_fails() {
        let q = question(QuestionBody::Mcq {
            choices: vec!["a".into()],
            answer_index: 0,
        });
        assert!(grade(&q, &Answer::Order(vec![0])).is_err());
        assert!(grade(&incident_scenario(), &Answer::Choice(0)).is_err());
    }

    #[test]
    fn test_scenario_win_path() -> Fallible<()> {
        let q = incident_scenario();
        let mut walk = ScenarioWalk::start(&q)?;
        assert_eq!(walk.current_node(&q).unwrap().id, "start");
        let step = walk.choose(&q, 0)?;
        assert_eq!(
            step,
            ScenarioStep::Continue {
                feedback: "after investigate".to_string()
            }
        );
        assert_eq!(walk.node_id, "triage");
        let step = walk.choose(&q, 0)?;
        assert_eq!(
            step,
            ScenarioStep::Resolved {
                won: true,
                feedback: "after contain".to_string()
            }
        );
        assert_eq!(walk.xp_override(), Some(25));
        assert_eq!(walk.coin_override(), None);
        assert!(walk.choose(&q, 0).is_err());
        Ok(())
    }

    #[test]
    fn test_scenario_lose_path() -> Fallible<()> {
        let q = incident_scenario();
        let mut walk = ScenarioWalk::start(&q)?;
        let step = walk.choose(&q, 1)?;
        assert!(matches!(step, ScenarioStep::Resolved { won: false, .. }));
        assert_eq!(walk.won, Some(false));
        assert_eq!(walk.xp_override(), None);
        Ok(())
    }

    #[test]
    fn test_scenario_bad_choice() -> Fallible<()> {
        let q = incident_scenario();
        let mut walk = ScenarioWalk::start(&q)?;
        assert!(walk.choose(&q, 7).is_err());
        assert_eq!(walk.node_id, "start");
        Ok(())
    }
}
