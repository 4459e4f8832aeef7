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

//! The in-memory question bank.

use std::collections::HashMap;
use std::collections::HashSet;
use std::fmt::Display;
use std::fmt::Formatter;

use crate::error::Fallible;
use crate::rng::TinyRng;
use crate::rng::shuffle;
use crate::types::question::Domain;
use crate::types::question::Question;
use crate::types::question::QuestionBody;
use crate::types::question::QuestionPack;

/// A problem found while validating content.
#[derive(Clone, Debug, PartialEq)]
pub struct ContentIssue {
    pub question_id: String,
    pub message: String,
}

impl Display for ContentIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.question_id, self.message)
    }
}

#[derive(Clone, Debug, Default)]
pub struct QuestionBank {
    questions: Vec<Question>,
    index: HashMap<String, usize>,
}

/// Parse a single question pack document.
pub fn parse_pack(text: &str) -> Fallible<QuestionPack> {
    Ok(serde_json::from_str(text)?)
}

impl QuestionBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a bank from parsed packs.
    ///
    /// Questions that fail validation, or reuse an id already in the bank, are
    /// skipped with a warning.
    pub fn from_packs(packs: Vec<QuestionPack>) -> Self {
        let mut bank = Self::new();
        for pack in packs {
            for question in pack.questions {
                let issues = validate_question(&question);
                if !issues.is_empty() {
                    for issue in issues {
                        log::warn!("Skipping question from pack '{}': {issue}", pack.pack_id);
                    }
                    continue;
                }
                if bank.index.contains_key(&question.id) {
                    log::warn!(
                        "Skipping duplicate question '{}' in pack '{}'",
                        question.id,
                        pack.pack_id
                    );
                    continue;
                }
                bank.index.insert(question.id.clone(), bank.questions.len());
                bank.questions.push(question);
            }
        }
        bank
    }

    /// Load packs from (filename, content) pairs. Files that fail to parse are
    /// skipped with a warning, so missing content yields an empty bank.
    pub fn load<'a>(files: impl Iterator<Item = (&'a str, &'a str)>) -> Self {
        let mut packs = Vec::new();
        for (filename, text) in files {
            match parse_pack(text) {
                Ok(pack) => {
                    log::debug!(
                        "Loaded pack '{}' ({} questions) from {filename}",
                        pack.pack_id,
                        pack.questions.len()
                    );
                    packs.push(pack);
                }
                Err(e) => log::warn!("Failed to load question pack {filename}: {e}"),
            }
        }
        Self::from_packs(packs)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn get(&self, id: &str) -> Option<&Question> {
        self.index.get(id).map(|&i| &self.questions[i])
    }

    pub fn by_domain(&self, domain: Domain) -> impl Iterator<Item = &Question> {
        self.questions.iter().filter(move |q| q.domain == domain)
    }

    /// Draw up to `count` distinct questions at random. An empty `domains`
    /// slice means every domain.
    pub fn pick_random(
        &self,
        count: usize,
        domains: &[Domain],
        exclude: &HashSet<String>,
        rng: &mut TinyRng,
    ) -> Vec<Question> {
        let pool: Vec<&Question> = self
            .questions
            .iter()
            .filter(|q| domains.is_empty() || domains.contains(&q.domain))
            .filter(|q| !exclude.contains(&q.id))
            .collect();
        shuffle(pool, rng)
            .into_iter()
            .take(count)
            .cloned()
            .collect()
    }
}

fn check_indices(len: usize, indices: &[usize], what: &str, issues: &mut Vec<String>) {
    for &i in indices {
        if i >= len {
            issues.push(format!("{what} index {i} out of range (have {len})"));
        }
    }
}

fn check_permutation(len: usize, indices: &[usize], what: &str, issues: &mut Vec<String>) {
    if indices.len() != len {
        issues.push(format!("{what} has {} entries, expected {len}", indices.len()));
        return;
    }
    let mut sorted = indices.to_vec();
    sorted.sort_unstable();
    if sorted != (0..len).collect::<Vec<_>>() {
        issues.push(format!("{what} is not a permutation of 0..{len}"));
    }
}

/// Structural problems with one question, as human-readable messages.
pub fn validate_question(question: &Question) -> Vec<String> {
    let mut issues = Vec::new();
    if question.id.trim().is_empty() {
        issues.push("empty question id".to_string());
    }
    match &question.body {
        QuestionBody::Mcq {
            choices,
            answer_index,
        } => {
            check_indices(choices.len(), &[*answer_index], "answer", &mut issues);
        }
        QuestionBody::Multi {
            choices,
            answer_indices,
            ..
        } => {
            if answer_indices.is_empty() {
                issues.push("multi-select question has no answers".to_string());
            }
            check_indices(choices.len(), answer_indices, "answer", &mut issues);
        }
        QuestionBody::Matching { left, right, pairs } => {
            if pairs.len() != left.len() {
                issues.push(format!(
                    "matching has {} pairs for {} left items",
                    pairs.len(),
                    left.len()
                ));
            }
            check_indices(right.len(), pairs, "pair", &mut issues);
        }
        QuestionBody::Ordering {
            steps,
            correct_order,
        } => {
            check_permutation(steps.len(), correct_order, "correct order", &mut issues);
        }
        QuestionBody::Scenario {
            start_node_id,
            nodes,
        } => {
            let ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
            if ids.len() != nodes.len() {
                issues.push("scenario has duplicate node ids".to_string());
            }
            if !ids.contains(start_node_id.as_str()) {
                issues.push(format!("scenario start node '{start_node_id}' not found"));
            }
            for node in nodes {
                if node.choices.is_empty() {
                    issues.push(format!("scenario node '{}' has no choices", node.id));
                }
                for choice in &node.choices {
                    match &choice.next_id {
                        Some(next) if !ids.contains(next.as_str()) => issues.push(format!(
                            "scenario node '{}' links to missing node '{next}'",
                            node.id
                        )),
                        None if choice.outcome.is_none() => issues.push(format!(
                            "scenario choice '{}' in node '{}' leads nowhere",
                            choice.label, node.id
                        )),
                        _ => {}
                    }
                }
            }
        }
    }
    issues
}

/// Validate every question in a set of packs, including id uniqueness across
/// packs.
pub fn validate_packs(packs: &[QuestionPack]) -> Vec<ContentIssue> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut issues = Vec::new();
    for pack in packs {
        for question in &pack.questions {
            for message in validate_question(question) {
                issues.push(ContentIssue {
                    question_id: question.id.clone(),
                    message,
                });
            }
            if !seen.insert(question.id.as_str()) {
                issues.push(ContentIssue {
                    question_id: question.id.clone(),
                    message: format!("duplicate id (pack '{}')", pack.pack_id),
                });
            }
        }
    }
    issues
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::question::Difficulty;
    use crate::types::question::ScenarioChoice;
    use crate::types::question::ScenarioNode;
    use crate::types::question::ScenarioOutcome;

    pub fn mcq(id: &str, domain: u8, difficulty: Difficulty) -> Question {
        Question {
            id: id.to_string(),
            domain: Domain::try_from(domain).unwrap(),
            objectives: vec![],
            difficulty,
            prompt: format!("Prompt {id}"),
            explanation: format!("Explanation {id}"),
            references: vec![],
            mnemonic: None,
            body: QuestionBody::Mcq {
                choices: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                answer_index: 0,
            },
        }
    }

    pub fn pack(questions: Vec<Question>) -> QuestionPack {
        QuestionPack {
            pack_id: "core".to_string(),
            title: "Core".to_string(),
            version: "1.0.0".to_string(),
            created_at: "2024-01-01".to_string(),
            questions,
        }
    }

    /// Five questions per domain, ids `d{domain}-q{n}`.
    pub fn sample_bank() -> QuestionBank {
        let mut questions = Vec::new();
        for domain in 1..=5 {
            for n in 0..5 {
                questions.push(mcq(&format!("d{domain}-q{n}"), domain, Difficulty::Medium));
            }
        }
        QuestionBank::from_packs(vec![pack(questions)])
    }

    #[test]
    fn test_load_skips_malformed_files() {
        let good = serde_json::to_string(&pack(vec![mcq("q1", 1, Difficulty::Easy)])).unwrap();
        let files = vec![("core.json", good.as_str()), ("broken.json", "{ not json")];
        let bank = QuestionBank::load(files.into_iter());
        assert_eq!(bank.len(), 1);
        assert!(bank.get("q1").is_some());
    }

    #[test]
    fn test_load_nothing_is_empty() {
        let bank = QuestionBank::load(std::iter::empty());
        assert!(bank.is_empty());
    }

    #[test]
    fn test_duplicates_are_dropped() {
        let mut second = mcq("q1", 2, Difficulty::Hard);
        second.prompt = "second".to_string();
        let bank = QuestionBank::from_packs(vec![pack(vec![mcq("q1", 1, Difficulty::Easy), second])]);
        assert_eq!(bank.len(), 1);
        assert_eq!(bank.get("q1").unwrap().prompt, "Prompt q1");
    }

    #[test]
    fn test_by_domain() {
        let bank = sample_bank();
        let domain = Domain::try_from(3).unwrap();
        let ids: Vec<&str> = bank.by_domain(domain).map(|q| q.id.as_str()).collect();
        assert_eq!(ids.len(), 5);
        assert!(ids.iter().all(|id| id.starts_with("d3-")));
    }

    #[test]
    fn test_pick_random_filters_and_limits() {
        let bank = sample_bank();
        let mut rng = TinyRng::from_seed(5);
        let domains = vec![Domain::try_from(1).unwrap(), Domain::try_from(2).unwrap()];
        let exclude: HashSet<String> = ["d1-q0".to_string()].into_iter().collect();
        let picked = bank.pick_random(100, &domains, &exclude, &mut rng);
        assert_eq!(picked.len(), 9);
        assert!(picked.iter().all(|q| domains.contains(&q.domain)));
        assert!(picked.iter().all(|q| q.id != "d1-q0"));

        let picked = bank.pick_random(3, &[], &HashSet::new(), &mut rng);
        assert_eq!(picked.len(), 3);
        let unique: HashSet<&str> = picked.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(unique.len(), 3);
    }

    #[test]
    fn test_validate_bad_mcq() {
        let mut q = mcq("bad", 1, Difficulty::Easy);
        q.body = QuestionBody::Mcq {
            choices: vec!["only".into()],
            answer_index: 3,
        };
        assert_eq!(validate_question(&q).len(), 1);
        let bank = QuestionBank::from_packs(vec![pack(vec![q])]);
        assert!(bank.is_empty());
    }

    #[test]
    fn test_validate_ordering_permutation() {
        let mut q = mcq("ord", 1, Difficulty::Easy);
        q.body = QuestionBody::Ordering {
            steps: vec!["a".into(), "b".into(), "c".into()],
            correct_order: vec![0, 0, 2],
        };
        assert_eq!(validate_question(&q), vec!["correct order is not a permutation of 0..3"]);
    }

    #[test]
    fn test_validate_scenario_dangling_link() {
        let mut q = mcq("scn", 4, Difficulty::Hard);
        q.body = QuestionBody::Scenario {
            start_node_id: "start".to_string(),
            nodes: vec![ScenarioNode {
                id: "start".to_string(),
                text: "What now?".to_string(),
                choices: vec![
                    ScenarioChoice {
                        label: "Go".to_string(),
                        next_id: Some("nowhere".to_string()),
                        outcome: None,
                        feedback: String::new(),
                        delta: None,
                    },
                    ScenarioChoice {
                        label: "Stop".to_string(),
                        next_id: None,
                        outcome: Some(ScenarioOutcome::Win),
                        feedback: String::new(),
                        delta: None,
                    },
                ],
            }],
        };
        let issues = validate_question(&q);
        assert_eq!(issues, vec!["scenario node 'start' links to missing node 'nowhere'"]);
    }

    #[test]
    fn test_validate_packs_reports_duplicates() {
        let packs = vec![
            pack(vec![mcq("q1", 1, Difficulty::Easy)]),
            pack(vec![mcq("q1", 2, Difficulty::Easy)]),
        ];
        let issues = validate_packs(&packs);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].question_id, "q1");
    }
}
