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

//! Badges unlocked by reaching milestones.

use crate::bank::QuestionBank;
use crate::scheduler::MasteryMap;
use crate::types::mastery::MasteryStatus;
use crate::types::profile::PlayerProfile;
use crate::types::run::RunResult;

/// A flawless run must have at least this many questions.
const FLAWLESS_MIN_QUESTIONS: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Condition {
    TotalCorrect(u64),
    Streak(u32),
    Level(u32),
    RunsCompleted(usize),
    FlawlessRun,
    BossesDefeated(usize),
    Mastered(usize),
    DomainCorrect { domain: u8, min: u64 },
    Coins(u64),
}

#[derive(Debug)]
pub struct AchievementDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub condition: Condition,
    /// A cosmetic granted alongside the badge.
    pub reward_cosmetic: Option<&'static str>,
}

const fn def(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    condition: Condition,
) -> AchievementDef {
    AchievementDef {
        id,
        name,
        description,
        icon,
        condition,
        reward_cosmetic: None,
    }
}

pub static ACHIEVEMENTS: [AchievementDef; 25] = [
    AchievementDef {
        reward_cosmetic: Some("badge-firstblood"),
        ..def("first-blood", "First Blood", "Answer your first question correctly.", "🩸", Condition::TotalCorrect(1))
    },
    def("ten-down", "Ten Down", "Get 10 correct answers.", "🔟", Condition::TotalCorrect(10)),
    def("fifty-down", "Half Century", "Get 50 correct answers.", "5️⃣", Condition::TotalCorrect(50)),
    def("century", "Century", "100 correct answers.", "💯", Condition::TotalCorrect(100)),
    def("streak-3", "On Fire", "3-day streak.", "🔥", Condition::Streak(3)),
    AchievementDef {
        reward_cosmetic: Some("badge-streaker"),
        ..def("streak-7", "Week Warrior", "7-day streak.", "⚡", Condition::Streak(7))
    },
    def("streak-14", "Fortnight Force", "14-day streak.", "🌟", Condition::Streak(14)),
    def("streak-30", "Monthly Master", "30-day streak.", "🏆", Condition::Streak(30)),
    def("level-5", "Rising Star", "Reach level 5.", "⭐", Condition::Level(5)),
    def("level-10", "Veteran", "Reach level 10.", "🎖️", Condition::Level(10)),
    def("level-20", "Elite Agent", "Reach level 20.", "🏅", Condition::Level(20)),
    def("first-run", "First Mission", "Complete your first run.", "🎯", Condition::RunsCompleted(1)),
    def("ten-runs", "Regular", "Complete 10 runs.", "🔄", Condition::RunsCompleted(10)),
    def("flawless-run", "Flawless", "Complete a run with 100% accuracy.", "💎", Condition::FlawlessRun),
    def("boss-slayer", "Boss Slayer", "Defeat your first boss.", "🐉", Condition::BossesDefeated(1)),
    def("all-bosses", "Domain Master", "Defeat all 5 domain bosses.", "👑", Condition::BossesDefeated(5)),
    def("mastered-10", "Knowledge Base", "Master 10 questions.", "📚", Condition::Mastered(10)),
    def("mastered-50", "Scholar", "Master 50 questions.", "🎓", Condition::Mastered(50)),
    def("d1-specialist", "Threat Hunter", "25 correct in Domain 1.", "🕵️", Condition::DomainCorrect { domain: 1, min: 25 }),
    def("d2-specialist", "Architect", "25 correct in Domain 2.", "🏛️", Condition::DomainCorrect { domain: 2, min: 25 }),
    def("d3-specialist", "Implementer", "25 correct in Domain 3.", "⚙️", Condition::DomainCorrect { domain: 3, min: 25 }),
    def("d4-specialist", "Incident Commander", "25 correct in Domain 4.", "🚨", Condition::DomainCorrect { domain: 4, min: 25 }),
    def("d5-specialist", "Compliance Officer", "25 correct in Domain 5.", "📋", Condition::DomainCorrect { domain: 5, min: 25 }),
    def("coin-100", "Penny Pincher", "Earn 100 coins total.", "🪙", Condition::Coins(100)),
    def("coin-500", "Treasure Hunter", "Earn 500 coins total.", "💰", Condition::Coins(500)),
];

/// Everything a condition may look at.
pub struct AchievementContext<'a> {
    pub profile: &'a PlayerProfile,
    pub mastery: &'a MasteryMap,
    pub history: &'a [RunResult],
    pub bank: &'a QuestionBank,
}

impl AchievementContext<'_> {
    fn mastered_count(&self) -> usize {
        self.mastery
            .values()
            .filter(|m| m.status == MasteryStatus::Mastered)
            .count()
    }

    fn domain_correct(&self, domain: u8) -> u64 {
        self.mastery
            .values()
            .filter(|m| {
                self.bank
                    .get(&m.question_id)
                    .is_some_and(|q| q.domain.number() == domain)
            })
            .map(|m| m.times_correct as u64)
            .sum()
    }

    fn is_met(&self, condition: Condition) -> bool {
        match condition {
            Condition::TotalCorrect(min) => self.profile.total_correct >= min,
            Condition::Streak(min) => self.profile.streak >= min,
            Condition::Level(min) => self.profile.level >= min,
            Condition::RunsCompleted(min) => self.history.len() >= min,
            Condition::FlawlessRun => self
                .history
                .iter()
                .any(|r| r.is_flawless() && r.total_questions >= FLAWLESS_MIN_QUESTIONS),
            Condition::BossesDefeated(min) => self.profile.bosses_defeated.len() >= min,
            Condition::Mastered(min) => self.mastered_count() >= min,
            Condition::DomainCorrect { domain, min } => self.domain_correct(domain) >= min,
            Condition::Coins(min) => self.profile.coins >= min,
        }
    }
}

/// Ids of achievements whose condition now holds but which the profile has
/// not recorded yet.
pub fn check_achievements(ctx: &AchievementContext) -> Vec<&'static str> {
    ACHIEVEMENTS
        .iter()
        .filter(|def| !ctx.profile.has_achievement(def.id))
        .filter(|def| ctx.is_met(def.condition))
        .map(|def| def.id)
        .collect()
}

pub fn get_achievement(id: &str) -> Option<&'static AchievementDef> {
    ACHIEVEMENTS.iter().find(|def| def.id == id)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::bank::tests::sample_bank;
    use crate::types::mastery::MasteryState;
    use crate::types::question::Domain;
    use crate::types::run::RunMode;
    use crate::types::timestamp::Timestamp;

    fn run(correct: usize, total: usize) -> RunResult {
        RunResult {
            id: format!("run-{correct}-{total}"),
            mode: RunMode::Adventure,
            domains: vec![],
            total_questions: total,
            correct,
            wrong: total - correct,
            xp_earned: 0,
            coins_earned: 0,
            timestamp: Timestamp::try_from("2024-01-01T00:00:00.000".to_string()).unwrap(),
            loot_drops: vec![],
            duration: 0,
        }
    }

    #[test]
    fn test_ids_are_unique() {
        let ids: HashSet<&str> = ACHIEVEMENTS.iter().map(|a| a.id).collect();
        assert_eq!(ids.len(), ACHIEVEMENTS.len());
    }

    #[test]
    fn test_fresh_profile_has_none() {
        let bank = sample_bank();
        let ctx = AchievementContext {
            profile: &PlayerProfile::default(),
            mastery: &MasteryMap::new(),
            history: &[],
            bank: &bank,
        };
        assert!(check_achievements(&ctx).is_empty());
    }

    #[test]
    fn test_thresholds() {
        let bank = sample_bank();
        let profile = PlayerProfile {
            total_correct: 12,
            streak: 3,
            level: 5,
            coins: 150,
            ..PlayerProfile::default()
        };
        let ctx = AchievementContext {
            profile: &profile,
            mastery: &MasteryMap::new(),
            history: &[],
            bank: &bank,
        };
        assert_eq!(
            check_achievements(&ctx),
            vec!["first-blood", "ten-down", "streak-3", "level-5", "coin-100"]
        );
    }

    #[test]
    fn test_idempotent_after_recording() {
        let bank = sample_bank();
        let mut profile = PlayerProfile {
            total_correct: 1,
            ..PlayerProfile::default()
        };
        let history = vec![run(5, 5)];
        let first = {
            let ctx = AchievementContext {
                profile: &profile,
                mastery: &MasteryMap::new(),
                history: &history,
                bank: &bank,
            };
            check_achievements(&ctx)
        };
        assert_eq!(first, vec!["first-blood", "first-run", "flawless-run"]);
        profile.achievement_ids.extend(first.iter().map(|s| s.to_string()));
        let ctx = AchievementContext {
            profile: &profile,
            mastery: &MasteryMap::new(),
            history: &history,
            bank: &bank,
        };
        assert!(check_achievements(&ctx).is_empty());
    }

    #[test]
    fn test_short_perfect_run_is_not_flawless() {
        let bank = sample_bank();
        let history = vec![run(4, 4)];
        let ctx = AchievementContext {
            profile: &PlayerProfile::default(),
            mastery: &MasteryMap::new(),
            history: &history,
            bank: &bank,
        };
        assert_eq!(check_achievements(&ctx), vec!["first-run"]);
    }

    #[test]
    fn test_domain_and_mastered_counts() {
        let bank = sample_bank();
        let mut mastery = MasteryMap::new();
        for n in 0..5 {
            let id = format!("d2-q{n}");
            let mut state = MasteryState::new(id.clone());
            state.times_seen = 5;
            state.times_correct = 5;
            state.status = MasteryStatus::Mastered;
            mastery.insert(id, state);
        }
        let ctx = AchievementContext {
            profile: &PlayerProfile::default(),
            mastery: &mastery,
            history: &[],
            bank: &bank,
        };
        assert!(check_achievements(&ctx).contains(&"d2-specialist"));
        assert!(!check_achievements(&ctx).contains(&"mastered-10"));
    }

    #[test]
    fn test_bosses() {
        let bank = sample_bank();
        let profile = PlayerProfile {
            bosses_defeated: Domain::ALL.to_vec(),
            ..PlayerProfile::default()
        };
        let ctx = AchievementContext {
            profile: &profile,
            mastery: &MasteryMap::new(),
            history: &[],
            bank: &bank,
        };
        let unlocked = check_achievements(&ctx);
        assert!(unlocked.contains(&"boss-slayer"));
        assert!(unlocked.contains(&"all-bosses"));
    }

    #[test]
    fn test_get_achievement() {
        assert_eq!(get_achievement("streak-7").unwrap().reward_cosmetic, Some("badge-streaker"));
        assert!(get_achievement("nope").is_none());
    }
}
