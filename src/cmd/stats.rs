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

use clap::ValueEnum;
use serde::Serialize;
use secquest_core::achievements::get_achievement;
use secquest_core::error::Fallible;
use secquest_core::game::DomainStats;
use secquest_core::game::Game;
use secquest_core::storage::KeyValueStore;
use secquest_core::types::question::Domain;
use secquest_core::types::timestamp::Timestamp;

use crate::collection::Collection;

#[derive(ValueEnum, Clone, Copy)]
pub enum StatsFormat {
    Text,
    Json,
}

impl Display for StatsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsFormat::Text => write!(f, "text"),
            StatsFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Serialize)]
struct DomainEntry {
    domain: u8,
    name: &'static str,
    boss_defeated: bool,
    #[serde(flatten)]
    stats: DomainStats,
}

#[derive(Serialize)]
pub struct Stats {
    name: String,
    level: u32,
    xp: u64,
    xp_to_next: u64,
    coins: u64,
    streak: u32,
    total_answered: u64,
    total_correct: u64,
    accuracy: f64,
    questions: usize,
    due: usize,
    runs: usize,
    achievements: Vec<String>,
    domains: Vec<DomainEntry>,
}

pub fn collect_stats<S: KeyValueStore>(game: &Game<S>, now: Timestamp) -> Stats {
    let profile = game.profile();
    Stats {
        name: profile.name.clone(),
        level: profile.level,
        xp: profile.xp,
        xp_to_next: profile.xp_to_next,
        coins: profile.coins,
        streak: profile.streak,
        total_answered: profile.total_answered,
        total_correct: profile.total_correct,
        accuracy: profile.accuracy(),
        questions: game.bank().len(),
        due: game.due_cards(now).len(),
        runs: game.history().len(),
        achievements: profile.achievement_ids.clone(),
        domains: Domain::ALL
            .iter()
            .map(|&domain| DomainEntry {
                domain: domain.number(),
                name: domain.name(),
                boss_defeated: profile.bosses_defeated.contains(&domain),
                stats: game.domain_stats(domain),
            })
            .collect(),
    }
}

fn print_text(stats: &Stats) {
    println!("{} - level {} ({}/{} XP)", stats.name, stats.level, stats.xp, stats.xp_to_next);
    println!("coins:    {}", stats.coins);
    println!("streak:   {} day(s)", stats.streak);
    println!(
        "answered: {} ({} correct, {:.0}%)",
        stats.total_answered,
        stats.total_correct,
        stats.accuracy * 100.0
    );
    println!("runs:     {}", stats.runs);
    println!("due now:  {} of {} questions", stats.due, stats.questions);
    println!();
    for entry in &stats.domains {
        let boss = if entry.boss_defeated { " [boss defeated]" } else { "" };
        println!(
            "  {}. {:<36} {:>3}/{:<3} seen, {:>3} mastered{boss}",
            entry.domain, entry.name, entry.stats.seen, entry.stats.total, entry.stats.mastered
        );
    }
    if !stats.achievements.is_empty() {
        println!();
        println!("achievements:");
        for id in &stats.achievements {
            match get_achievement(id) {
                Some(def) => println!("  {} {} - {}", def.icon, def.name, def.description),
                None => println!("  {id}"),
            }
        }
    }
}

pub fn print_stats(directory: Option<String>, format: StatsFormat) -> Fallible<()> {
    let game = Collection::new(directory)?.open_game()?;
    let stats = collect_stats(&game, Timestamp::now());
    match format {
        StatsFormat::Text => print_text(&stats),
        StatsFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
    }
    Ok(())
}
