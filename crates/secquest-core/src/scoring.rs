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

//! Reward arithmetic: experience, coins, shields, levels and daily streaks.

use crate::rng::TinyRng;
use crate::types::date::Date;
use crate::types::profile::PlayerProfile;
use crate::types::question::Difficulty;

/// The streak multiplier never exceeds this.
const MAX_STREAK_MULTIPLIER: f64 = 1.5;

/// Each day of streak adds this much to the multiplier.
const STREAK_STEP: f64 = 0.05;

/// Probability that a correct answer pays a coin bonus.
const COIN_BONUS_CHANCE: f64 = 0.1;

/// Probability that a correct answer drops a shield.
const SHIELD_DROP_CHANCE: f64 = 0.15;

/// Experience needed to go from level 1 to level 2.
const BASE_LEVEL_XP: f64 = 100.0;

/// Each level needs this much more experience than the last.
const LEVEL_GROWTH: f64 = 1.15;

pub fn base_xp(difficulty: Difficulty) -> u64 {
    match difficulty {
        Difficulty::Easy => 10,
        Difficulty::Medium => 20,
        Difficulty::Hard => 35,
    }
}

pub fn streak_multiplier(streak: u32) -> f64 {
    f64::min(MAX_STREAK_MULTIPLIER, 1.0 + streak as f64 * STREAK_STEP)
}

pub fn compute_xp(difficulty: Difficulty, streak: u32) -> u64 {
    compute_xp_with_bonus(difficulty, streak, 0)
}

/// Like [`compute_xp`], with a flat bonus added before the multiplier.
pub fn compute_xp_with_bonus(difficulty: Difficulty, streak: u32, time_bonus: u64) -> u64 {
    let base = (base_xp(difficulty) + time_bonus) as f64;
    (base * streak_multiplier(streak)).round() as u64
}

pub fn coins_for_correct(difficulty: Difficulty, rng: &mut TinyRng) -> u64 {
    let base = match difficulty {
        Difficulty::Easy => 1,
        Difficulty::Medium => 3,
        Difficulty::Hard => 5,
    };
    let bonus = if rng.chance(COIN_BONUS_CHANCE) {
        rng.generate(3) as u64 + 1
    } else {
        0
    };
    base + bonus
}

pub fn should_drop_shield(rng: &mut TinyRng) -> bool {
    rng.chance(SHIELD_DROP_CHANCE)
}

pub fn xp_to_next_level(level: u32) -> u64 {
    let exponent = level as f64 - 1.0;
    (BASE_LEVEL_XP * LEVEL_GROWTH.powf(exponent)).round() as u64
}

/// Add experience to the profile, rolling any overflow into level ups.
/// Returns the number of levels gained.
pub fn apply_xp(profile: &mut PlayerProfile, xp: u64) -> u32 {
    if profile.xp_to_next == 0 {
        profile.xp_to_next = xp_to_next_level(profile.level).max(1);
    }
    let mut gained = 0;
    profile.xp = profile.xp.saturating_add(xp);
    while profile.xp >= profile.xp_to_next {
        profile.xp -= profile.xp_to_next;
        profile.level += 1;
        gained += 1;
        profile.xp_to_next = xp_to_next_level(profile.level).max(1);
    }
    gained
}

/// Advance the daily streak for activity on `today`.
///
/// Activity on consecutive days extends the streak; a gap resets it to 1.
/// Returns false if the profile was already active today.
pub fn update_streak(profile: &mut PlayerProfile, today: Date) -> bool {
    match profile.last_active_date.map(|last| today.days_since(last)) {
        Some(0) => return false,
        Some(1) => profile.streak += 1,
        _ => profile.streak = 1,
    }
    profile.last_active_date = Some(today);
    true
}
