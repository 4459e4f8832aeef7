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

//! The cosmetic shop.

use std::fmt::Display;
use std::fmt::Formatter;

use crate::error::Fallible;
use crate::error::fail;
use crate::types::profile::PlayerProfile;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum CosmeticSlot {
    Hat,
    Frame,
    Theme,
    Badge,
}

impl CosmeticSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            CosmeticSlot::Hat => "hat",
            CosmeticSlot::Frame => "frame",
            CosmeticSlot::Theme => "theme",
            CosmeticSlot::Badge => "badge",
        }
    }
}

impl Display for CosmeticSlot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug)]
pub struct Cosmetic {
    pub id: &'static str,
    pub name: &'static str,
    pub slot: CosmeticSlot,
    pub description: &'static str,
    /// Zero for items that can only be earned through achievements.
    pub cost: u64,
    pub icon: &'static str,
}

impl Cosmetic {
    pub fn is_purchasable(&self) -> bool {
        self.cost > 0
    }
}

pub static ALL_COSMETICS: [Cosmetic; 10] = [
    Cosmetic { id: "hat-hacker", name: "Hacker Hood", slot: CosmeticSlot::Hat, description: "A dark hoodie befitting a white-hat.", cost: 50, icon: "🧥" },
    Cosmetic { id: "hat-shield", name: "Shield Helm", slot: CosmeticSlot::Hat, description: "Armor for your avatar.", cost: 100, icon: "🛡️" },
    Cosmetic { id: "hat-crown", name: "Cyber Crown", slot: CosmeticSlot::Hat, description: "For the Security+ royalty.", cost: 200, icon: "👑" },
    Cosmetic { id: "frame-fire", name: "Fire Frame", slot: CosmeticSlot::Frame, description: "A blazing border.", cost: 75, icon: "🔥" },
    Cosmetic { id: "frame-ice", name: "Ice Frame", slot: CosmeticSlot::Frame, description: "Cool and collected.", cost: 75, icon: "❄️" },
    Cosmetic { id: "frame-matrix", name: "Matrix Frame", slot: CosmeticSlot::Frame, description: "Green rain aesthetic.", cost: 150, icon: "💚" },
    Cosmetic { id: "theme-midnight", name: "Midnight Theme", slot: CosmeticSlot::Theme, description: "Even darker mode.", cost: 100, icon: "🌙" },
    Cosmetic { id: "theme-neon", name: "Neon Theme", slot: CosmeticSlot::Theme, description: "Bright neon accents.", cost: 100, icon: "💡" },
    Cosmetic { id: "badge-firstblood", name: "First Blood", slot: CosmeticSlot::Badge, description: "Your first correct answer.", cost: 0, icon: "🩸" },
    Cosmetic { id: "badge-streaker", name: "Streaker", slot: CosmeticSlot::Badge, description: "7-day streak.", cost: 0, icon: "🔥" },
];

pub fn get_cosmetic(id: &str) -> Option<&'static Cosmetic> {
    ALL_COSMETICS.iter().find(|c| c.id == id)
}

/// Spend coins on a cosmetic.
pub fn buy_cosmetic(profile: &mut PlayerProfile, id: &str) -> Fallible<&'static Cosmetic> {
    let Some(cosmetic) = get_cosmetic(id) else {
        return fail(format!("no such cosmetic: {id}"));
    };
    if profile.owns_cosmetic(id) {
        return fail(format!("'{}' is already owned", cosmetic.name));
    }
    if !cosmetic.is_purchasable() {
        return fail(format!("'{}' is earned through an achievement", cosmetic.name));
    }
    if profile.coins < cosmetic.cost {
        return fail(format!(
            "'{}' costs {} coins, you have {}",
            cosmetic.name, cosmetic.cost, profile.coins
        ));
    }
    profile.coins -= cosmetic.cost;
    profile.unlocked_cosmetic_ids.push(id.to_string());
    Ok(cosmetic)
}

/// Give a cosmetic for free. Returns false if it was already owned.
pub fn grant_cosmetic(profile: &mut PlayerProfile, id: &str) -> bool {
    if profile.owns_cosmetic(id) {
        false
    } else {
        profile.unlocked_cosmetic_ids.push(id.to_string());
        true
    }
}

/// Put an owned cosmetic in its slot, replacing whatever was there.
pub fn equip_cosmetic(profile: &mut PlayerProfile, id: &str) -> Fallible<&'static Cosmetic> {
    let Some(cosmetic) = get_cosmetic(id) else {
        return fail(format!("no such cosmetic: {id}"));
    };
    if !profile.owns_cosmetic(id) {
        return fail(format!("'{}' is not owned", cosmetic.name));
    }
    profile
        .equipped_cosmetics
        .insert(cosmetic.slot.as_str().to_string(), id.to_string());
    Ok(cosmetic)
}

pub fn is_equipped(profile: &PlayerProfile, id: &str) -> bool {
    profile.equipped_cosmetics.values().any(|e| e == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buy_deducts_coins() -> Fallible<()> {
        let mut profile = PlayerProfile {
            coins: 120,
            ..PlayerProfile::default()
        };
        buy_cosmetic(&mut profile, "frame-fire")?;
        assert_eq!(profile.coins, 45);
        assert!(profile.owns_cosmetic("frame-fire"));
        Ok(())
    }

    #[test]
    fn test_buy_rejections() {
        let mut profile = PlayerProfile {
            coins: 60,
            ..PlayerProfile::default()
        };
        assert!(buy_cosmetic(&mut profile, "hat-crown").is_err());
        assert!(buy_cosmetic(&mut profile, "badge-firstblood").is_err());
        assert!(buy_cosmetic(&mut profile, "nope").is_err());
        assert!(buy_cosmetic(&mut profile, "hat-hacker").is_ok());
        profile.coins = 500;
        assert!(buy_cosmetic(&mut profile, "hat-hacker").is_err());
        assert_eq!(profile.coins, 500);
    }

    #[test]
    fn test_equip_replaces_slot() -> Fallible<()> {
        let mut profile = PlayerProfile::default();
        assert!(equip_cosmetic(&mut profile, "hat-hacker").is_err());
        grant_cosmetic(&mut profile, "hat-hacker");
        grant_cosmetic(&mut profile, "hat-crown");
        equip_cosmetic(&mut profile, "hat-hacker")?;
        equip_cosmetic(&mut profile, "hat-crown")?;
        assert_eq!(profile.equipped_cosmetics.len(), 1);
        assert!(is_equipped(&profile, "hat-crown"));
        assert!(!is_equipped(&profile, "hat-hacker"));
        Ok(())
    }

    #[test]
    fn test_grant_is_idempotent() {
        let mut profile = PlayerProfile::default();
        assert!(grant_cosmetic(&mut profile, "badge-streaker"));
        assert!(!grant_cosmetic(&mut profile, "badge-streaker"));
        assert_eq!(profile.unlocked_cosmetic_ids.len(), 1);
    }
}
