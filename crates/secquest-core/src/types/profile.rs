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

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::types::date::Date;
use crate::types::question::Domain;

/// The player's persistent progression.
///
/// Deserialization fills missing fields from [`PlayerProfile::default`], so
/// profiles saved by older versions load without losing what they do have.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerProfile {
    pub name: String,
    pub level: u32,
    pub xp: u64,
    pub xp_to_next: u64,
    pub coins: u64,
    /// Consecutive days with activity.
    pub streak: u32,
    #[serde(deserialize_with = "crate::types::date::deserialize_optional")]
    pub last_active_date: Option<Date>,
    pub total_correct: u64,
    pub total_answered: u64,
    pub shields: u32,
    /// Cosmetic slot (hat, frame, theme, badge) to equipped cosmetic id.
    pub equipped_cosmetics: BTreeMap<String, String>,
    pub unlocked_cosmetic_ids: Vec<String>,
    pub achievement_ids: Vec<String>,
    pub bosses_defeated: Vec<Domain>,
}

impl Default for PlayerProfile {
    fn default() -> Self {
        Self {
            name: "Agent".to_string(),
            level: 1,
            xp: 0,
            xp_to_next: 100,
            coins: 0,
            streak: 0,
            last_active_date: None,
            total_correct: 0,
            total_answered: 0,
            shields: 0,
            equipped_cosmetics: BTreeMap::new(),
            unlocked_cosmetic_ids: Vec::new(),
            achievement_ids: Vec::new(),
            bosses_defeated: Vec::new(),
        }
    }
}

impl PlayerProfile {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn accuracy(&self) -> f64 {
        if self.total_answered == 0 {
            0.0
        } else {
            self.total_correct as f64 / self.total_answered as f64
        }
    }

    pub fn has_achievement(&self, id: &str) -> bool {
        self.achievement_ids.iter().any(|a| a == id)
    }

    pub fn owns_cosmetic(&self, id: &str) -> bool {
        self.unlocked_cosmetic_ids.iter().any(|c| c == id)
    }

    /// Record a boss as defeated. Returns false if it already was.
    pub fn defeat_boss(&mut self, domain: Domain) -> bool {
        if self.bosses_defeated.contains(&domain) {
            false
        } else {
            self.bosses_defeated.push(domain);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fallible;

    #[test]
    fn test_partial_profile_fills_defaults() -> Fallible<()> {
        let profile: PlayerProfile = serde_json::from_str(r#"{"coins": 42, "level": 3}"#)?;
        assert_eq!(profile.coins, 42);
        assert_eq!(profile.level, 3);
        assert_eq!(profile.name, "Agent");
        assert_eq!(profile.xp_to_next, 100);
        Ok(())
    }

    #[test]
    fn test_defeat_boss_is_idempotent() -> Fallible<()> {
        let mut profile = PlayerProfile::default();
        let domain = Domain::try_from(2)?;
        assert!(profile.defeat_boss(domain));
        assert!(!profile.defeat_boss(domain));
        assert_eq!(profile.bosses_defeated, vec![domain]);
        Ok(())
    }
}
