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

//! Persisting game state to a key-value store.

use std::collections::HashMap;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::scheduler::MasteryMap;
use crate::types::profile::PlayerProfile;
use crate::types::run::RunResult;
use crate::types::settings::GameSettings;

pub const PROFILE_KEY: &str = "secplus_profile";
pub const MASTERY_KEY: &str = "secplus_mastery";
pub const HISTORY_KEY: &str = "secplus_history";
pub const SETTINGS_KEY: &str = "secplus_settings";

/// How many run results the history keeps.
pub const HISTORY_LIMIT: usize = 50;

/// A string-keyed store of JSON blobs.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Fallible<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Fallible<()>;
    fn remove(&mut self, key: &str) -> Fallible<()>;
}

/// A store that lives only as long as the process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Fallible<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Fallible<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Fallible<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Read a blob, falling back to the default when it is missing, unreadable
/// or malformed.
fn load_or_default<T: DeserializeOwned + Default>(store: &impl KeyValueStore, key: &str) -> T {
    let text = match store.get(key) {
        Ok(Some(text)) => text,
        Ok(None) => return T::default(),
        Err(e) => {
            log::warn!("Failed to read '{key}', using defaults: {e}");
            return T::default();
        }
    };
    match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Malformed '{key}', using defaults: {e}");
            T::default()
        }
    }
}

fn save<T: Serialize + ?Sized>(store: &mut impl KeyValueStore, key: &str, value: &T) -> Fallible<()> {
    let text = serde_json::to_string(value)?;
    store
        .set(key, &text)
        .map_err(|e| e.context(format!("failed to save '{key}'")))
}

pub fn load_profile(store: &impl KeyValueStore) -> PlayerProfile {
    load_or_default(store, PROFILE_KEY)
}

pub fn load_mastery(store: &impl KeyValueStore) -> MasteryMap {
    load_or_default(store, MASTERY_KEY)
}

pub fn load_history(store: &impl KeyValueStore) -> Vec<RunResult> {
    parse_history(load_or_default(store, HISTORY_KEY))
}

/// Parse run results one at a time, dropping the ones this build cannot
/// read (such as runs of a mode it does not have).
fn parse_history(entries: Vec<serde_json::Value>) -> Vec<RunResult> {
    entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value(entry) {
            Ok(result) => Some(result),
            Err(e) => {
                log::warn!("Skipping unreadable run result: {e}");
                None
            }
        })
        .collect()
}

fn deserialize_history<'de, D>(deserializer: D) -> Result<Option<Vec<RunResult>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.map(parse_history))
}

pub fn load_settings(store: &impl KeyValueStore) -> GameSettings {
    load_or_default(store, SETTINGS_KEY)
}

pub fn save_profile(store: &mut impl KeyValueStore, profile: &PlayerProfile) -> Fallible<()> {
    save(store, PROFILE_KEY, profile)
}

pub fn save_mastery(store: &mut impl KeyValueStore, mastery: &MasteryMap) -> Fallible<()> {
    save(store, MASTERY_KEY, mastery)
}

/// Save the most recent [`HISTORY_LIMIT`] results.
pub fn save_history(store: &mut impl KeyValueStore, history: &[RunResult]) -> Fallible<()> {
    let start = history.len().saturating_sub(HISTORY_LIMIT);
    save(store, HISTORY_KEY, &history[start..])
}

pub fn save_settings(store: &mut impl KeyValueStore, settings: &GameSettings) -> Fallible<()> {
    save(store, SETTINGS_KEY, settings)
}

/// A full backup of the persisted state.
///
/// On import, each section that is present overwrites the stored one and
/// absent sections are left alone.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<PlayerProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mastery: Option<MasteryMap>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_history"
    )]
    pub history: Option<Vec<RunResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<GameSettings>,
}

impl SaveFile {
    pub fn parse(text: &str) -> Fallible<Self> {
        serde_json::from_str(text).map_err(|e| ErrorReport::from(e).context("malformed save file"))
    }

    pub fn to_json(&self) -> Fallible<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Snapshot everything in the store.
pub fn export_save(store: &impl KeyValueStore) -> SaveFile {
    SaveFile {
        profile: Some(load_profile(store)),
        mastery: Some(load_mastery(store)),
        history: Some(load_history(store)),
        settings: Some(load_settings(store)),
    }
}

pub fn import_save(store: &mut impl KeyValueStore, save: &SaveFile) -> Fallible<()> {
    if let Some(profile) = &save.profile {
        save_profile(store, profile)?;
    }
    if let Some(mastery) = &save.mastery {
        save_mastery(store, mastery)?;
    }
    if let Some(history) = &save.history {
        save_history(store, history)?;
    }
    if let Some(settings) = &save.settings {
        save_settings(store, settings)?;
    }
    Ok(())
}

/// Forget all progress. Settings survive.
pub fn reset_progress(store: &mut impl KeyValueStore) -> Fallible<()> {
    store.remove(PROFILE_KEY)?;
    store.remove(MASTERY_KEY)?;
    store.remove(HISTORY_KEY)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::update_mastery;
    use crate::types::mastery::MasteryState;
    use crate::types::run::RunMode;
    use crate::types::timestamp::Timestamp;

    fn result(n: usize) -> Fallible<RunResult> {
        Ok(RunResult {
            id: format!("run-{n}"),
            mode: RunMode::Adventure,
            domains: vec![],
            total_questions: 10,
            correct: 7,
            wrong: 3,
            xp_earned: 140,
            coins_earned: 21,
            timestamp: Timestamp::try_from("2024-05-01T12:00:00.000".to_string())?,
            loot_drops: vec![],
            duration: 60_000,
        })
    }

    #[test]
    fn test_missing_keys_load_defaults() {
        let store = MemoryStore::new();
        assert_eq!(load_profile(&store), PlayerProfile::default());
        assert!(load_mastery(&store).is_empty());
        assert!(load_history(&store).is_empty());
        assert_eq!(load_settings(&store), GameSettings::default());
    }

    #[test]
    fn test_malformed_blob_loads_default() -> Fallible<()> {
        let mut store = MemoryStore::new();
        store.set(PROFILE_KEY, "{ nope")?;
        store.set(HISTORY_KEY, r#"{"not": "a list"}"#)?;
        assert_eq!(load_profile(&store), PlayerProfile::default());
        assert!(load_history(&store).is_empty());
        Ok(())
    }

    #[test]
    fn test_history_is_capped() -> Fallible<()> {
        let mut store = MemoryStore::new();
        let history = (0..60).map(result).collect::<Fallible<Vec<_>>>()?;
        save_history(&mut store, &history)?;
        let loaded = load_history(&store);
        assert_eq!(loaded.len(), HISTORY_LIMIT);
        assert_eq!(loaded[0].id, "run-10");
        assert_eq!(loaded[49].id, "run-59");
        Ok(())
    }

    #[test]
    fn test_export_import_round_trip() -> Fallible<()> {
        let mut store = MemoryStore::new();
        let profile = PlayerProfile {
            coins: 77,
            level: 4,
            ..PlayerProfile::named("Mallory")
        };
        let now = Timestamp::try_from("2024-05-01T12:00:00.000".to_string())?;
        let mut mastery = MasteryMap::new();
        mastery.insert("q1".into(), update_mastery(&MasteryState::new("q1"), true, now));
        save_profile(&mut store, &profile)?;
        save_mastery(&mut store, &mastery)?;
        save_history(&mut store, &[result(1)?])?;
        save_settings(
            &mut store,
            &GameSettings {
                forge_size: 15,
                ..GameSettings::default()
            },
        )?;

        let text = export_save(&store).to_json()?;
        let mut other = MemoryStore::new();
        import_save(&mut other, &SaveFile::parse(&text)?)?;
        assert_eq!(export_save(&other), export_save(&store));
        assert_eq!(load_profile(&other).name, "Mallory");
        Ok(())
    }

    #[test]
    fn test_import_partial_keeps_other_keys() -> Fallible<()> {
        let mut store = MemoryStore::new();
        save_history(&mut store, &[result(1)?])?;
        import_save(&mut store, &SaveFile::parse(r#"{"profile": {"coins": 5}}"#)?)?;
        assert_eq!(load_profile(&store).coins, 5);
        assert_eq!(load_history(&store).len(), 1);
        Ok(())
    }

    #[test]
    fn test_import_browser_save() -> Fallible<()> {
        let text = r#"{
          "profile": {
            "name": "Agent", "level": 7, "xp": 40, "xpToNext": 700, "coins": 300,
            "streak": 0, "lastActiveDate": "", "totalCorrect": 90, "totalAnswered": 120,
            "shields": 1, "equippedCosmetics": {"hat": "hat_hood"},
            "unlockedCosmeticIds": ["hat_hood"], "achievementIds": ["first_blood"],
            "bossesDefeated": [1, 3]
          },
          "mastery": {
            "d1-001": {
              "questionId": "d1-001", "timesSeen": 3, "timesCorrect": 2,
              "lastSeen": 1714560000000, "nextDue": 1714732800000,
              "easeFactor": 2.6, "status": "learning"
            },
            "d1-002": {
              "questionId": "d1-002", "timesSeen": 0, "timesCorrect": 0,
              "lastSeen": 0, "nextDue": 0, "easeFactor": 2.5, "status": "new"
            }
          },
          "history": [
            {
              "id": "run-1", "mode": "adventure", "domains": [1], "totalQuestions": 10,
              "correct": 8, "wrong": 2, "xpEarned": 160, "coinsEarned": 24,
              "timestamp": 1714560000000, "lootDrops": ["Rare Firewall Rune"], "duration": 300000
            },
            {
              "id": "run-2", "mode": "timed", "domains": [1, 2], "totalQuestions": 20,
              "correct": 15, "wrong": 5, "xpEarned": 300, "coinsEarned": 40,
              "timestamp": 1714563600000, "lootDrops": [], "duration": 600000
            }
          ],
          "settings": {"soundEnabled": false, "reducedMotion": true, "forgeSize": 10}
        }"#;
        let mut store = MemoryStore::new();
        import_save(&mut store, &SaveFile::parse(text)?)?;

        let profile = load_profile(&store);
        assert_eq!(profile.level, 7);
        assert_eq!(profile.coins, 300);
        assert_eq!(profile.last_active_date, None);
        assert_eq!(profile.bosses_defeated.len(), 2);

        let mastery = load_mastery(&store);
        let seen = &mastery["d1-001"];
        assert_eq!(seen.last_seen, Some(Timestamp::from_epoch_millis(1714560000000)?));
        assert_eq!(seen.next_due, Some(Timestamp::from_epoch_millis(1714732800000)?));
        let fresh = &mastery["d1-002"];
        assert_eq!(fresh.last_seen, None);
        assert_eq!(fresh.next_due, None);

        let history = load_history(&store);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, "run-1");
        assert_eq!(history[0].timestamp, Timestamp::from_epoch_millis(1714560000000)?);
        assert!(!load_settings(&store).sound_enabled);
        Ok(())
    }

    #[test]
    fn test_unreadable_history_entries_are_skipped() -> Fallible<()> {
        let mut store = MemoryStore::new();
        let good = serde_json::to_value(result(1)?)?;
        store.set(HISTORY_KEY, &format!(r#"[{good}, {{"id": "broken"}}]"#))?;
        let history = load_history(&store);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, "run-1");
        Ok(())
    }

    #[test]
    fn test_import_rejects_malformed() {
        assert!(SaveFile::parse("[1, 2, 3]").is_err());
        assert!(SaveFile::parse(r#"{"history": 5}"#).is_err());
    }

    #[test]
    fn test_reset_keeps_settings() -> Fallible<()> {
        let mut store = MemoryStore::new();
        let settings = GameSettings {
            sound_enabled: false,
            ..GameSettings::default()
        };
        save_settings(&mut store, &settings)?;
        save_profile(&mut store, &PlayerProfile::named("Eve"))?;
        reset_progress(&mut store)?;
        assert_eq!(load_profile(&store), PlayerProfile::default());
        assert_eq!(load_settings(&store), settings);
        Ok(())
    }
}
