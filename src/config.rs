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

//! The optional `secquest.toml` file in a collection directory.

use std::path::Path;

use serde::Deserialize;
use secquest_core::error::ErrorReport;
use secquest_core::error::Fallible;

pub const CONFIG_FILE: &str = "secquest.toml";

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory, relative to the collection, holding question pack JSON files.
    pub packs: String,
    /// SQLite database file, relative to the collection.
    pub database: String,
    /// Name shown on the player's profile.
    pub player_name: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            packs: "packs".to_string(),
            database: "secquest.db".to_string(),
            player_name: None,
        }
    }
}

impl Config {
    pub fn parse(text: &str) -> Fallible<Self> {
        toml::from_str(text).map_err(|e| ErrorReport::new(format!("invalid {CONFIG_FILE}: {e}")))
    }

    /// Read the config from a collection directory. A missing file means
    /// defaults.
    pub fn load(directory: &Path) -> Fallible<Self> {
        let path = directory.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path)?;
        Self::parse(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() -> Fallible<()> {
        assert_eq!(Config::parse("")?, Config::default());
        Ok(())
    }

    #[test]
    fn test_partial_config() -> Fallible<()> {
        let config = Config::parse("packs = \"content\"\nplayer_name = \"Alice\"\n")?;
        assert_eq!(config.packs, "content");
        assert_eq!(config.database, "secquest.db");
        assert_eq!(config.player_name.as_deref(), Some("Alice"));
        Ok(())
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = Config::parse("forge_size = 3\n").unwrap_err();
        assert!(err.to_string().contains(CONFIG_FILE));
    }
}
