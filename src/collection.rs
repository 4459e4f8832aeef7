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

use std::path::PathBuf;

use secquest_core::bank::QuestionBank;
use secquest_core::error::Fallible;
use secquest_core::error::fail;
use secquest_core::game::Game;
use secquest_core::types::date::Date;
use walkdir::WalkDir;

use crate::config::Config;
use crate::db::Database;
use crate::utils::clock_seed;

/// A collection directory: question packs, an optional config file, and the
/// database holding the player's progress.
pub struct Collection {
    pub directory: PathBuf,
    pub config: Config,
    pub db: Database,
}

impl Collection {
    pub fn new(directory: Option<String>) -> Fallible<Self> {
        let directory: PathBuf = match directory {
            Some(dir) => PathBuf::from(dir),
            None => std::env::current_dir()?,
        };
        if !directory.exists() {
            return fail("directory does not exist.");
        }
        let directory = directory.canonicalize()?;
        let config = Config::load(&directory)?;
        let db = Database::open(&directory.join(&config.database))?;
        Ok(Self {
            directory,
            config,
            db,
        })
    }

    pub fn packs_directory(&self) -> PathBuf {
        self.directory.join(&self.config.packs)
    }

    /// Read every `*.json` file under the packs directory, as
    /// (relative path, contents) pairs sorted by path.
    pub fn pack_files(&self) -> Fallible<Vec<(String, String)>> {
        let root = self.packs_directory();
        if !root.exists() {
            log::warn!("Pack directory {} does not exist", root.display());
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        for entry in WalkDir::new(&root).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                let name = path
                    .strip_prefix(&root)
                    .unwrap_or(path)
                    .display()
                    .to_string();
                match std::fs::read_to_string(path) {
                    Ok(text) => files.push((name, text)),
                    Err(e) => log::warn!("Failed to read {name}: {e}"),
                }
            }
        }
        Ok(files)
    }

    pub fn bank(&self) -> Fallible<QuestionBank> {
        let files = self.pack_files()?;
        Ok(QuestionBank::load(
            files
                .iter()
                .map(|(name, text)| (name.as_str(), text.as_str())),
        ))
    }

    /// Open the game without counting it as a day of activity.
    pub fn open_game(self) -> Fallible<Game<Database>> {
        let bank = self.bank()?;
        let mut game = Game::open(self.db, bank, clock_seed());
        if let Some(name) = &self.config.player_name {
            if game.profile().name != *name {
                game.rename_player(name)?;
            }
        }
        Ok(game)
    }

    /// Open the game to play today.
    pub fn play_game(self, today: Date) -> Fallible<Game<Database>> {
        let mut game = self.open_game()?;
        game.check_in(today)?;
        Ok(game)
    }
}

#[cfg(test)]
pub mod tests {
    use std::fs::create_dir_all;
    use std::fs::write;

    use tempfile::TempDir;
    use tempfile::tempdir;

    use super::*;

    pub const SAMPLE_PACK: &str = r#"{
        "packId": "test",
        "title": "Test Pack",
        "version": "1.0.0",
        "questions": [
            {
                "id": "ports-ssh",
                "domain": 3,
                "objectives": ["3.2"],
                "difficulty": "easy",
                "type": "mcq",
                "prompt": "Which port does SSH use by default?",
                "choices": ["21", "22", "23", "443"],
                "answerIndex": 1,
                "explanation": "SSH listens on TCP 22."
            }
        ]
    }"#;

    /// A temporary collection with one pack holding a single question.
    pub fn sample_collection() -> Fallible<TempDir> {
        let dir = tempdir()?;
        create_dir_all(dir.path().join("packs"))?;
        write(dir.path().join("packs").join("test.json"), SAMPLE_PACK)?;
        Ok(dir)
    }

    #[test]
    fn test_missing_directory() {
        let err = Collection::new(Some("./derpherp".to_string())).err().unwrap();
        assert_eq!(err.to_string(), "error: directory does not exist.");
    }

    #[test]
    fn test_loads_packs() -> Fallible<()> {
        let dir = sample_collection()?;
        write(dir.path().join("packs").join("notes.txt"), "ignored")?;
        write(dir.path().join("packs").join("broken.json"), "{")?;
        let collection = Collection::new(Some(dir.path().display().to_string()))?;
        assert_eq!(collection.pack_files()?.len(), 2);
        let bank = collection.bank()?;
        assert_eq!(bank.len(), 1);
        assert!(bank.get("ports-ssh").is_some());
        Ok(())
    }

    #[test]
    fn test_config_overrides() -> Fallible<()> {
        let dir = tempdir()?;
        create_dir_all(dir.path().join("content"))?;
        write(dir.path().join("content").join("a.json"), SAMPLE_PACK)?;
        write(
            dir.path().join("secquest.toml"),
            "packs = \"content\"\ndatabase = \"progress.db\"\nplayer_name = \"Bob\"\n",
        )?;
        let collection = Collection::new(Some(dir.path().display().to_string()))?;
        let game = collection.open_game()?;
        assert_eq!(game.bank().len(), 1);
        assert_eq!(game.profile().name, "Bob");
        assert!(dir.path().join("progress.db").exists());
        Ok(())
    }
}
