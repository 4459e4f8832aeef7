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

//! Backing up, restoring and wiping progress.

use std::fs::read_to_string;
use std::fs::write;

use secquest_core::error::Fallible;
use secquest_core::error::fail;
use secquest_core::storage::SaveFile;

use crate::collection::Collection;

pub fn export_save(directory: Option<String>, output: Option<String>) -> Fallible<()> {
    let game = Collection::new(directory)?.open_game()?;
    let json = game.export_save().to_json()?;
    match output {
        Some(path) => {
            write(&path, json)?;
            log::info!("Exported save to {path}");
        }
        None => println!("{json}"),
    }
    Ok(())
}

pub fn import_save(file: String, directory: Option<String>) -> Fallible<()> {
    let text = read_to_string(&file)?;
    let save = SaveFile::parse(&text)?;
    let mut game = Collection::new(directory)?.open_game()?;
    game.import_save(&save)?;
    println!("Imported {file}.");
    Ok(())
}

pub fn reset(directory: Option<String>, yes: bool) -> Fallible<()> {
    if !yes {
        return fail("this erases all progress; pass --yes to confirm.");
    }
    let mut game = Collection::new(directory)?.open_game()?;
    game.reset_progress()?;
    println!("Progress reset.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use secquest_core::storage::load_settings;

    use super::*;
    use crate::collection::tests::sample_collection;

    #[test]
    fn test_export_then_import_into_other_collection() -> Fallible<()> {
        let source = sample_collection()?;
        let target = sample_collection()?;
        let source_dir = source.path().display().to_string();
        let target_dir = target.path().display().to_string();
        {
            let mut game = Collection::new(Some(source_dir.clone()))?.open_game()?;
            game.rename_player("Carol")?;
        }
        let file = source.path().join("backup.json").display().to_string();
        export_save(Some(source_dir), Some(file.clone()))?;
        import_save(file, Some(target_dir.clone()))?;
        let game = Collection::new(Some(target_dir))?.open_game()?;
        assert_eq!(game.profile().name, "Carol");
        Ok(())
    }

    #[test]
    fn test_import_malformed_fails() -> Fallible<()> {
        let dir = sample_collection()?;
        let file = dir.path().join("bad.json");
        write(&file, "{\"profile\": 3}")?;
        let result = import_save(file.display().to_string(), Some(dir.path().display().to_string()));
        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn test_reset_requires_confirmation() -> Fallible<()> {
        let dir = sample_collection()?;
        let directory = dir.path().display().to_string();
        assert!(reset(Some(directory.clone()), false).is_err());
        reset(Some(directory.clone()), true)?;
        let collection = Collection::new(Some(directory))?;
        assert_eq!(load_settings(&collection.db).forge_size, 10);
        Ok(())
    }
}
