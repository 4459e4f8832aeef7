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

use secquest_core::error::Fallible;
use secquest_core::error::fail;
use secquest_core::types::settings::SettingsPatch;

use crate::collection::Collection;

/// Apply any given changes, then print the settings.
pub fn update_settings(directory: Option<String>, patch: SettingsPatch) -> Fallible<()> {
    if patch.forge_size == Some(0) {
        return fail("forge size must be at least 1.");
    }
    let mut game = Collection::new(directory)?.open_game()?;
    if patch != SettingsPatch::default() {
        game.update_settings(patch)?;
    }
    let settings = game.settings();
    println!("sound:          {}", settings.sound_enabled);
    println!("reduced motion: {}", settings.reduced_motion);
    println!("forge size:     {}", settings.forge_size);
    Ok(())
}

#[cfg(test)]
mod tests {
    use secquest_core::storage::load_settings;

    use super::*;
    use crate::collection::tests::sample_collection;

    #[test]
    fn test_update_forge_size() -> Fallible<()> {
        let dir = sample_collection()?;
        let directory = dir.path().display().to_string();
        let patch = SettingsPatch {
            forge_size: Some(25),
            ..SettingsPatch::default()
        };
        update_settings(Some(directory.clone()), patch)?;
        let collection = Collection::new(Some(directory.clone()))?;
        assert_eq!(load_settings(&collection.db).forge_size, 25);
        let zero = SettingsPatch {
            forge_size: Some(0),
            ..SettingsPatch::default()
        };
        assert!(update_settings(Some(directory), zero).is_err());
        Ok(())
    }
}
