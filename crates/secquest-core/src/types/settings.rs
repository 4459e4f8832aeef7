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

use serde::Deserialize;
use serde::Serialize;

/// User-tunable game settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameSettings {
    pub sound_enabled: bool,
    pub reduced_motion: bool,
    /// How many due questions a forge run draws.
    pub forge_size: usize,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            reduced_motion: false,
            forge_size: 10,
        }
    }
}

/// A partial settings update; absent fields are left unchanged.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub sound_enabled: Option<bool>,
    pub reduced_motion: Option<bool>,
    pub forge_size: Option<usize>,
}

impl GameSettings {
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(sound_enabled) = patch.sound_enabled {
            self.sound_enabled = sound_enabled;
        }
        if let Some(reduced_motion) = patch.reduced_motion {
            self.reduced_motion = reduced_motion;
        }
        if let Some(forge_size) = patch.forge_size {
            self.forge_size = forge_size;
        }
    }
}
