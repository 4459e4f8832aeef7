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

use maud::DOCTYPE;
use maud::Markup;
use maud::html;
use secquest_core::cosmetics::CosmeticSlot;
use secquest_core::game::Game;
use secquest_core::storage::KeyValueStore;

/// Page-wide presentation taken from the player's settings and cosmetics.
#[derive(Default)]
pub struct PageStyle {
    /// Equipped theme cosmetic, used as a CSS class on `body`.
    pub theme: Option<String>,
    pub reduced_motion: bool,
}

impl PageStyle {
    pub fn of<S: KeyValueStore>(game: &Game<S>) -> Self {
        Self {
            theme: game
                .profile()
                .equipped_cosmetics
                .get(CosmeticSlot::Theme.as_str())
                .cloned(),
            reduced_motion: game.settings().reduced_motion,
        }
    }

    fn body_class(&self) -> String {
        let mut classes = Vec::new();
        if let Some(theme) = &self.theme {
            classes.push(theme.as_str());
        }
        if self.reduced_motion {
            classes.push("reduced-motion");
        }
        classes.join(" ")
    }
}

pub fn page_template(body: Markup, style: &PageStyle) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { "secquest" }
                link rel="stylesheet" href="/style.css";
            }
            body class=(style.body_class()) {
                (body)
            }
        }
    }
}
