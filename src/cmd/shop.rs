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

use secquest_core::cosmetics::ALL_COSMETICS;
use secquest_core::cosmetics::is_equipped;
use secquest_core::error::Fallible;

use crate::collection::Collection;

pub fn list_cosmetics(directory: Option<String>) -> Fallible<()> {
    let game = Collection::new(directory)?.open_game()?;
    let profile = game.profile();
    println!("{} coins available", profile.coins);
    for cosmetic in &ALL_COSMETICS {
        let status = if is_equipped(profile, cosmetic.id) {
            "equipped".to_string()
        } else if profile.owns_cosmetic(cosmetic.id) {
            "owned".to_string()
        } else if cosmetic.is_purchasable() {
            format!("{} coins", cosmetic.cost)
        } else {
            "achievement".to_string()
        };
        println!(
            "{} {:<16} {:<6} {:<14} {}",
            cosmetic.icon,
            cosmetic.id,
            cosmetic.slot.as_str(),
            status,
            cosmetic.description
        );
    }
    Ok(())
}

pub fn buy(id: String, directory: Option<String>) -> Fallible<()> {
    let mut game = Collection::new(directory)?.open_game()?;
    game.buy_cosmetic(&id)?;
    println!("Bought {id}. {} coins left.", game.profile().coins);
    Ok(())
}

pub fn equip(id: String, directory: Option<String>) -> Fallible<()> {
    let mut game = Collection::new(directory)?.open_game()?;
    game.equip_cosmetic(&id)?;
    println!("Equipped {id}.");
    Ok(())
}
