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
use secquest_core::scheduler::get_or_create;
use secquest_core::types::timestamp::Timestamp;

use crate::collection::Collection;

/// List the questions a forge run would draw now.
pub fn list_due(directory: Option<String>) -> Fallible<()> {
    let game = Collection::new(directory)?.open_game()?;
    let due = game.due_cards(Timestamp::now());
    if due.is_empty() {
        println!("No cards due for review.");
        return Ok(());
    }
    for question in due {
        let state = get_or_create(&question.id, game.mastery());
        let next_due = state
            .next_due
            .map(|t| t.to_string())
            .unwrap_or_else(|| "now".to_string());
        println!(
            "{}\tdomain {}\t{}\t{}/{} correct\tdue {next_due}",
            question.id,
            question.domain,
            state.status.as_str(),
            state.times_correct,
            state.times_seen,
        );
    }
    Ok(())
}
