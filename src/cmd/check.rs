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

use secquest_core::bank::ContentIssue;
use secquest_core::bank::parse_pack;
use secquest_core::bank::validate_packs;
use secquest_core::error::Fallible;
use secquest_core::error::fail;

use crate::collection::Collection;

/// Every problem found in a collection's packs.
pub fn collection_issues(collection: &Collection) -> Fallible<(usize, Vec<ContentIssue>)> {
    let mut issues = Vec::new();
    let mut packs = Vec::new();
    for (name, text) in collection.pack_files()? {
        match parse_pack(&text) {
            Ok(pack) => packs.push(pack),
            Err(e) => issues.push(ContentIssue {
                question_id: name,
                message: format!("unreadable pack: {}", e.message()),
            }),
        }
    }
    let questions = packs.iter().map(|p| p.questions.len()).sum();
    issues.extend(validate_packs(&packs));
    Ok((questions, issues))
}

pub fn check_collection(directory: Option<String>) -> Fallible<()> {
    let collection = Collection::new(directory)?;
    let (questions, issues) = collection_issues(&collection)?;
    if issues.is_empty() {
        println!("ok: {questions} questions");
        return Ok(());
    }
    for issue in &issues {
        println!("{issue}");
    }
    fail(format!("found {} problem(s)", issues.len()))
}
