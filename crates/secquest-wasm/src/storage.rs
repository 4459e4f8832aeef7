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

//! Browser localStorage as the game's key-value store.

use secquest_core::error::ErrorReport;
use secquest_core::error::Fallible;
use secquest_core::storage::KeyValueStore;
use wasm_bindgen::JsValue;
use web_sys::Storage as WebStorage;

/// localStorage, or nothing at all when the browser doesn't provide it (for
/// example in some private browsing modes). Without it, reads find nothing and
/// writes are dropped.
pub struct LocalStorage {
    inner: Option<WebStorage>,
}

fn storage_error(op: &str, key: &str, e: JsValue) -> ErrorReport {
    ErrorReport::new(format!("localStorage {op} of '{key}' failed: {e:?}"))
}

impl LocalStorage {
    pub fn new() -> Self {
        let inner = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();
        if inner.is_none() {
            log::warn!("localStorage is unavailable; progress will not be saved");
        }
        Self { inner }
    }
}

impl Default for LocalStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Fallible<Option<String>> {
        match &self.inner {
            Some(storage) => storage
                .get_item(key)
                .map_err(|e| storage_error("read", key, e)),
            None => Ok(None),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Fallible<()> {
        match &self.inner {
            Some(storage) => storage
                .set_item(key, value)
                .map_err(|e| storage_error("write", key, e)),
            None => Ok(()),
        }
    }

    fn remove(&mut self, key: &str) -> Fallible<()> {
        match &self.inner {
            Some(storage) => storage
                .remove_item(key)
                .map_err(|e| storage_error("removal", key, e)),
            None => Ok(()),
        }
    }
}
