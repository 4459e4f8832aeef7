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

//! SQLite storage for the persisted game state.

use std::path::Path;

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::params;
use secquest_core::error::ErrorReport;
use secquest_core::error::Fallible;
use secquest_core::storage::KeyValueStore;

const SCHEMA_SQL: &str = "
    create table if not exists kv (
        key text primary key,
        value text not null,
        updated_at text not null default (strftime('%Y-%m-%dT%H:%M:%f', 'now'))
    );
";

fn db_error(e: rusqlite::Error) -> ErrorReport {
    ErrorReport::new(format!("database error: {e}"))
}

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Fallible<Self> {
        log::debug!("Opening database at {}", path.display());
        let conn = Connection::open(path).map_err(db_error)?;
        Self::init(conn)
    }

    #[cfg(test)]
    pub fn in_memory() -> Fallible<Self> {
        let conn = Connection::open_in_memory().map_err(db_error)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Fallible<Self> {
        conn.execute_batch(SCHEMA_SQL).map_err(db_error)?;
        Ok(Self { conn })
    }

    /// All stored keys, sorted.
    #[cfg(test)]
    pub fn keys(&self) -> Fallible<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("select key from kv order by key")
            .map_err(db_error)?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(db_error)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(db_error)
    }
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> Fallible<Option<String>> {
        self.conn
            .query_row("select value from kv where key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(db_error)
    }

    fn set(&mut self, key: &str, value: &str) -> Fallible<()> {
        self.conn
            .execute(
                "insert into kv (key, value) values (?1, ?2)
                 on conflict (key) do update set
                    value = excluded.value,
                    updated_at = strftime('%Y-%m-%dT%H:%M:%f', 'now')",
                params![key, value],
            )
            .map_err(db_error)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Fallible<()> {
        self.conn
            .execute("delete from kv where key = ?1", params![key])
            .map_err(db_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use secquest_core::storage::PROFILE_KEY;
    use secquest_core::storage::load_profile;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_get_set_remove() -> Fallible<()> {
        let mut db = Database::in_memory()?;
        assert_eq!(db.get("k")?, None);
        db.set("k", "one")?;
        db.set("k", "two")?;
        assert_eq!(db.get("k")?, Some("two".to_string()));
        assert_eq!(db.keys()?, vec!["k".to_string()]);
        db.remove("k")?;
        assert_eq!(db.get("k")?, None);
        db.remove("k")?;
        Ok(())
    }

    #[test]
    fn test_persists_across_connections() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().join("secquest.db");
        {
            let mut db = Database::open(&path)?;
            db.set(PROFILE_KEY, r#"{"name": "Trudy", "coins": 9}"#)?;
        }
        let db = Database::open(&path)?;
        let profile = load_profile(&db);
        assert_eq!(profile.name, "Trudy");
        assert_eq!(profile.coins, 9);
        Ok(())
    }
}
