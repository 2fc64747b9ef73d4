use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use crate::{StorageBackend, StorageError, StorageResult};

/// Flat key/value store: one row per field, no record identity.
///
/// The backing table holds JSON-encoded values so lists and booleans
/// round-trip without a separate type column.
pub struct FlatStore {
    conn: Connection,
}

impl FlatStore {
    /// Opens (or creates) a flat store at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Opens an in-memory flat store (for testing).
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StorageResult<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS config_values (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }
}

impl StorageBackend for FlatStore {
    fn get(&self, key: &str) -> StorageResult<Option<Value>> {
        let encoded: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM config_values WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        match encoded {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    fn get_all(&self) -> StorageResult<BTreeMap<String, Value>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, value FROM config_values")?;
        let rows = stmt.query_map([], |row| {
            let key: String = row.get(0)?;
            let value: String = row.get(1)?;
            Ok((key, value))
        })?;

        let mut result = BTreeMap::new();
        for row in rows {
            let (key, encoded) = row.map_err(StorageError::Database)?;
            result.insert(key, serde_json::from_str(&encoded)?);
        }
        Ok(result)
    }

    fn persist(&mut self, key: &str, value: &Value) -> StorageResult<()> {
        let encoded = serde_json::to_string(value)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO config_values (key, value) VALUES (?1, ?2)",
            params![key, encoded],
        )?;
        Ok(())
    }
}
