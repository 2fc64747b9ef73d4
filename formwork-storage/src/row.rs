use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

use crate::{check_identifier, StorageBackend, StorageError, StorageResult};

/// Row-backed store: every field value of one record lives in a single
/// JSON blob column, keyed by the record id.
///
/// `get_all` and `persist` operate on the whole blob; `persist` performs
/// its read-modify-write inside a transaction so concurrent writers
/// serialize at the database, not in the core.
#[derive(Debug)]
pub struct RowStore {
    conn: Connection,
    table: String,
    column: String,
    record_id: String,
}

impl RowStore {
    /// Opens a row store over `table`.`column` for one record.
    pub fn open(
        path: &Path,
        table: &str,
        column: &str,
        record_id: impl Into<String>,
    ) -> StorageResult<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn, table, column, record_id)
    }

    /// Opens an in-memory row store (for testing).
    pub fn open_in_memory(
        table: &str,
        column: &str,
        record_id: impl Into<String>,
    ) -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn, table, column, record_id)
    }

    fn with_connection(
        conn: Connection,
        table: &str,
        column: &str,
        record_id: impl Into<String>,
    ) -> StorageResult<Self> {
        check_identifier(table)?;
        check_identifier(column)?;
        let store = Self {
            conn,
            table: table.to_string(),
            column: column.to_string(),
            record_id: record_id.into(),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StorageResult<()> {
        self.conn.execute_batch(&format!(
            "
            CREATE TABLE IF NOT EXISTS {table} (
                id TEXT PRIMARY KEY,
                {column} TEXT NOT NULL DEFAULT '{{}}'
            );
            ",
            table = self.table,
            column = self.column,
        ))?;
        Ok(())
    }

    /// Creates the record row when it does not exist yet.
    pub fn ensure_record(&mut self) -> StorageResult<()> {
        self.conn.execute(
            &format!(
                "INSERT OR IGNORE INTO {} (id, {}) VALUES (?1, '{{}}')",
                self.table, self.column
            ),
            params![self.record_id],
        )?;
        Ok(())
    }

    /// The record this store is bound to.
    #[must_use]
    pub fn record_id(&self) -> &str {
        &self.record_id
    }

    fn read_blob(conn: &Connection, table: &str, column: &str, id: &str) -> StorageResult<BTreeMap<String, Value>> {
        let blob: Option<String> = conn
            .query_row(
                &format!("SELECT {column} FROM {table} WHERE id = ?1"),
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(decode_blob(blob.as_deref()))
    }

    fn write_blob(
        conn: &Connection,
        table: &str,
        column: &str,
        id: &str,
        values: &BTreeMap<String, Value>,
    ) -> StorageResult<()> {
        let encoded = serde_json::to_string(values)?;
        let changed = conn.execute(
            &format!("UPDATE {table} SET {column} = ?1 WHERE id = ?2"),
            params![encoded, id],
        )?;
        if changed == 0 {
            return Err(StorageError::RecordNotFound(id.to_string()));
        }
        Ok(())
    }
}

/// Decodes the serialized blob, treating a missing or malformed payload as
/// an empty value set — a corrupt blob must not brick the edit surface.
fn decode_blob(blob: Option<&str>) -> BTreeMap<String, Value> {
    let Some(text) = blob else {
        return BTreeMap::new();
    };
    match serde_json::from_str(text) {
        Ok(Value::Object(map)) => map.into_iter().collect(),
        Ok(_) | Err(_) => {
            warn!("malformed value blob, treating as empty");
            BTreeMap::new()
        }
    }
}

impl StorageBackend for RowStore {
    fn get(&self, key: &str) -> StorageResult<Option<Value>> {
        let values = Self::read_blob(&self.conn, &self.table, &self.column, &self.record_id)?;
        Ok(values.get(key).cloned())
    }

    fn get_all(&self) -> StorageResult<BTreeMap<String, Value>> {
        Self::read_blob(&self.conn, &self.table, &self.column, &self.record_id)
    }

    fn persist(&mut self, key: &str, value: &Value) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        let mut values = {
            let blob: Option<String> = tx
                .query_row(
                    &format!("SELECT {} FROM {} WHERE id = ?1", self.column, self.table),
                    params![self.record_id],
                    |row| row.get(0),
                )
                .optional()?;
            decode_blob(blob.as_deref())
        };
        values.insert(key.to_string(), value.clone());
        Self::write_blob(&tx, &self.table, &self.column, &self.record_id, &values)?;
        tx.commit()?;
        Ok(())
    }
}
