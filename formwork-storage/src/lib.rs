//! Storage backends for Formwork.
//!
//! The save pipeline writes through the [`StorageBackend`] trait and never
//! sees SQL. Two interchangeable variants are provided:
//!
//! - [`FlatStore`] — one key/value row per field, no record identity
//!   (site-wide configuration)
//! - [`RowStore`] — every field of one record serialized into a single
//!   JSON blob column, read and written atomically
//!
//! Transactional guarantees live here, not in the pipeline: the row
//! variant wraps its read-modify-write of the blob in a transaction.

mod error;
mod flat;
mod row;

pub use error::{StorageError, StorageResult};
pub use flat::FlatStore;
pub use row::RowStore;

use serde_json::Value;
use std::collections::BTreeMap;

/// The persistence abstraction the save pipeline writes through.
///
/// Implementations own atomicity and locking; the core performs one
/// logical read and at most one logical write per save invocation.
pub trait StorageBackend {
    /// Current value of one field, or `None` when unset.
    fn get(&self, key: &str) -> StorageResult<Option<Value>>;

    /// Snapshot of every stored field value.
    fn get_all(&self) -> StorageResult<BTreeMap<String, Value>>;

    /// Persists one field value.
    fn persist(&mut self, key: &str, value: &Value) -> StorageResult<()>;
}

/// Rejects table/column names that cannot be safely interpolated into SQL.
///
/// Identifiers come from schema configuration, not user input, but the
/// check keeps a malformed fragment from reaching the database layer.
fn check_identifier(ident: &str) -> StorageResult<()> {
    let valid = !ident.is_empty()
        && ident
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidIdentifier(ident.to_string()))
    }
}
