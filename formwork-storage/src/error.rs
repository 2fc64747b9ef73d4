//! Error types for the storage layer.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur in storage operations. The core performs no
/// implicit retry; failures surface to the caller of the save pipeline.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Record not found in a row-backed store.
    #[error("record not found: {0}")]
    RecordNotFound(String),

    /// Table or column name unfit for SQL interpolation.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
}
