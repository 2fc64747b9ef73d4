//! Edit sessions, value coercion, and the save pipeline for Formwork.
//!
//! This crate ties the schema model, palette resolution, and storage
//! backends together into the per-request edit cycle:
//!
//! 1. [`EditSession::load`] snapshots the current values from a backend.
//! 2. [`SessionValueProvider`] feeds selector values (stored or freshly
//!    posted) to the palette resolver.
//! 3. On submission, [`SavePipeline::save`] coerces each posted value to
//!    its stored form, detects changes, writes through the backend, and
//!    emits an [`AuditEntry`].
//!
//! Everything is synchronous and request-scoped; the session is discarded
//! after the response.

mod audit;
mod coerce;
mod pipeline;
mod provider;
mod session;

pub use audit::{AuditEntry, AuditSink, TracingAuditSink};
pub use coerce::{
    canonical, load_transform, load_value, save_transform, save_value, CoercionError,
    CoercionResult,
};
pub use pipeline::{prefill_defaults, SaveOutcome, SavePipeline};
pub use provider::SessionValueProvider;
pub use session::{EditSession, StorageMode};

/// Result type alias for save operations.
pub type SaveResult<T> = std::result::Result<T, SaveError>;

/// Errors surfaced by the save pipeline. Coercion failures never appear
/// here — they are recovered locally by treating the field as unset.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// Backend read/write failure; no implicit retry.
    #[error("storage error: {0}")]
    Storage(#[from] formwork_storage::StorageError),
}
