use formwork_model::value::canonical;
use formwork_model::{HookContext, Schema};
use formwork_storage::{StorageBackend, StorageResult};
use serde_json::Value;
use tracing::{debug, warn};

use crate::audit::{AuditEntry, AuditSink};
use crate::coerce::save_value;
use crate::session::EditSession;
use crate::SaveResult;

/// What a save invocation did. Everything except `Written` leaves the
/// backend untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The request is not a submission for this session's table.
    NotSubmitted,
    /// The field is not declared by the schema.
    UnknownField,
    /// The posted value is empty and the field declares `do_not_save_empty`.
    SkippedEmpty,
    /// The coerced value equals the current stored value.
    Unchanged,
    /// The value was persisted and an audit entry emitted.
    Written,
}

/// Orchestrates one field's save: coercion, change detection, persistence,
/// audit emission.
pub struct SavePipeline<'a> {
    schema: &'a Schema,
}

impl<'a> SavePipeline<'a> {
    #[must_use]
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    /// Saves one posted value.
    ///
    /// Coercion runs in stored-form order (checkbox booleans, fileTree,
    /// date parsing, bound save hooks); the result is compared canonically
    /// against the session snapshot. Unchanged values and empty values on
    /// `do_not_save_empty` fields are dropped without touching the
    /// backend — the latter even when the stored value is non-empty.
    /// Storage failures surface; coercion failures never do.
    pub fn save(
        &self,
        field: &str,
        posted: Value,
        session: &mut EditSession,
        backend: &mut dyn StorageBackend,
        audit: &mut dyn AuditSink,
    ) -> SaveResult<SaveOutcome> {
        if !session.is_submission() {
            return Ok(SaveOutcome::NotSubmitted);
        }

        let Some(spec) = self.schema.field(field) else {
            warn!(field = %field, "ignoring save for undeclared field");
            return Ok(SaveOutcome::UnknownField);
        };

        let ctx = HookContext {
            table: session.table().to_string(),
            field: field.to_string(),
            record_id: session.mode().record_id().map(str::to_string),
        };
        let value = save_value(spec, posted, &ctx);

        let new = canonical(&value);
        if new.is_empty() && spec.eval.do_not_save_empty {
            debug!(field = %field, "dropping empty value per doNotSaveEmpty");
            return Ok(SaveOutcome::SkippedEmpty);
        }

        let prior = session.current(field).map(canonical).unwrap_or_default();
        if new == prior {
            return Ok(SaveOutcome::Unchanged);
        }

        backend.persist(field, &value)?;
        session.set_current(field, value);

        let entry = if spec.input_type.is_sensitive() {
            AuditEntry::redacted(field)
        } else {
            AuditEntry::changed(field, prior, new)
        };
        audit.record(entry);

        Ok(SaveOutcome::Written)
    }
}

/// Seeds an empty store with every field's declared default (the empty
/// string when none is declared). Returns whether anything was written;
/// a store that already holds values is left alone.
pub fn prefill_defaults(schema: &Schema, backend: &mut dyn StorageBackend) -> StorageResult<bool> {
    if !backend.get_all()?.is_empty() {
        return Ok(false);
    }
    for field in schema.fields() {
        let default = field
            .default
            .clone()
            .unwrap_or_else(|| Value::String(String::new()));
        backend.persist(&field.name, &default)?;
    }
    debug!(fields = schema.field_count(), "prefilled store with defaults");
    Ok(true)
}
