use serde_json::Value;
use std::collections::BTreeMap;

use formwork_model::{FieldSpec, HookContext};
use formwork_storage::{StorageBackend, StorageResult};

use crate::coerce::load_value;

/// Which storage shape the session edits. Chosen once at session creation
/// — the save/load paths never branch on a runtime flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageMode {
    /// Key/value pairs without record identity (site configuration).
    Flat,
    /// All values serialized into one blob column of the given record.
    Row { record_id: String },
}

impl StorageMode {
    #[must_use]
    pub fn record_id(&self) -> Option<&str> {
        match self {
            Self::Flat => None,
            Self::Row { record_id } => Some(record_id),
        }
    }
}

/// Per-request editing state: the table under edit, the value snapshot
/// read at request start, and the posted values awaiting save.
///
/// Created per request and discarded after the response. The snapshot is
/// read once; [`SavePipeline`](crate::SavePipeline) keeps it current as
/// writes land so later fields in the same submission compare against
/// fresh values.
#[derive(Debug, Clone)]
pub struct EditSession {
    table: String,
    mode: StorageMode,
    values: BTreeMap<String, Value>,
    posted: BTreeMap<String, Value>,
    submitted_table: Option<String>,
}

impl EditSession {
    /// Creates a session with an explicit snapshot.
    #[must_use]
    pub fn new(table: impl Into<String>, mode: StorageMode) -> Self {
        Self {
            table: table.into(),
            mode,
            values: BTreeMap::new(),
            posted: BTreeMap::new(),
            submitted_table: None,
        }
    }

    /// Creates a session and snapshots current values from the backend.
    pub fn load(
        table: impl Into<String>,
        mode: StorageMode,
        backend: &dyn StorageBackend,
    ) -> StorageResult<Self> {
        let mut session = Self::new(table, mode);
        session.values = backend.get_all()?;
        Ok(session)
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    #[must_use]
    pub fn mode(&self) -> &StorageMode {
        &self.mode
    }

    /// Marks which table the incoming request submitted a form for.
    pub fn mark_submitted(&mut self, table: impl Into<String>) {
        self.submitted_table = Some(table.into());
    }

    /// True when the request is a submission for this session's table.
    #[must_use]
    pub fn is_submission(&self) -> bool {
        self.submitted_table.as_deref() == Some(self.table.as_str())
    }

    /// Current stored-form value of a field from the snapshot.
    #[must_use]
    pub fn current(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// A field's value in edit form: the snapshot value (falling back to
    /// the declared default) run through the load coercion and the
    /// field's load hooks. This is what the renderer receives.
    #[must_use]
    pub fn edit_value(&self, spec: &FieldSpec) -> Value {
        let ctx = HookContext {
            table: self.table.clone(),
            field: spec.name.clone(),
            record_id: self.mode.record_id().map(str::to_string),
        };
        let stored = self
            .current(&spec.name)
            .cloned()
            .or_else(|| spec.default.clone())
            .unwrap_or(Value::Null);
        load_value(spec, stored, &ctx)
    }

    /// Replaces the posted value set.
    pub fn set_posted(&mut self, posted: BTreeMap<String, Value>) {
        self.posted = posted;
    }

    /// One posted value by its raw input key.
    #[must_use]
    pub fn posted(&self, key: &str) -> Option<&Value> {
        self.posted.get(key)
    }

    /// Updates the snapshot after a successful write.
    pub(crate) fn set_current(&mut self, field: &str, value: Value) {
        self.values.insert(field.to_string(), value);
    }

    /// Seeds the snapshot directly (tests, prefilled sessions).
    pub fn set_value(&mut self, field: impl Into<String>, value: Value) {
        self.values.insert(field.into(), value);
    }
}
