use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

/// One configuration change, emitted after every successful write.
///
/// Entries are forwarded, never stored by the core — delivery and
/// formatting belong to the receiving sink. Sensitive fields (password
/// and opaque-store kinds) carry no values, only the fact of the change.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub field: String,
    /// Canonical stored-form value before the write; `None` when redacted.
    pub prior: Option<String>,
    /// Canonical stored-form value after the write; `None` when redacted.
    pub new: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub sensitive: bool,
}

impl AuditEntry {
    #[must_use]
    pub fn changed(field: impl Into<String>, prior: String, new: String) -> Self {
        Self {
            field: field.into(),
            prior: Some(prior),
            new: Some(new),
            timestamp: Utc::now(),
            sensitive: false,
        }
    }

    /// Entry for a sensitive field: the change is recorded, the values
    /// are not.
    #[must_use]
    pub fn redacted(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            prior: None,
            new: None,
            timestamp: Utc::now(),
            sensitive: true,
        }
    }
}

/// Receiver of audit entries.
pub trait AuditSink {
    fn record(&mut self, entry: AuditEntry);
}

/// Default sink: forwards entries to the `tracing` configuration logger.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&mut self, entry: AuditEntry) {
        if entry.sensitive {
            info!(field = %entry.field, "configuration value changed");
        } else {
            info!(
                field = %entry.field,
                prior = entry.prior.as_deref().unwrap_or(""),
                new = entry.new.as_deref().unwrap_or(""),
                "configuration value changed"
            );
        }
    }
}
