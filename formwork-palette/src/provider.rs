use serde_json::Value;

/// Source of current selector-field values.
///
/// Abstracts over "value currently stored" versus "value just posted but
/// not yet saved" — the engine crate supplies a session-backed
/// implementation; tests use closures or maps.
pub trait SelectorValueProvider {
    /// Current value of `field`, or `None` when unset. `record_suffix` is
    /// appended to the lookup key when several records are edited at once
    /// (`name_<suffix>`).
    fn get(&self, field: &str, record_suffix: Option<&str>) -> Option<Value>;
}

impl<F> SelectorValueProvider for F
where
    F: Fn(&str, Option<&str>) -> Option<Value>,
{
    fn get(&self, field: &str, record_suffix: Option<&str>) -> Option<Value> {
        self(field, record_suffix)
    }
}

/// Per-request context for palette resolution.
#[derive(Debug, Clone, Default)]
pub struct ResolveContext {
    /// Record suffix for multi-record editing; selector lookups become
    /// `name_<suffix>`.
    pub record_suffix: Option<String>,
}

impl ResolveContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn for_record(suffix: impl Into<String>) -> Self {
        Self {
            record_suffix: Some(suffix.into()),
        }
    }
}
