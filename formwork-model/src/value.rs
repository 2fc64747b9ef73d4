//! Scalar value semantics shared across the edit cycle.
//!
//! Field values travel as loosely typed JSON; these helpers pin down the
//! two judgements every consumer must agree on: what counts as "set"
//! (selector activation, checkbox coercion, empty-value save gating) and
//! the canonical string form used for change detection and audit entries.

use serde_json::Value;

/// Truthiness of a field value: unset, `false`, zero, the empty string and
/// `"0"` are falsy; everything else is truthy.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().unwrap_or(0.0) != 0.0,
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Canonical string form of a stored value, used for change detection and
/// audit entries. Booleans collapse to `"1"`/`""`, lists and maps to their
/// JSON encoding, so a value compares equal to its own serialized form.
#[must_use]
pub fn canonical(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}
