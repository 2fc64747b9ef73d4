//! Per-field value coercion between stored form and edit form.
//!
//! The stored form is what a [`StorageBackend`](formwork_storage::StorageBackend)
//! holds: scalars, JSON-encoded strings for lists, compact 32-char hex for
//! fileTree identifiers, integer timestamps for dates. The edit form is
//! what widgets and hooks see: booleans, arrays, hyphenated UUID strings,
//! display-formatted dates.
//!
//! Coercion failures are recovered locally — the field is treated as
//! unset and the cycle proceeds. A malformed payload never aborts a save.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use formwork_model::value::is_truthy;
use formwork_model::{FieldSpec, HookContext, InputType};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

pub use formwork_model::value::canonical;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Result type for the fallible coercion primitives.
pub type CoercionResult<T> = Result<T, CoercionError>;

/// A value that could not be coerced. Always recovered by the callers in
/// this crate: the field becomes unset, the save continues.
#[derive(Debug, thiserror::Error)]
pub enum CoercionError {
    /// A serialized list payload that does not parse.
    #[error("malformed serialized payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    /// A fileTree identifier that is not a UUID in any accepted form.
    #[error("malformed identifier: {0}")]
    MalformedIdentifier(#[from] uuid::Error),

    /// A date/time display string that does not match the field's format.
    #[error("cannot parse '{value}' as '{format}'")]
    MalformedDate { value: String, format: String },
}

/// Stored form → edit form, then the field's load hooks in order.
#[must_use]
pub fn load_value(spec: &FieldSpec, stored: Value, ctx: &HookContext) -> Value {
    let value = match load_transform(spec, stored) {
        Ok(value) => value,
        Err(err) => {
            warn!(field = %spec.name, %err, "load coercion failed, treating field as unset");
            Value::Null
        }
    };
    spec.bound_load_hooks.apply(value, ctx)
}

/// Edit form → stored form, then the field's save hooks in order.
#[must_use]
pub fn save_value(spec: &FieldSpec, posted: Value, ctx: &HookContext) -> Value {
    let value = match save_transform(spec, posted) {
        Ok(value) => value,
        Err(err) => {
            warn!(field = %spec.name, %err, "save coercion failed, treating field as unset");
            Value::Null
        }
    };
    spec.bound_save_hooks.apply(value, ctx)
}

/// The load direction of the type table, without hooks.
pub fn load_transform(spec: &FieldSpec, stored: Value) -> CoercionResult<Value> {
    match spec.input_type {
        InputType::Checkbox if !spec.eval.multiple => Ok(Value::Bool(is_truthy(&stored))),
        InputType::Checkbox | InputType::Text | InputType::Textarea if spec.eval.multiple => {
            decode_list(stored)
        }
        InputType::FileTree => filetree_load(stored),
        _ => Ok(stored),
    }
}

/// The save direction of the type table, without hooks. Order matters and
/// mirrors the pipeline contract: checkbox booleans first, then fileTree,
/// then date parsing, then list serialization.
pub fn save_transform(spec: &FieldSpec, posted: Value) -> CoercionResult<Value> {
    let mut value = if spec.input_type == InputType::Checkbox && !spec.eval.multiple {
        Value::Bool(is_truthy(&posted))
    } else {
        posted
    };

    if is_truthy(&value) {
        if spec.input_type == InputType::FileTree {
            value = filetree_save(value)?;
        }
        if spec.input_type.is_temporal() {
            value = date_save(spec, value)?;
        }
    }

    // Lists serialize even when empty, so an emptied multi-select still
    // overwrites its stored value.
    if spec.eval.multiple
        && matches!(
            spec.input_type,
            InputType::Checkbox | InputType::Text | InputType::Textarea
        )
    {
        value = encode_list(value)?;
    }

    Ok(value)
}

/// Deserializes a JSON-encoded list. Arrays pass through untouched so
/// widgets that already produce lists keep working.
fn decode_list(stored: Value) -> CoercionResult<Value> {
    match stored {
        Value::String(text) if !text.is_empty() => Ok(serde_json::from_str(&text)?),
        other => Ok(other),
    }
}

/// Serializes a list to its JSON-encoded stored form. Strings are assumed
/// to be serialized already.
fn encode_list(value: Value) -> CoercionResult<Value> {
    match value {
        Value::Array(_) => Ok(Value::String(serde_json::to_string(&value)?)),
        other => Ok(other),
    }
}

/// Compact hex identifier(s) → hyphenated display form.
fn filetree_load(stored: Value) -> CoercionResult<Value> {
    match stored {
        Value::String(text) if !text.is_empty() => {
            // A serialized list parses as JSON; a bare identifier does not.
            match serde_json::from_str::<Value>(&text) {
                Ok(Value::Array(items)) => {
                    let display = items
                        .iter()
                        .map(|item| match item {
                            Value::String(id) => hyphenated(id).map(Value::String),
                            other => Ok(other.clone()),
                        })
                        .collect::<CoercionResult<Vec<_>>>()?;
                    Ok(Value::Array(display))
                }
                _ => Ok(Value::String(hyphenated(&text)?)),
            }
        }
        Value::Array(items) => {
            let display = items
                .iter()
                .map(|item| match item {
                    Value::String(id) => hyphenated(id).map(Value::String),
                    other => Ok(other.clone()),
                })
                .collect::<CoercionResult<Vec<_>>>()?;
            Ok(Value::Array(display))
        }
        other => Ok(other),
    }
}

/// Hyphenated display identifier(s) → compact hex stored form. Lists are
/// re-serialized.
fn filetree_save(value: Value) -> CoercionResult<Value> {
    match value {
        Value::String(text) => match serde_json::from_str::<Value>(&text) {
            Ok(Value::Array(items)) => encode_compact(items),
            _ => Ok(Value::String(compact(&text)?)),
        },
        Value::Array(items) => encode_compact(items),
        other => Ok(other),
    }
}

fn encode_compact(items: Vec<Value>) -> CoercionResult<Value> {
    let stored = items
        .iter()
        .map(|item| match item {
            Value::String(id) => compact(id).map(Value::String),
            other => Ok(other.clone()),
        })
        .collect::<CoercionResult<Vec<_>>>()?;
    Ok(Value::String(serde_json::to_string(&Value::Array(stored))?))
}

fn hyphenated(id: &str) -> CoercionResult<String> {
    Ok(Uuid::parse_str(id.trim())?.hyphenated().to_string())
}

fn compact(id: &str) -> CoercionResult<String> {
    Ok(Uuid::parse_str(id.trim())?.simple().to_string())
}

/// Parses a date/time display string per the field's configured format
/// into an integer timestamp. Values that are already numbers (stored
/// timestamps) pass through.
fn date_save(spec: &FieldSpec, value: Value) -> CoercionResult<Value> {
    let text = match value {
        Value::String(text) => text,
        other => return Ok(other),
    };

    let (default_format, parse): (&str, fn(&str, &str) -> Option<i64>) = match spec.input_type {
        InputType::Date => (DATE_FORMAT, parse_date),
        InputType::Time => (TIME_FORMAT, parse_time),
        _ => (DATETIME_FORMAT, parse_datetime),
    };
    let format = spec.eval.format.as_deref().unwrap_or(default_format);

    match parse(&text, format) {
        Some(timestamp) => Ok(Value::Number(timestamp.into())),
        None => Err(CoercionError::MalformedDate {
            value: text,
            format: format.to_string(),
        }),
    }
}

fn parse_date(text: &str, format: &str) -> Option<i64> {
    let date = NaiveDate::parse_from_str(text, format).ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp())
}

fn parse_time(text: &str, format: &str) -> Option<i64> {
    let time = NaiveTime::parse_from_str(text, format).ok()?;
    Some(i64::from(time.num_seconds_from_midnight()))
}

fn parse_datetime(text: &str, format: &str) -> Option<i64> {
    let datetime = NaiveDateTime::parse_from_str(text, format).ok()?;
    Some(datetime.and_utc().timestamp())
}
