use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::hook::HookChain;

/// The widget/input kind of a field.
///
/// `Password` and `OpaqueText` are the sensitive kinds: the save pipeline
/// redacts their values from audit entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum InputType {
    #[default]
    Text,
    Textarea,
    Checkbox,
    FileTree,
    Date,
    Time,
    DateTime,
    Password,
    OpaqueText,
    Other,
}

impl InputType {
    /// True for kinds whose values never appear in audit entries.
    #[must_use]
    pub fn is_sensitive(&self) -> bool {
        matches!(self, Self::Password | Self::OpaqueText)
    }

    /// True for the date-like kinds whose save transform parses a display
    /// string into a timestamp.
    #[must_use]
    pub fn is_temporal(&self) -> bool {
        matches!(self, Self::Date | Self::Time | Self::DateTime)
    }
}

/// Evaluation flags controlling how a field behaves in the edit cycle.
///
/// The named flags are the ones the core interprets; anything else a
/// fragment declares lands in `extra` and survives merging, so renderers
/// and hooks can read their own switches without the core knowing them.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct EvalFlags {
    /// Field holds a list of values rather than a single one.
    pub multiple: bool,
    /// Changing this field re-submits the form; selector activation then
    /// reads the stored value, not the in-flight posted one.
    pub submit_on_change: bool,
    /// An empty posted value is dropped instead of overwriting the store.
    pub do_not_save_empty: bool,
    /// Display format for date/time parsing (chrono format string).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Uninterpreted flags, preserved through merging.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl EvalFlags {
    /// Merges flags from a later fragment into these. Booleans and scalars
    /// from the incoming side win; array-valued extras concatenate.
    pub(crate) fn merge_from(&mut self, incoming: &EvalFlags) {
        self.multiple |= incoming.multiple;
        self.submit_on_change |= incoming.submit_on_change;
        self.do_not_save_empty |= incoming.do_not_save_empty;
        if incoming.format.is_some() {
            self.format = incoming.format.clone();
        }
        for (key, value) in &incoming.extra {
            match self.extra.entry(key.clone()) {
                Entry::Occupied(mut slot) => {
                    if let (Value::Array(existing), Value::Array(new)) = (slot.get_mut(), value) {
                        existing.extend(new.iter().cloned());
                    } else {
                        slot.insert(value.clone());
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(value.clone());
                }
            }
        }
    }
}

/// One editable field as declared by a schema fragment.
///
/// Immutable once the owning [`Schema`](crate::Schema) is merged. Hook
/// *names* are the serialized form; the bound chains are attached during
/// merge and skipped by serde.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    /// Unique key; palette templates reference fields by this name.
    pub name: String,
    #[serde(default)]
    pub input_type: InputType,
    #[serde(default)]
    pub eval: EvalFlags,
    /// Initial value used by prefill and empty stores.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Excluded fields are dropped from every parsed palette.
    #[serde(default)]
    pub exclude: bool,
    /// Names of load transforms, applied in order after the type-table
    /// load coercion.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub load_hooks: Vec<String>,
    /// Names of save transforms, applied in order after the type-table
    /// save coercions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub save_hooks: Vec<String>,

    #[serde(skip)]
    pub bound_load_hooks: HookChain,
    #[serde(skip)]
    pub bound_save_hooks: HookChain,
}

impl FieldSpec {
    /// Creates a bare field of the given type. Fragments normally come from
    /// serde; this constructor exists for tests and programmatic schemas.
    #[must_use]
    pub fn new(name: impl Into<String>, input_type: InputType) -> Self {
        Self {
            name: name.into(),
            input_type,
            eval: EvalFlags::default(),
            default: None,
            exclude: false,
            load_hooks: Vec::new(),
            save_hooks: Vec::new(),
            bound_load_hooks: HookChain::default(),
            bound_save_hooks: HookChain::default(),
        }
    }

    /// Deep-merges a later fragment's declaration of the same field.
    ///
    /// Scalars from the incoming side override, list attributes
    /// concatenate, eval flags merge field-wise.
    pub(crate) fn merge_from(&mut self, incoming: &FieldSpec) {
        self.input_type = incoming.input_type;
        self.eval.merge_from(&incoming.eval);
        if incoming.default.is_some() {
            self.default = incoming.default.clone();
        }
        self.exclude |= incoming.exclude;
        self.load_hooks.extend(incoming.load_hooks.iter().cloned());
        self.save_hooks.extend(incoming.save_hooks.iter().cloned());
    }
}
