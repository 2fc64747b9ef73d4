use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::field::FieldSpec;

/// A partial schema as loaded from one declarative file.
///
/// Fragments are handed to [`Schema::merge`](crate::Schema::merge) in
/// caller-determined order; the core performs no file discovery or
/// inclusion itself. Fields are an ordered sequence so declaration order
/// survives deserialization — the synthesized default palette and selector
/// evaluation both depend on it.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RawFragment {
    pub fields: Vec<FieldSpec>,
    /// Palette name → template string (the `;`/`,`/`{}`/`[]` grammar).
    pub palettes: BTreeMap<String, String>,
    /// Field names whose current values drive palette resolution,
    /// in declaration order.
    pub selectors: Vec<String>,
    /// Selector-derived key (`name` or `name_value`) → subpalette template.
    pub subpalettes: BTreeMap<String, String>,
}

impl RawFragment {
    /// Parses a fragment from its JSON file form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// True when the fragment declares nothing at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
            && self.palettes.is_empty()
            && self.selectors.is_empty()
            && self.subpalettes.is_empty()
    }
}
