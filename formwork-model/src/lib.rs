//! Core schema model for Formwork.
//!
//! Defines the types every other Formwork crate depends on:
//! - [`FieldSpec`] — one editable field: input type, eval flags, default,
//!   hook references
//! - [`RawFragment`] — a partial schema as loaded from a declarative file
//! - [`Schema`] — the merged, immutable result handed to the palette
//!   resolver and the save pipeline
//! - [`HookRegistry`] — by-name table of load/save transforms, bound to
//!   fields once at merge time
//!
//! The schema is an explicit value: there is no ambient registry. Callers
//! load fragments however they like (the core performs no file discovery),
//! hand them to [`Schema::merge`] in order, and pass the result around.

mod field;
mod fragment;
mod hook;
mod schema;
pub mod value;

pub use field::{EvalFlags, FieldSpec, InputType};
pub use fragment::RawFragment;
pub use hook::{FieldHook, HookChain, HookContext, HookRegistry};
pub use schema::{Schema, DEFAULT_PALETTE, GENERATED_LEGEND};

/// Result type alias using the crate's error type.
pub type SchemaResult<T> = std::result::Result<T, SchemaError>;

/// Errors raised while building a schema. All of these are fatal: a schema
/// that fails to merge never reaches the edit surface.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The fragment sequence was empty or nothing in it was usable.
    #[error("no usable schema fragment")]
    NoFragments,

    /// A field references a hook name absent from the registry.
    #[error("field '{field}' references unknown hook '{hook}'")]
    UnknownHook { field: String, hook: String },

    /// A named palette was required but is not present.
    #[error("palette '{0}' is not defined")]
    MissingPalette(String),

    /// Fragment deserialization failed.
    #[error("fragment parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
