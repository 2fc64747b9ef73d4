//! Palette resolution and parsing for Formwork.
//!
//! A palette is an ordered template naming which fields appear on the edit
//! surface, grouped into boxes under optional legends. Templates travel as
//! strings (`;` separates boxes, `,` separates tokens, `{legend:class}`
//! headers, `[name]`…`[EOF]` ajax sub-blocks) because that is the external
//! wire format schema fragments are written in; nothing downstream of
//! [`parse`] carries the string form.
//!
//! [`resolve`] picks the active template for the current selector values
//! and splices in conditional subpalettes. [`parse`] turns the winning
//! template into the typed [`ResolvedPalette`] tree the renderer consumes.

mod parser;
mod provider;
mod resolver;
mod tree;

pub use parser::parse;
pub use provider::{ResolveContext, SelectorValueProvider};
pub use resolver::resolve;
pub use tree::{Legend, PaletteBox, ParseOutcome, PartialRender, ResolvedPalette, Row};

/// Result type alias using the crate's error type.
pub type ResolutionResult<T> = std::result::Result<T, ResolutionError>;

/// Errors raised while resolving the active palette. Both are fatal for
/// the current render; parsing itself never fails.
#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    /// The schema declares no selectors and no `default` palette.
    #[error("no default palette is defined")]
    MissingDefault,

    /// No candidate palette matched and no `default` exists to fall back to.
    #[error("no palette matches the active selectors: tried {tried:?}")]
    NoMatch { tried: Vec<String> },
}
