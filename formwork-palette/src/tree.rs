use serde::{Deserialize, Serialize};

/// A box header parsed from a `{text:class}` token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Legend {
    pub text: String,
    /// Optional css-class-like suffix after the `:`. A malformed legend
    /// (no `:`) simply has no class.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_class: Option<String>,
    /// The `hide` class marks the box as initially collapsed.
    #[serde(default)]
    pub collapsed: bool,
}

impl Legend {
    /// Parses the inside of a `{...}` token. Never fails.
    #[must_use]
    pub(crate) fn from_token(inner: &str) -> Self {
        let (text, class) = match inner.split_once(':') {
            Some((text, class)) => (text, Some(class)),
            None => (inner, None),
        };
        let css_class = class.filter(|c| !c.is_empty()).map(str::to_string);
        let collapsed = css_class
            .as_deref()
            .is_some_and(|c| c.split_whitespace().any(|part| part == "hide"));
        Self {
            text: text.to_string(),
            css_class,
            collapsed,
        }
    }
}

/// One entry of a box: a field reference or a nested ajax sub-block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Row {
    Field { name: String },
    SubBlock { id: String, rows: Vec<Row> },
}

impl Row {
    #[must_use]
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field { name: name.into() }
    }
}

/// One visually grouped run of fields within a palette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteBox {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legend: Option<Legend>,
    pub rows: Vec<Row>,
}

/// The fully parsed palette: an ordered list of boxes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ResolvedPalette {
    pub boxes: Vec<PaletteBox>,
}

impl ResolvedPalette {
    /// Every field name in the palette, in render order, descending into
    /// sub-blocks.
    #[must_use]
    pub fn field_names(&self) -> Vec<&str> {
        fn walk<'a>(rows: &'a [Row], out: &mut Vec<&'a str>) {
            for row in rows {
                match row {
                    Row::Field { name } => out.push(name),
                    Row::SubBlock { rows, .. } => walk(rows, out),
                }
            }
        }
        let mut out = Vec::new();
        for bx in &self.boxes {
            walk(&bx.rows, &mut out);
        }
        out
    }
}

/// The rows of a single sub-block, returned when parsing targets one ajax
/// block so a conditional group can re-render without the full form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialRender {
    pub id: String,
    pub rows: Vec<Row>,
}

/// Outcome of [`parse`](crate::parse): the whole tree, or just the
/// targeted sub-block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Full(ResolvedPalette),
    Partial(PartialRender),
}

impl ParseOutcome {
    /// The full tree, when this outcome carries one.
    #[must_use]
    pub fn full(self) -> Option<ResolvedPalette> {
        match self {
            Self::Full(palette) => Some(palette),
            Self::Partial(_) => None,
        }
    }
}
