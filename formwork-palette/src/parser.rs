use formwork_model::Schema;
use tracing::debug;

use crate::tree::{Legend, PaletteBox, ParseOutcome, PartialRender, ResolvedPalette, Row};

/// One token of a box after the filtering pass.
enum Token {
    /// `[name]` — opens the sub-block `sub_<name>`.
    Open(String),
    /// `[EOF]` — closes the innermost open sub-block.
    Close,
    Field(String),
}

/// Parses a resolved palette template into the box/legend/field tree.
///
/// Boxes are split on `;`, tokens on `,`, all trimmed. A `{...}` token
/// sets the box legend when it precedes every field token and is always
/// removed from the rows; `[...]` tokens are structural; any other token
/// is dropped unless it names a known, non-excluded field. Boxes with no
/// tokens left are omitted. Parsing never fails — templates
/// are allowed to over-specify fields that do not exist in every merged
/// schema variant.
///
/// When `ajax_target` names a sub-block id (`sub_<name>`) present in the
/// template, only that block's rows are returned as a
/// [`ParseOutcome::Partial`], supporting re-render of a single
/// conditional group.
pub fn parse(template: &str, schema: &Schema, ajax_target: Option<&str>) -> ParseOutcome {
    let mut palette = ResolvedPalette::default();

    for box_src in template.split(';') {
        let Some(bx) = parse_box(box_src, schema) else {
            continue;
        };
        palette.boxes.push(bx);
    }

    if let Some(target) = ajax_target {
        for bx in &palette.boxes {
            if let Some(partial) = find_block(&bx.rows, target) {
                debug!(id = %target, "returning partial render");
                return ParseOutcome::Partial(partial);
            }
        }
    }

    ParseOutcome::Full(palette)
}

fn parse_box(source: &str, schema: &Schema) -> Option<PaletteBox> {
    let mut legend = None;
    let mut tokens = Vec::new();
    let mut saw_field = false;

    for raw in source.split(',') {
        let token = raw.trim();
        if token.is_empty() {
            continue;
        }
        if let Some(inner) = delimited(token, '[', ']') {
            if inner.eq_ignore_ascii_case("EOF") {
                tokens.push(Token::Close);
            } else {
                tokens.push(Token::Open(inner.to_string()));
            }
        } else if let Some(inner) = delimited(token, '{', '}') {
            // A legend only takes effect ahead of the box's fields; extra
            // legend tokens are dropped either way.
            if !saw_field && legend.is_none() {
                legend = Some(Legend::from_token(inner));
            }
        } else if schema.field(token).is_some_and(|f| !f.exclude) {
            saw_field = true;
            tokens.push(Token::Field(token.to_string()));
        } else {
            debug!(field = %token, "dropping unknown or excluded palette token");
        }
    }

    // Structural markers count as content: a box holding only an (empty)
    // sub-block still renders, because an ajax re-render may fill it.
    if tokens.is_empty() {
        return None;
    }

    Some(PaletteBox {
        legend,
        rows: build_rows(tokens),
    })
}

/// Builds the row tree of one box. Sub-blocks nest; an unmatched `[EOF]`
/// is ignored and blocks still open at the box boundary are closed there
/// (blocks never span boxes).
fn build_rows(tokens: Vec<Token>) -> Vec<Row> {
    let mut stack: Vec<(String, Vec<Row>)> = Vec::new();
    let mut rows = Vec::new();

    for token in tokens {
        match token {
            Token::Open(name) => stack.push((format!("sub_{name}"), Vec::new())),
            Token::Close => {
                if let Some((id, block_rows)) = stack.pop() {
                    let block = Row::SubBlock {
                        id,
                        rows: block_rows,
                    };
                    match stack.last_mut() {
                        Some((_, parent)) => parent.push(block),
                        None => rows.push(block),
                    }
                }
            }
            Token::Field(name) => match stack.last_mut() {
                Some((_, block)) => block.push(Row::field(name)),
                None => rows.push(Row::field(name)),
            },
        }
    }

    while let Some((id, block_rows)) = stack.pop() {
        let block = Row::SubBlock {
            id,
            rows: block_rows,
        };
        match stack.last_mut() {
            Some((_, parent)) => parent.push(block),
            None => rows.push(block),
        }
    }

    rows
}

fn find_block(rows: &[Row], target: &str) -> Option<PartialRender> {
    for row in rows {
        if let Row::SubBlock { id, rows: inner } = row {
            if id == target {
                return Some(PartialRender {
                    id: id.clone(),
                    rows: inner.clone(),
                });
            }
            if let Some(found) = find_block(inner, target) {
                return Some(found);
            }
        }
    }
    None
}

fn delimited(token: &str, open: char, close: char) -> Option<&str> {
    token
        .strip_prefix(open)
        .and_then(|rest| rest.strip_suffix(close))
}
