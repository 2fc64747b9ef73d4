use formwork_model::value::is_truthy;
use formwork_model::{InputType, Schema, DEFAULT_PALETTE as DEFAULT};
use regex::RegexBuilder;
use serde_json::Value;
use tracing::{debug, warn};

use crate::provider::{ResolveContext, SelectorValueProvider};
use crate::{ResolutionError, ResolutionResult};

/// Determines the active palette template for the current selector values.
///
/// Without selectors this is a plain lookup of `"default"`. With
/// selectors, each activated selector contributes a token; candidate
/// palette names are built from token combinations (largest first) and
/// the first name present in the palette map wins, falling back to
/// `"default"`. Activated subpalettes are then spliced into the winning
/// template directly after their trigger field.
pub fn resolve(
    schema: &Schema,
    provider: &dyn SelectorValueProvider,
    ctx: &ResolveContext,
) -> ResolutionResult<String> {
    if schema.selectors().is_empty() {
        return schema
            .palette(DEFAULT)
            .map(str::to_string)
            .ok_or(ResolutionError::MissingDefault);
    }

    let mut tokens: Vec<String> = Vec::new();
    // Ordered by selector declaration, keyed by the selector's base name.
    let mut subpalettes: Vec<(String, String)> = Vec::new();

    for name in schema.selectors() {
        let Some(value) = provider.get(name, ctx.record_suffix.as_deref()) else {
            continue;
        };
        if !is_truthy(&value) {
            continue;
        }

        let plain_checkbox = schema
            .field(name)
            .is_some_and(|f| f.input_type == InputType::Checkbox && !f.eval.multiple);

        let (token, subpalette_key) = if plain_checkbox {
            // A set checkbox activates under its own name.
            (name.clone(), name.clone())
        } else {
            let Some(token) = scalar_token(&value) else {
                warn!(selector = %name, "non-scalar selector value, skipping activation");
                continue;
            };
            let key = format!("{name}_{token}");
            (token, key)
        };

        if let Some(template) = schema.subpalette(&subpalette_key) {
            subpalettes.push((name.clone(), template.to_string()));
        }
        tokens.push(token);
    }

    let candidates = if tokens.is_empty() {
        vec![DEFAULT.to_string()]
    } else if tokens.len() == 1 {
        vec![tokens[0].clone()]
    } else {
        combine(&tokens)
    };

    let chosen = candidates
        .iter()
        .map(String::as_str)
        .find(|name| schema.palette(name).is_some())
        .or_else(|| {
            debug!(tried = ?candidates, "no candidate palette matched, falling back");
            schema.palette(DEFAULT).map(|_| DEFAULT)
        });

    let Some(chosen) = chosen else {
        return Err(ResolutionError::NoMatch { tried: candidates });
    };
    debug!(palette = %chosen, "resolved palette");
    let mut template = schema
        .palette(chosen)
        .map(str::to_string)
        .unwrap_or_default();

    for (name, subpalette) in &subpalettes {
        template = splice_subpalette(&template, name, subpalette);
    }

    Ok(template)
}

/// In-lines a subpalette after its trigger field: the field's bare name,
/// matched whole-word and case-insensitively, becomes
/// `name,[name],<subpalette>,[EOF]`.
fn splice_subpalette(template: &str, name: &str, subpalette: &str) -> String {
    let pattern = format!(r"\b{}\b", regex::escape(name));
    let re = RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .expect("escaped field name is a valid pattern");
    let replacement = format!("{name},[{name}],{subpalette},[EOF]");
    re.replace_all(template, |_: &regex::Captures<'_>| replacement.clone())
        .into_owned()
}

/// Candidate palette names for two or more active tokens: every non-empty
/// subset, largest subsets first, members joined with `_` in their
/// original relative order; within a size group, subsets in positional
/// (lexicographic index) order.
fn combine(tokens: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    let mut picked = Vec::new();
    for size in (1..=tokens.len()).rev() {
        subsets_of(tokens, 0, size, &mut picked, &mut out);
    }
    out
}

fn subsets_of(
    tokens: &[String],
    start: usize,
    need: usize,
    picked: &mut Vec<usize>,
    out: &mut Vec<String>,
) {
    if need == 0 {
        let name = picked
            .iter()
            .map(|&i| tokens[i].as_str())
            .collect::<Vec<_>>()
            .join("_");
        out.push(name);
        return;
    }
    for i in start..=tokens.len() - need {
        picked.push(i);
        subsets_of(tokens, i + 1, need - 1, picked, out);
        picked.pop();
    }
}

/// Palette-name token for a non-checkbox selector value.
fn scalar_token(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("1".to_string()),
        _ => None,
    }
}
