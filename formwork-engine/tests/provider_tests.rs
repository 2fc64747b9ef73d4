use formwork_engine::{EditSession, SessionValueProvider, StorageMode};
use formwork_model::{FieldSpec, HookRegistry, InputType, RawFragment, Schema};
use formwork_palette::{resolve, ResolveContext, SelectorValueProvider};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::BTreeMap;

fn schema_with_selector(submit_on_change: bool) -> Schema {
    let mut selector = FieldSpec::new("kind", InputType::Text);
    selector.eval.submit_on_change = submit_on_change;

    let mut frag = RawFragment::default();
    frag.fields = vec![selector, FieldSpec::new("src", InputType::Text)];
    frag.palettes.insert("default".into(), "kind;".into());
    frag.palettes.insert("image".into(), "kind,src;".into());
    frag.selectors = vec!["kind".into()];
    Schema::merge(vec![frag], &HookRegistry::new()).unwrap()
}

fn posted(entries: &[(&str, serde_json::Value)]) -> BTreeMap<String, serde_json::Value> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

#[test]
fn stored_value_is_used_outside_a_submission() {
    let schema = schema_with_selector(false);
    let mut session = EditSession::new("settings", StorageMode::Flat);
    session.set_value("kind", json!("image"));
    session.set_posted(posted(&[("kind", json!("video"))]));

    let provider = SessionValueProvider::new(&schema, &session);
    assert_eq!(provider.get("kind", None), Some(json!("image")));
}

#[test]
fn posted_value_wins_during_a_submission() {
    let schema = schema_with_selector(false);
    let mut session = EditSession::new("settings", StorageMode::Flat);
    session.set_value("kind", json!("image"));
    session.set_posted(posted(&[("kind", json!("video"))]));
    session.mark_submitted("settings");

    let provider = SessionValueProvider::new(&schema, &session);
    assert_eq!(provider.get("kind", None), Some(json!("video")));
}

#[test]
fn absent_post_reads_as_unset_during_a_submission() {
    // An unchecked checkbox is simply not posted; falling back to the
    // stored value would keep a deactivated selector alive.
    let schema = schema_with_selector(false);
    let mut session = EditSession::new("settings", StorageMode::Flat);
    session.set_value("kind", json!("image"));
    session.mark_submitted("settings");

    let provider = SessionValueProvider::new(&schema, &session);
    assert_eq!(provider.get("kind", None), None);
}

#[test]
fn submit_on_change_fields_keep_the_stored_value() {
    let schema = schema_with_selector(true);
    let mut session = EditSession::new("settings", StorageMode::Flat);
    session.set_value("kind", json!("image"));
    session.set_posted(posted(&[("kind", json!("video"))]));
    session.mark_submitted("settings");

    let provider = SessionValueProvider::new(&schema, &session);
    assert_eq!(provider.get("kind", None), Some(json!("image")));
}

#[test]
fn record_suffix_selects_the_per_record_post() {
    let schema = schema_with_selector(false);
    let mut session = EditSession::new("settings", StorageMode::Flat);
    session.set_posted(posted(&[
        ("kind_7", json!("image")),
        ("kind", json!("video")),
    ]));
    session.mark_submitted("settings");

    let provider = SessionValueProvider::new(&schema, &session);
    assert_eq!(provider.get("kind", Some("7")), Some(json!("image")));
}

// ── Through the resolver ─────────────────────────────────────────

#[test]
fn resolution_follows_the_posted_selector() {
    let schema = schema_with_selector(false);
    let mut session = EditSession::new("settings", StorageMode::Flat);
    session.set_value("kind", json!(""));
    session.set_posted(posted(&[("kind", json!("image"))]));
    session.mark_submitted("settings");

    let provider = SessionValueProvider::new(&schema, &session);
    let template = resolve(&schema, &provider, &ResolveContext::new()).unwrap();
    assert_eq!(template, "kind,src;");
}

#[test]
fn resolution_uses_stored_values_before_submission() {
    let schema = schema_with_selector(false);
    let mut session = EditSession::new("settings", StorageMode::Flat);
    session.set_value("kind", json!("image"));

    let provider = SessionValueProvider::new(&schema, &session);
    let template = resolve(&schema, &provider, &ResolveContext::new()).unwrap();
    assert_eq!(template, "kind,src;");
}

// ── Session basics ───────────────────────────────────────────────

#[test]
fn storage_mode_exposes_the_record_id() {
    assert_eq!(StorageMode::Flat.record_id(), None);
    assert_eq!(
        StorageMode::Row {
            record_id: "7".into()
        }
        .record_id(),
        Some("7")
    );
}

#[test]
fn edit_value_coerces_the_snapshot() {
    let mut spec = FieldSpec::new("flags", InputType::Checkbox);
    spec.eval.multiple = true;

    let mut session = EditSession::new("settings", StorageMode::Flat);
    session.set_value("flags", json!("[\"a\",\"b\"]"));
    assert_eq!(session.edit_value(&spec), json!(["a", "b"]));
}

#[test]
fn edit_value_falls_back_to_the_declared_default() {
    let mut spec = FieldSpec::new("mode", InputType::Text);
    spec.default = Some(json!("standard"));

    let session = EditSession::new("settings", StorageMode::Flat);
    assert_eq!(session.edit_value(&spec), json!("standard"));
}

#[test]
fn submission_marker_matches_only_the_own_table() {
    let mut session = EditSession::new("settings", StorageMode::Flat);
    assert!(!session.is_submission());
    session.mark_submitted("news");
    assert!(!session.is_submission());
    session.mark_submitted("settings");
    assert!(session.is_submission());
}
