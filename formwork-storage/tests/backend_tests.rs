use formwork_storage::{FlatStore, RowStore, StorageBackend, StorageError};
use pretty_assertions::assert_eq;
use serde_json::json;

// ── Flat store ───────────────────────────────────────────────────

#[test]
fn flat_store_round_trips_values() {
    let mut store = FlatStore::open_in_memory().unwrap();
    store.persist("title", &json!("hello")).unwrap();
    store.persist("count", &json!(3)).unwrap();
    store.persist("flags", &json!(["a", "b"])).unwrap();

    assert_eq!(store.get("title").unwrap(), Some(json!("hello")));
    assert_eq!(store.get("count").unwrap(), Some(json!(3)));
    assert_eq!(store.get("flags").unwrap(), Some(json!(["a", "b"])));
}

#[test]
fn flat_store_get_missing_is_none() {
    let store = FlatStore::open_in_memory().unwrap();
    assert_eq!(store.get("absent").unwrap(), None);
}

#[test]
fn flat_store_overwrites_in_place() {
    let mut store = FlatStore::open_in_memory().unwrap();
    store.persist("title", &json!("first")).unwrap();
    store.persist("title", &json!("second")).unwrap();
    assert_eq!(store.get("title").unwrap(), Some(json!("second")));
    assert_eq!(store.get_all().unwrap().len(), 1);
}

#[test]
fn flat_store_get_all_snapshots_everything() {
    let mut store = FlatStore::open_in_memory().unwrap();
    store.persist("a", &json!(true)).unwrap();
    store.persist("b", &json!("x")).unwrap();
    let all = store.get_all().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all["a"], json!(true));
    assert_eq!(all["b"], json!("x"));
}

#[test]
fn flat_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.db");
    {
        let mut store = FlatStore::open(&path).unwrap();
        store.persist("title", &json!("kept")).unwrap();
    }
    let store = FlatStore::open(&path).unwrap();
    assert_eq!(store.get("title").unwrap(), Some(json!("kept")));
}

// ── Row store ────────────────────────────────────────────────────

fn row_store() -> RowStore {
    let mut store = RowStore::open_in_memory("pages", "settings", "7").unwrap();
    store.ensure_record().unwrap();
    store
}

#[test]
fn row_store_round_trips_values() {
    let mut store = row_store();
    store.persist("title", &json!("hello")).unwrap();
    store.persist("published", &json!(true)).unwrap();

    assert_eq!(store.get("title").unwrap(), Some(json!("hello")));
    assert_eq!(store.get("published").unwrap(), Some(json!(true)));
}

#[test]
fn row_store_empty_record_reads_as_empty_map() {
    let store = row_store();
    assert!(store.get_all().unwrap().is_empty());
    assert_eq!(store.get("anything").unwrap(), None);
}

#[test]
fn row_store_missing_record_reads_as_empty_map() {
    let store = RowStore::open_in_memory("pages", "settings", "404").unwrap();
    assert!(store.get_all().unwrap().is_empty());
}

#[test]
fn row_store_persist_to_missing_record_fails() {
    let mut store = RowStore::open_in_memory("pages", "settings", "404").unwrap();
    let err = store.persist("title", &json!("x")).unwrap_err();
    match err {
        StorageError::RecordNotFound(id) => assert_eq!(id, "404"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn row_store_persist_keeps_other_fields_in_the_blob() {
    let mut store = row_store();
    store.persist("title", &json!("hello")).unwrap();
    store.persist("note", &json!("world")).unwrap();

    let all = store.get_all().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all["title"], json!("hello"));
    assert_eq!(all["note"], json!("world"));
}

#[test]
fn row_store_records_are_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cms.db");

    let mut first = RowStore::open(&path, "pages", "settings", "1").unwrap();
    first.ensure_record().unwrap();
    first.persist("title", &json!("one")).unwrap();

    let mut second = RowStore::open(&path, "pages", "settings", "2").unwrap();
    second.ensure_record().unwrap();
    second.persist("title", &json!("two")).unwrap();

    assert_eq!(first.get("title").unwrap(), Some(json!("one")));
    assert_eq!(second.get("title").unwrap(), Some(json!("two")));
}

#[test]
fn row_store_rejects_unsafe_identifiers() {
    let err = RowStore::open_in_memory("pages; DROP TABLE x", "settings", "1").unwrap_err();
    assert!(matches!(err, StorageError::InvalidIdentifier(_)));

    let err = RowStore::open_in_memory("pages", "settings--", "1").unwrap_err();
    assert!(matches!(err, StorageError::InvalidIdentifier(_)));
}

#[test]
fn row_store_recovers_from_malformed_blob() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cms.db");
    {
        let mut store = RowStore::open(&path, "pages", "settings", "1").unwrap();
        store.ensure_record().unwrap();
        store.persist("title", &json!("ok")).unwrap();
    }
    // Corrupt the blob out-of-band.
    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute("UPDATE pages SET settings = 'not json' WHERE id = '1'", [])
            .unwrap();
    }
    let mut store = RowStore::open(&path, "pages", "settings", "1").unwrap();
    assert!(store.get_all().unwrap().is_empty());

    // A write after recovery starts from the empty set.
    store.persist("title", &json!("fresh")).unwrap();
    assert_eq!(store.get("title").unwrap(), Some(json!("fresh")));
}
