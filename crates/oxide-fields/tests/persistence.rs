//! Integration tests for snapshot persistence.

mod common;

use std::sync::Arc;

use common::names;
use oxide_fields::prelude::*;

fn persistent_config(dir: &std::path::Path) -> StoreConfig {
    StoreConfig::new()
        .persist()
        .storage_dir(dir)
        .storage_key("fields")
}

#[test]
fn test_changes_survive_reload() {
    let dir = tempfile::tempdir().unwrap();
    let config = persistent_config(dir.path());

    let mut store = FieldStore::from_config(&config, Arc::new(SequentialAllocator::new()));
    assert_eq!(store.len(), 5);
    store.move_field(4, 0);
    store.remove_field(&FieldId::new("field-3"));

    let reloaded = FieldStore::from_config(&config, Arc::new(SequentialAllocator::new()));
    assert_eq!(
        names(reloaded.fields()),
        vec!["terms", "fullName", "email", "role"]
    );
    assert_eq!(reloaded.fields(), store.fields());
}

#[test]
fn test_no_snapshot_written_without_change() {
    let dir = tempfile::tempdir().unwrap();
    let config = persistent_config(dir.path());
    let backend = FileSnapshotBackend::new(dir.path());

    let mut store = FieldStore::from_config(&config, Arc::new(SequentialAllocator::new()));
    store.move_field(0, 42);
    assert!(!backend.path_for("fields").exists());

    store.clear();
    assert_eq!(
        std::fs::read_to_string(backend.path_for("fields")).unwrap(),
        "[]"
    );
}

#[test]
fn test_corrupt_snapshot_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("fields.json"), "{ definitely not").unwrap();

    let store = FieldStore::from_config(
        &persistent_config(dir.path()),
        Arc::new(SequentialAllocator::new()),
    );
    assert_eq!(
        names(store.fields()),
        vec!["fullName", "email", "about", "role", "terms"]
    );
}

#[test]
fn test_write_failures_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "file in the way").unwrap();

    let mut store = FieldStore::from_config(
        &persistent_config(&blocker),
        Arc::new(SequentialAllocator::new()),
    );
    assert!(store.add_field());
    assert_eq!(store.len(), 6);
}

#[test]
fn test_non_persistent_config_uses_memory_only() {
    let mut store = FieldStore::from_config(&StoreConfig::new(), Arc::new(SequentialAllocator::new()));
    assert!(store.clear());
    assert!(store.is_empty());
}

#[test]
fn test_snapshot_without_extras_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("fields.json"),
        r#"[{"id":"a","name":"when","label":"When","type":"datetime"}]"#,
    )
    .unwrap();

    let mut store = FieldStore::from_config(
        &persistent_config(dir.path()),
        Arc::new(SequentialAllocator::new()),
    );
    let before = store.fields().clone();
    assert_eq!(before.as_slice()[0].date_time_format, "DD/MM/YYYY HH:mm");

    let exported = store.export_json().unwrap();
    store.import_json(&exported).unwrap();
    common::assert_equal_up_to_ids(&before, store.fields());
}
