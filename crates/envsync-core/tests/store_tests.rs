//! Integration tests for KeyValueStore file handling

use std::fs;

use envsync_core::{EnvSyncError, KeyValueStore};
use tempfile::TempDir;

#[test]
fn test_load_missing_file_is_not_found() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".env");

    let err = KeyValueStore::load(&path).unwrap_err();
    match err {
        EnvSyncError::NotFound(p) => assert_eq!(p, path),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn test_save_then_load_keeps_keys_order_and_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".env");

    let store = KeyValueStore::from_pairs([
        ("SMART_LLM_MODEL", "gpt-4"),
        ("OPENAI_API_KEY", ""),
        ("REDIS_HOST", "localhost"),
        ("MEMORY_INDEX", "auto-gpt"),
        ("NOTE", "two words"),
    ])
    .unwrap();
    store.save(&path).unwrap();

    let loaded = KeyValueStore::load(&path).unwrap();
    assert_eq!(loaded, store);

    let keys: Vec<_> = loaded.keys().collect();
    assert_eq!(
        keys,
        vec!["SMART_LLM_MODEL", "OPENAI_API_KEY", "REDIS_HOST", "MEMORY_INDEX", "NOTE"]
    );
}

#[test]
fn test_save_writes_one_line_per_entry() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".env");

    KeyValueStore::from_pairs([("A", "1"), ("B", "")])
        .unwrap()
        .save(&path)
        .unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "A=1\nB=\n");
}

#[test]
fn test_save_overwrites_existing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".env");
    fs::write(&path, "OLD=value\nOTHER=x\n").unwrap();

    KeyValueStore::from_pairs([("NEW", "1")])
        .unwrap()
        .save(&path)
        .unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "NEW=1\n");
}

#[test]
fn test_load_ignores_comments_and_blank_lines() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".env.template");
    fs::write(
        &path,
        "################\n# LLM MODELS\n################\n\nFAST_LLM_MODEL=gpt-3.5-turbo\n\n# keys\nOPENAI_API_KEY=\n",
    )
    .unwrap();

    let store = KeyValueStore::load(&path).unwrap();
    assert_eq!(store.len(), 2);
    assert_eq!(store.get("FAST_LLM_MODEL"), Some("gpt-3.5-turbo"));
    assert_eq!(store.get("OPENAI_API_KEY"), Some(""));
}

#[test]
fn test_load_malformed_file_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".env");
    fs::write(&path, "GOOD=1\nthis line is not a pair\n").unwrap();

    let err = KeyValueStore::load(&path).unwrap_err();
    assert!(matches!(err, EnvSyncError::Parse { .. }));
}

#[test]
fn test_set_and_unset_are_in_memory_until_save() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".env");
    fs::write(&path, "A=1\n").unwrap();

    let mut store = KeyValueStore::load(&path).unwrap();
    store.set("B", "2").unwrap();
    store.unset("A");
    assert_eq!(fs::read_to_string(&path).unwrap(), "A=1\n");

    store.save(&path).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "B=2\n");
}

#[test]
fn test_save_after_edit_keeps_comments_and_references() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".env");
    fs::write(
        &path,
        "# my notes\nA=$UNEXPORTED_REF\nB=${HOME}/x\nC='single quoted'\nOLD=gone\n",
    )
    .unwrap();

    let mut store = KeyValueStore::load(&path).unwrap();
    store.set("NEW", "3").unwrap();
    store.unset("OLD");
    store.save(&path).unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "# my notes\nA=$UNEXPORTED_REF\nB=${HOME}/x\nC='single quoted'\nNEW=3\n"
    );
}

#[test]
fn test_invalid_key_is_rejected_before_save() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".env");
    fs::write(&path, "A=1\n").unwrap();

    let mut store = KeyValueStore::load(&path).unwrap();
    let err = store.set("BAD KEY", "1").unwrap_err();
    assert!(matches!(err, EnvSyncError::InvalidKey(_)));

    store.save(&path).unwrap();
    assert_eq!(KeyValueStore::load(&path).unwrap(), store);
    assert_eq!(fs::read_to_string(&path).unwrap(), "A=1\n");
}
