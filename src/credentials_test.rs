use super::*;

fn temp_path() -> PathBuf {
    std::env::temp_dir()
        .join(format!("blogdesk-test-{}", uuid::Uuid::new_v4()))
        .join("credentials.json")
}

// =============================================================================
// FileCredentialStore
// =============================================================================

#[test]
fn file_store_missing_file_is_none() {
    let store = FileCredentialStore::new(temp_path());
    assert_eq!(store.load().unwrap(), None);
}

#[test]
fn file_store_save_then_load() {
    let path = temp_path();
    let store = FileCredentialStore::new(&path);
    store.save("tok-1").unwrap();
    assert_eq!(store.load().unwrap().as_deref(), Some("tok-1"));

    let raw = std::fs::read_to_string(&path).unwrap();
    let record: CredentialRecord = serde_json::from_str(&raw).unwrap();
    assert_eq!(record.token, "tok-1");

    store.clear().unwrap();
}

#[test]
fn file_store_clear_is_idempotent() {
    let store = FileCredentialStore::new(temp_path());
    store.save("tok").unwrap();
    store.clear().unwrap();
    store.clear().unwrap();
    assert_eq!(store.load().unwrap(), None);
}

#[test]
fn file_store_corrupt_record_is_error() {
    let path = temp_path();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "not json").unwrap();
    let store = FileCredentialStore::new(&path);
    assert!(matches!(store.load(), Err(StoreError::Corrupt(_))));
    store.clear().unwrap();
}

#[test]
fn file_store_empty_token_is_none() {
    let path = temp_path();
    let store = FileCredentialStore::new(&path);
    store.save("").unwrap();
    assert_eq!(store.load().unwrap(), None);
    store.clear().unwrap();
}

// =============================================================================
// MemoryCredentialStore
// =============================================================================

#[test]
fn memory_store_counts_writes() {
    let store = MemoryCredentialStore::with_token("seed");
    assert_eq!(store.load().unwrap().as_deref(), Some("seed"));
    store.save("next").unwrap();
    store.clear().unwrap();
    store.clear().unwrap();
    assert_eq!(store.peek(), None);
    assert_eq!(store.save_count(), 1);
    assert_eq!(store.clear_count(), 2);
}
