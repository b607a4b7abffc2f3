//! `JsonFileStore` persistence across reopen, corruption, and versioning.

use panelgrid_layout::ids;
use panelgrid_store::{
    FILE_FORMAT_VERSION, JsonFileStore, KeyValueStore, LayoutStore, LegacyAliases, StorageKeys,
    StoreError,
};
use pretty_assertions::assert_eq;

#[test]
fn missing_file_opens_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::open(dir.path().join("layout.json")).unwrap();
    assert!(store.entries().is_empty());
    assert_eq!(store.get("anything"), Ok(None));
}

#[test]
fn writes_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("layout.json");
    {
        let backend = JsonFileStore::open(&path).unwrap();
        let mut store = LayoutStore::new(backend, StorageKeys::default())
            .with_aliases(LegacyAliases::dashboard_defaults());
        store
            .write_order(&ids(["dashboard-today", "dashboard-kpis"]))
            .unwrap();
        store.write_mode(true).unwrap();
    }

    let reopened = JsonFileStore::open(&path).unwrap();
    let store = LayoutStore::new(reopened, StorageKeys::default());
    assert_eq!(store.read_order(), ids(["dashboard-today", "dashboard-kpis"]));
    assert!(store.read_mode());
    assert_eq!(
        store.backend().get("dashboard.widgets.order").unwrap().as_deref(),
        Some(r#"["today","kpis"]"#)
    );
    assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn remove_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("layout.json");
    let mut store = JsonFileStore::open(&path).unwrap();
    store.set("k", "v").unwrap();
    assert_eq!(store.remove("k"), Ok(true));
    assert_eq!(store.remove("k"), Ok(false));
    let reopened = JsonFileStore::open(&path).unwrap();
    assert!(reopened.entries().is_empty());
}

#[test]
fn corrupt_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("layout.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(
        JsonFileStore::open(&path),
        Err(StoreError::Corrupt { .. })
    ));
}

#[test]
fn unknown_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("layout.json");
    std::fs::write(&path, r#"{ "version": 99, "entries": {} }"#).unwrap();
    assert_eq!(
        JsonFileStore::open(&path).unwrap_err(),
        StoreError::UnsupportedVersion {
            found: 99,
            expected: FILE_FORMAT_VERSION
        }
    );
}

#[test]
fn failed_flush_leaves_entries_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing-dir").join("layout.json");
    let mut store = JsonFileStore::open(&path).unwrap();
    assert!(matches!(store.set("k", "v"), Err(StoreError::Io(_))));
    assert_eq!(store.get("k"), Ok(None));
}
