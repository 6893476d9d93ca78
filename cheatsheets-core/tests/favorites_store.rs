use cheatsheets_core::contract::{FavoritesStorage, MockFavoritesStorage, SheetId, StoreError};
use cheatsheets_core::favorites::{FavoritesStore, JsonFileStorage};
use std::fs;
use tempfile::tempdir;

fn id(value: &str) -> SheetId {
    SheetId::new(value).unwrap()
}

fn ids(values: &[&str]) -> Vec<SheetId> {
    values.iter().map(|v| id(v)).collect()
}

#[tokio::test]
async fn test_missing_file_reads_as_empty() {
    let dir = tempdir().unwrap();
    let store = FavoritesStore::new(JsonFileStorage::new(dir.path().join("favorites.json")));
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_add_then_remove_restores_previous_state() {
    let dir = tempdir().unwrap();
    let store = FavoritesStore::new(JsonFileStorage::new(dir.path().join("favorites.json")));
    store.add(&id("vim")).await.unwrap();
    let before = store.list().await.unwrap();

    assert!(store.add(&id("bash")).await.unwrap());
    assert!(store.remove(&id("bash")).await.unwrap());

    assert_eq!(store.list().await.unwrap(), before);
}

#[tokio::test]
async fn test_double_add_keeps_single_occurrence_and_position() {
    let dir = tempdir().unwrap();
    let store = FavoritesStore::new(JsonFileStorage::new(dir.path().join("favorites.json")));

    assert!(store.add(&id("vim")).await.unwrap());
    assert!(store.add(&id("bash")).await.unwrap());
    assert!(!store.add(&id("vim")).await.unwrap());

    assert_eq!(store.list().await.unwrap(), ids(&["vim", "bash"]));
}

#[tokio::test]
async fn test_remove_absent_is_a_noop() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("favorites.json");
    let store = FavoritesStore::new(JsonFileStorage::new(&path));

    assert!(!store.remove(&id("nothing")).await.unwrap());
    assert!(!path.exists(), "an unchanged set must not be written");
}

#[tokio::test]
async fn test_favorites_survive_a_new_store_instance() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("favorites.json");

    {
        let store = FavoritesStore::new(JsonFileStorage::new(&path));
        store.add(&id("react")).await.unwrap();
        store.add(&id("git")).await.unwrap();
    }

    let reopened = FavoritesStore::new(JsonFileStorage::new(&path));
    assert_eq!(reopened.list().await.unwrap(), ids(&["react", "git"]));

    let on_disk: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk, serde_json::json!({ "favorites": ["react", "git"] }));
}

#[tokio::test]
async fn test_json_storage_skips_invalid_and_dedupes_on_list() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("favorites.json");
    fs::write(&path, r#"{"favorites": ["vim", "", "a/b", "vim", "bash"]}"#).unwrap();

    let storage = JsonFileStorage::new(&path);
    assert_eq!(storage.load().await.unwrap(), ids(&["vim", "vim", "bash"]));

    let store = FavoritesStore::new(storage);
    assert_eq!(store.list().await.unwrap(), ids(&["vim", "bash"]));
}

#[tokio::test]
async fn test_json_storage_reports_corrupt_record() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("favorites.json");
    fs::write(&path, "not json at all").unwrap();

    let err = JsonFileStorage::new(&path).load().await.unwrap_err();
    assert!(matches!(err, StoreError::Corrupt(_)), "got {err:?}");
}

#[tokio::test]
async fn test_json_storage_empty_file_reads_as_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("favorites.json");
    fs::write(&path, "").unwrap();
    assert!(JsonFileStorage::new(&path).load().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_store_does_not_save_when_unchanged() {
    let mut storage = MockFavoritesStorage::new();
    storage.expect_load().returning(|| Ok(ids(&["vim"])));
    storage.expect_save().never();

    let store = FavoritesStore::new(storage);
    assert!(!store.add(&id("vim")).await.unwrap());
    assert!(!store.remove(&id("bash")).await.unwrap());
}

#[tokio::test]
async fn test_store_propagates_save_failure() {
    let mut storage = MockFavoritesStorage::new();
    storage.expect_load().returning(|| Ok(Vec::new()));
    storage.expect_save().returning(|_| {
        Err(StoreError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only",
        )))
    });

    let store = FavoritesStore::new(storage);
    let err = store.add(&id("vim")).await.unwrap_err();
    assert!(matches!(err, StoreError::Io(_)));
}

#[tokio::test]
async fn test_json_storage_write_failure_is_io_not_corrupt() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    fs::write(&blocker, "file in the way").unwrap();
    let storage = JsonFileStorage::new(blocker.join("favorites.json"));

    let err = storage.save(ids(&["vim"])).await.unwrap_err();
    assert!(matches!(err, StoreError::Io(_)), "got {err:?}");
    assert_eq!(fs::read_to_string(&blocker).unwrap(), "file in the way");
}
