use cheatsheets_core::catalog::{build_ids, build_view, Catalog, CatalogView};
use cheatsheets_core::contract::{
    CatalogError, MockFavoritesStorage, MockRepository, RawEntry, RepositoryError, SheetId,
    StoreError,
};
use cheatsheets_core::favorites::FavoritesStore;
use std::collections::HashSet;

fn ids(values: &[&str]) -> Vec<SheetId> {
    values.iter().map(|v| SheetId::new(*v).unwrap()).collect()
}

fn files(paths: &[&str]) -> Vec<RawEntry> {
    paths.iter().map(|p| RawEntry::file(*p)).collect()
}

#[test]
fn test_scenario_markdown_only_with_one_favorite() {
    let entries = files(&["intro.md", "advanced.md", "notes.txt"]);
    assert_eq!(build_ids(&entries), ids(&["intro", "advanced"]));

    let view = build_view(&entries, &ids(&["advanced"]));
    assert_eq!(
        view,
        CatalogView {
            favorites: ids(&["advanced"]),
            others: ids(&["intro"]),
        }
    );
}

#[test]
fn test_build_ids_is_idempotent_and_order_preserving() {
    let entries = vec![
        RawEntry::file("zsh.md"),
        RawEntry::directory("assets"),
        RawEntry::file("assets/zsh.png"),
        RawEntry::file("awk.md"),
        RawEntry::file("README.md"),
        RawEntry::file("git-log.md"),
    ];
    let first = build_ids(&entries);
    let second = build_ids(&entries);
    assert_eq!(first, second);
    assert_eq!(first, ids(&["zsh", "awk", "git-log"]));
}

#[test]
fn test_build_view_partitions_are_disjoint_and_unique() {
    let entries = files(&["a.md", "b.md", "c.md", "d.md", "b.md"]);
    let favorite_sets = vec![
        ids(&[]),
        ids(&["a"]),
        ids(&["d", "a"]),
        ids(&["c", "c", "zz"]),
        ids(&["a", "b", "c", "d"]),
    ];

    for favorites in favorite_sets {
        let view = build_view(&entries, &favorites);
        let fav: HashSet<_> = view.favorites.iter().collect();
        let others: HashSet<_> = view.others.iter().collect();
        assert!(fav.is_disjoint(&others), "overlap for {favorites:?}");
        assert_eq!(fav.len(), view.favorites.len(), "dupes in favorites");
        assert_eq!(others.len(), view.others.len(), "dupes in others");
        assert_eq!(view.len(), 4, "every listed sheet appears once");
    }
}

#[test]
fn test_build_view_keeps_favorites_order_and_drops_stale() {
    let entries = files(&["a.md", "b.md", "c.md"]);
    let view = build_view(&entries, &ids(&["c", "gone", "a"]));
    assert_eq!(view.favorites, ids(&["c", "a"]));
    assert_eq!(view.others, ids(&["b"]));
}

fn catalog_with(
    repository: MockRepository,
    storage: MockFavoritesStorage,
) -> Catalog<MockRepository, MockFavoritesStorage> {
    Catalog::new(repository, FavoritesStore::new(storage))
}

#[tokio::test]
async fn test_catalog_list_combines_repository_and_favorites() {
    let mut repository = MockRepository::new();
    repository
        .expect_list_entries()
        .times(1)
        .returning(|| Ok(files(&["intro.md", "advanced.md", "notes.txt"])));

    let mut storage = MockFavoritesStorage::new();
    storage
        .expect_load()
        .times(1)
        .returning(|| Ok(ids(&["advanced"])));
    storage.expect_save().never();

    let view = catalog_with(repository, storage).list().await.unwrap();
    assert_eq!(view.favorites, ids(&["advanced"]));
    assert_eq!(view.others, ids(&["intro"]));
}

#[tokio::test]
async fn test_catalog_list_surfaces_fetch_error() {
    let mut repository = MockRepository::new();
    repository
        .expect_list_entries()
        .returning(|| Err(RepositoryError::Fetch("connection reset".into())));
    let mut storage = MockFavoritesStorage::new();
    storage.expect_load().never();

    let err = catalog_with(repository, storage).list().await.unwrap_err();
    assert!(
        matches!(err, CatalogError::Repository(RepositoryError::Fetch(_))),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn test_catalog_list_surfaces_storage_error() {
    let mut repository = MockRepository::new();
    repository
        .expect_list_entries()
        .returning(|| Ok(files(&["a.md"])));
    let mut storage = MockFavoritesStorage::new();
    storage
        .expect_load()
        .returning(|| Err(StoreError::Corrupt("bad json".into())));

    let err = catalog_with(repository, storage).list().await.unwrap_err();
    assert!(matches!(err, CatalogError::Store(StoreError::Corrupt(_))));
}

#[tokio::test]
async fn test_catalog_open_fetches_and_cleans() {
    let mut repository = MockRepository::new();
    repository
        .expect_fetch_body()
        .withf(|id| id.as_str() == "vim")
        .times(1)
        .returning(|_| Ok("---\ntitle: Vim\n---\nHello {{name}}, welcome".to_string()));

    let body = catalog_with(repository, MockFavoritesStorage::new())
        .open(&SheetId::new("vim").unwrap())
        .await
        .unwrap();
    assert_eq!(body, "Hello , welcome");
}

#[tokio::test]
async fn test_catalog_open_surfaces_not_found() {
    let mut repository = MockRepository::new();
    repository
        .expect_fetch_body()
        .returning(|id| Err(RepositoryError::NotFound(id.clone())));

    let missing = SheetId::new("missing").unwrap();
    let err = catalog_with(repository, MockFavoritesStorage::new())
        .open(&missing)
        .await
        .unwrap_err();
    match err {
        CatalogError::Repository(RepositoryError::NotFound(id)) => assert_eq!(id, missing),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_catalog_url_for_delegates_to_repository() {
    let mut repository = MockRepository::new();
    repository
        .expect_url_for()
        .returning(|id| format!("https://devhints.io/{id}"));

    let catalog = catalog_with(repository, MockFavoritesStorage::new());
    assert_eq!(
        catalog.url_for(&SheetId::new("bash").unwrap()),
        "https://devhints.io/bash"
    );
}

#[tokio::test]
async fn test_catalog_add_favorite_saves_appended_set() {
    let mut storage = MockFavoritesStorage::new();
    storage.expect_load().returning(|| Ok(ids(&["a"])));
    storage
        .expect_save()
        .withf(|saved| saved == &ids(&["a", "b"]))
        .times(1)
        .returning(|_| Ok(()));

    let changed = catalog_with(MockRepository::new(), storage)
        .add_favorite(&SheetId::new("b").unwrap())
        .await
        .unwrap();
    assert!(changed);
}
