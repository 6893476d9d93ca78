//! Catalog: which cheatsheets exist, and which of them are favorites.
//!
//! - [`build_ids`] turns a raw repository listing into sheet ids.
//! - [`build_view`] partitions those ids into favorites and the rest.
//! - [`Catalog`] wires a [`Repository`] and a [`FavoritesStore`] together and
//!   is the only type a presentation layer needs: list, open, add/remove a
//!   favorite, and build a browsable URL.
//!
//! # Error Handling
//! Repository and storage errors are returned unmodified inside
//! [`CatalogError`]; nothing here retries or swallows them. Formatting
//! problems in a fetched body are handled by [`crate::pipeline`] and never
//! surface as errors.

use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, error, info};

use crate::contract::{
    CatalogError, EntryKind, FavoritesStorage, RawEntry, Repository, SheetId,
};
use crate::favorites::FavoritesStore;
use crate::pipeline;

const SHEET_EXTENSION: &str = ".md";

/// Repository housekeeping documents that are not cheatsheets.
const ADMIN_DOCUMENTS: &[&str] = &["README", "CONTRIBUTING", "CONDUCT"];

/// Favorites first, then everything else. The two lists never share an id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogView {
    pub favorites: Vec<SheetId>,
    pub others: Vec<SheetId>,
}

impl CatalogView {
    pub fn len(&self) -> usize {
        self.favorites.len() + self.others.len()
    }

    pub fn is_empty(&self) -> bool {
        self.favorites.is_empty() && self.others.is_empty()
    }
}

/// Map a repository listing to sheet ids, keeping the listing's order.
///
/// Only markdown files at the repository root count; directories, nested
/// files, other assets, `_`/`.`-prefixed scaffolding and the repository's
/// own README/CONTRIBUTING/CONDUCT documents are skipped.
pub fn build_ids(entries: &[RawEntry]) -> Vec<SheetId> {
    entries.iter().filter_map(sheet_id_for).collect()
}

fn sheet_id_for(entry: &RawEntry) -> Option<SheetId> {
    if entry.kind != EntryKind::File || entry.path.contains('/') {
        return None;
    }
    let stem = entry.path.strip_suffix(SHEET_EXTENSION)?;
    if stem.starts_with(['_', '.']) {
        return None;
    }
    if ADMIN_DOCUMENTS.contains(&stem) {
        debug!(path = %entry.path, "Skipping repository admin document");
        return None;
    }
    SheetId::new(stem).ok()
}

/// Partition the listed sheets into favorites (in favorites order) and
/// others (in listing order).
///
/// Favorites that are no longer listed are dropped without error.
pub fn build_view(entries: &[RawEntry], favorites: &[SheetId]) -> CatalogView {
    let listed = build_ids(entries);
    let listed_set: HashSet<&SheetId> = listed.iter().collect();

    let mut seen = HashSet::new();
    let favorites: Vec<SheetId> = favorites
        .iter()
        .filter(|id| listed_set.contains(id) && seen.insert(*id))
        .cloned()
        .collect();

    let favorite_set: HashSet<&SheetId> = favorites.iter().collect();
    let mut seen = HashSet::new();
    let others: Vec<SheetId> = listed
        .iter()
        .filter(|id| !favorite_set.contains(id) && seen.insert(*id))
        .cloned()
        .collect();

    CatalogView { favorites, others }
}

/// The presentation-facing service.
pub struct Catalog<R, S> {
    repository: R,
    favorites: FavoritesStore<S>,
}

impl<R, S> Catalog<R, S>
where
    R: Repository,
    S: FavoritesStorage,
{
    pub fn new(repository: R, favorites: FavoritesStore<S>) -> Self {
        Self {
            repository,
            favorites,
        }
    }

    /// Fetch the listing and the favorites, and partition them.
    pub async fn list(&self) -> Result<CatalogView, CatalogError> {
        info!("Listing cheatsheets");
        let entries = self.repository.list_entries().await.map_err(|e| {
            error!(error = %e, "Failed to list repository entries");
            e
        })?;
        let favorites = self.favorites.list().await?;
        let view = build_view(&entries, &favorites);
        info!(
            entries = entries.len(),
            favorites = view.favorites.len(),
            others = view.others.len(),
            "Built catalog view"
        );
        Ok(view)
    }

    /// Fetch one sheet and clean it for display.
    pub async fn open(&self, id: &SheetId) -> Result<String, CatalogError> {
        info!(sheet = %id, "Opening cheatsheet");
        let raw = self.repository.fetch_body(id).await.map_err(|e| {
            error!(sheet = %id, error = %e, "Failed to fetch cheatsheet");
            e
        })?;
        Ok(pipeline::clean(&raw))
    }

    /// Returns `true` if the id was not a favorite before.
    pub async fn add_favorite(&self, id: &SheetId) -> Result<bool, CatalogError> {
        Ok(self.favorites.add(id).await?)
    }

    /// Returns `true` if the id was a favorite before.
    pub async fn remove_favorite(&self, id: &SheetId) -> Result<bool, CatalogError> {
        Ok(self.favorites.remove(id).await?)
    }

    pub async fn favorites(&self) -> Result<Vec<SheetId>, CatalogError> {
        Ok(self.favorites.list().await?)
    }

    pub fn url_for(&self, id: &SheetId) -> String {
        self.repository.url_for(id)
    }
}
