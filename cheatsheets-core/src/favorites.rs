//! # favorites: persisted, ordered set of favorite sheet ids
//!
//! [`FavoritesStore`] implements the set semantics (unique ids, insertion
//! order, idempotent add/remove) on top of any [`FavoritesStorage`].
//! [`JsonFileStorage`] is the storage used by the CLI: one JSON record on disk.
//!
//! ## Semantics
//! - Every operation is a full load → modify → save round trip; nothing is
//!   cached between calls, so a second process sees changes immediately.
//! - Adding an id that is already a favorite keeps it where it is.
//! - Removing an id that is not a favorite does nothing.
//! - A set that did not change is not written back.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::contract::{FavoritesStorage, SheetId, StoreError};

pub struct FavoritesStore<S> {
    storage: S,
}

impl<S: FavoritesStorage> FavoritesStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Current favorites in insertion order, without duplicates.
    pub async fn list(&self) -> Result<Vec<SheetId>, StoreError> {
        let mut favorites = self.storage.load().await?;
        dedup_in_order(&mut favorites);
        Ok(favorites)
    }

    /// Append `id` unless it is already present. Returns whether the set changed.
    pub async fn add(&self, id: &SheetId) -> Result<bool, StoreError> {
        let mut favorites = self.list().await?;
        if favorites.contains(id) {
            debug!(sheet = %id, "Already a favorite");
            return Ok(false);
        }
        favorites.push(id.clone());
        self.storage.save(favorites).await?;
        info!(sheet = %id, "Added favorite");
        Ok(true)
    }

    /// Remove `id` if present. Returns whether the set changed.
    pub async fn remove(&self, id: &SheetId) -> Result<bool, StoreError> {
        let mut favorites = self.list().await?;
        let before = favorites.len();
        favorites.retain(|f| f != id);
        if favorites.len() == before {
            debug!(sheet = %id, "Not a favorite, nothing to remove");
            return Ok(false);
        }
        self.storage.save(favorites).await?;
        info!(sheet = %id, "Removed favorite");
        Ok(true)
    }
}

fn dedup_in_order(ids: &mut Vec<SheetId>) {
    let mut seen = std::collections::HashSet::new();
    ids.retain(|id| seen.insert(id.clone()));
}

/// On-disk layout: `{"favorites": ["vim", "bash"]}`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct FavoritesRecord {
    #[serde(default)]
    favorites: Vec<String>,
}

/// Favorites kept in a single JSON file.
///
/// Saves write a temporary file next to the target and rename it into place,
/// so readers never see a half-written record.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(contents)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl FavoritesStorage for JsonFileStorage {
    async fn load(&self) -> Result<Vec<SheetId>, StoreError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No favorites file yet");
                return Ok(Vec::new());
            }
            Err(e) => {
                error!(error = ?e, path = %self.path.display(), "Failed to read favorites file");
                return Err(StoreError::Io(e));
            }
        };
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }

        let record: FavoritesRecord = serde_json::from_str(&contents).map_err(|e| {
            error!(error = ?e, path = %self.path.display(), "Failed to parse favorites file");
            StoreError::Corrupt(format!("{}: {e}", self.path.display()))
        })?;

        let favorites = record
            .favorites
            .into_iter()
            .filter_map(|raw| match SheetId::new(raw) {
                Ok(id) => Some(id),
                Err(e) => {
                    warn!(error = %e, path = %self.path.display(), "Skipping invalid favorite");
                    None
                }
            })
            .collect::<Vec<_>>();
        debug!(count = favorites.len(), path = %self.path.display(), "Loaded favorites");
        Ok(favorites)
    }

    async fn save(&self, favorites: Vec<SheetId>) -> Result<(), StoreError> {
        let record = FavoritesRecord {
            favorites: favorites.into_iter().map(String::from).collect(),
        };
        let json = serde_json::to_vec_pretty(&record).map_err(|e| {
            error!(error = ?e, path = %self.path.display(), "Failed to encode favorites");
            StoreError::Io(std::io::Error::other(e))
        })?;

        let path = self.path.clone();
        let count = record.favorites.len();
        tokio::task::spawn_blocking(move || Self::write_atomically(&path, &json))
            .await
            .map_err(|e| {
                error!(error = ?e, path = %self.path.display(), "Favorites writer task failed");
                StoreError::Io(std::io::Error::other(e))
            })?
            .map_err(|e| {
                error!(error = %e, path = %self.path.display(), "Failed to write favorites file");
                e
            })?;
        debug!(count, path = %self.path.display(), "Saved favorites");
        Ok(())
    }
}
