//! # contract: shared types and collaborator traits
//!
//! This module defines the data that crosses component boundaries
//! ([`SheetId`], [`RawEntry`]) and the two collaborator traits the rest of
//! the crate is written against:
//!
//! - [`Repository`]: read-only access to the remote (or local) cheatsheet source.
//! - [`FavoritesStorage`]: load/save of the persisted favorites record.
//!
//! ## Mocking & Testing
//! - Both traits are annotated for `mockall`, so tests can build
//!   `MockRepository` / `MockFavoritesStorage` without network or disk.
//! - Mocks are exported under the default `test-export-mocks` feature so the
//!   CLI crate and integration tests can use them too.
//!
//! ## Errors
//! - [`RepositoryError`] and [`StoreError`] are surfaced unmodified to callers;
//!   [`CatalogError`] only wraps them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use mockall::automock;

/// Stable identifier of a cheatsheet, derived from its repository path
/// without the `.md` extension (e.g. `vim`, `react`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SheetId(String);

impl SheetId {
    /// Validate and wrap an id. Empty ids and ids containing path separators
    /// are rejected.
    pub fn new(id: impl Into<String>) -> Result<Self, InvalidSheetId> {
        let id = id.into();
        if id.is_empty() || id.contains(['/', '\\']) {
            return Err(InvalidSheetId(id));
        }
        Ok(SheetId(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SheetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SheetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SheetId {
    type Error = InvalidSheetId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        SheetId::new(value)
    }
}

impl From<SheetId> for String {
    fn from(id: SheetId) -> Self {
        id.0
    }
}

impl std::str::FromStr for SheetId {
    type Err = InvalidSheetId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SheetId::new(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid sheet id {0:?}: must be non-empty and contain no path separators")]
pub struct InvalidSheetId(pub String);

/// What a listing entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    /// Anything else the source reports (e.g. git submodules).
    Other,
}

/// One entry of a repository listing. Only the catalog builder looks inside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    /// Path relative to the repository root, `/`-separated.
    pub path: String,
    pub kind: EntryKind,
}

impl RawEntry {
    pub fn file(path: impl Into<String>) -> Self {
        RawEntry {
            path: path.into(),
            kind: EntryKind::File,
        }
    }

    pub fn directory(path: impl Into<String>) -> Self {
        RawEntry {
            path: path.into(),
            kind: EntryKind::Directory,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Transport, HTTP status or decoding failure. Retrying the whole
    /// operation may succeed.
    #[error("failed to fetch from repository: {0}")]
    Fetch(String),

    /// The requested sheet does not exist (any more).
    #[error("cheatsheet '{0}' not found")]
    NotFound(SheetId),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("favorites storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted record exists but cannot be decoded.
    #[error("favorites record is corrupt: {0}")]
    Corrupt(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Read-only access to a cheatsheet repository.
///
/// Implementations must not retry or coalesce requests; every call is one
/// independent fetch.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Repository: Send + Sync {
    /// List every entry of the repository, in the source's natural order.
    async fn list_entries(&self) -> Result<Vec<RawEntry>, RepositoryError>;

    /// Fetch the raw markdown of one sheet.
    async fn fetch_body(&self, id: &SheetId) -> Result<String, RepositoryError>;

    /// Browsable URL of a sheet. Pure string transform, no I/O.
    fn url_for(&self, id: &SheetId) -> String;
}

#[async_trait]
impl<T: Repository + ?Sized> Repository for Box<T> {
    async fn list_entries(&self) -> Result<Vec<RawEntry>, RepositoryError> {
        (**self).list_entries().await
    }

    async fn fetch_body(&self, id: &SheetId) -> Result<String, RepositoryError> {
        (**self).fetch_body(id).await
    }

    fn url_for(&self, id: &SheetId) -> String {
        (**self).url_for(id)
    }
}

/// Durable storage of the favorites record.
///
/// Each call reads or writes the whole record. Serialising concurrent
/// writers is the storage's job; the store above it does no locking.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait FavoritesStorage: Send + Sync {
    /// Load the persisted favorites in stored order; empty when nothing was saved yet.
    async fn load(&self) -> Result<Vec<SheetId>, StoreError>;

    /// Replace the persisted favorites.
    async fn save(&self, favorites: Vec<SheetId>) -> Result<(), StoreError>;
}
