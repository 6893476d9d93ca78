//! Cheatsheet sources.
//!
//! [`GithubRepository`] talks to the GitHub API (listing) and
//! raw.githubusercontent.com (bodies). [`DirectoryRepository`] reads a local
//! checkout with the same layout, which is handy for offline use and tests.
//! Both build browsable URLs the same way, see [`sheet_url`].

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::config::RepositoryConfig;
use crate::contract::{EntryKind, RawEntry, Repository, RepositoryError, SheetId};

const USER_AGENT: &str = concat!("cheatsheets/", env!("CARGO_PKG_VERSION"));

/// `{site_url}/{id}`, ignoring trailing slashes on the site URL.
pub fn sheet_url(site_url: &str, id: &SheetId) -> String {
    format!("{}/{}", site_url.trim_end_matches('/'), id)
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    tree: Vec<TreeItem>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct TreeItem {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

impl From<TreeItem> for RawEntry {
    fn from(item: TreeItem) -> Self {
        let kind = match item.kind.as_str() {
            "blob" => EntryKind::File,
            "tree" => EntryKind::Directory,
            _ => EntryKind::Other,
        };
        RawEntry {
            path: item.path,
            kind,
        }
    }
}

pub struct GithubRepository {
    client: Client,
    config: RepositoryConfig,
    token: Option<String>,
}

impl GithubRepository {
    pub fn new(config: RepositoryConfig, token: Option<String>) -> Result<Self, RepositoryError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                error!(error = ?e, "Failed to build HTTP client");
                RepositoryError::Fetch(format!("failed to build HTTP client: {e}"))
            })?;
        info!(
            owner = %config.owner,
            repo = %config.repo,
            branch = %config.branch,
            token_set = token.is_some(),
            "Initialized GitHub repository client"
        );
        Ok(Self {
            client,
            config,
            token,
        })
    }

    pub fn tree_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/git/trees/{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.owner,
            self.config.repo,
            self.config.branch
        )
    }

    pub fn raw_url(&self, id: &SheetId) -> String {
        format!(
            "{}/{}/{}/{}/{}.md",
            self.config.raw_base.trim_end_matches('/'),
            self.config.owner,
            self.config.repo,
            self.config.branch,
            id
        )
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, RepositoryError> {
        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        request.send().await.map_err(|e| {
            error!(error = ?e, url = %url, "HTTP request failed");
            RepositoryError::Fetch(format!("GET {url}: {e}"))
        })
    }
}

#[async_trait::async_trait]
impl Repository for GithubRepository {
    async fn list_entries(&self) -> Result<Vec<RawEntry>, RepositoryError> {
        let url = self.tree_url();
        info!(url = %url, "Fetching repository tree");
        let response = self.get(&url).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<Failed to decode response body>"));
            error!(status = %status, url = %url, "GitHub API returned error. Response body: {body}");
            return Err(RepositoryError::Fetch(format!("GET {url}: HTTP {status}")));
        }

        let tree: TreeResponse = response.json().await.map_err(|e| {
            error!(error = ?e, url = %url, "Failed to decode repository tree");
            RepositoryError::Fetch(format!("invalid tree response from {url}: {e}"))
        })?;
        if tree.truncated {
            warn!(url = %url, "GitHub truncated the repository tree, listing may be incomplete");
        }

        let entries: Vec<RawEntry> = tree.tree.into_iter().map(RawEntry::from).collect();
        info!(count = entries.len(), "Fetched repository tree");
        Ok(entries)
    }

    async fn fetch_body(&self, id: &SheetId) -> Result<String, RepositoryError> {
        let url = self.raw_url(id);
        info!(sheet = %id, url = %url, "Fetching cheatsheet body");
        let response = self.get(&url).await?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                warn!(sheet = %id, url = %url, "Cheatsheet not found");
                Err(RepositoryError::NotFound(id.clone()))
            }
            status if !status.is_success() => {
                error!(sheet = %id, status = %status, url = %url, "Failed to fetch cheatsheet");
                Err(RepositoryError::Fetch(format!("GET {url}: HTTP {status}")))
            }
            _ => {
                let body = response.text().await.map_err(|e| {
                    error!(error = ?e, url = %url, "Failed to read cheatsheet body");
                    RepositoryError::Fetch(format!("GET {url}: {e}"))
                })?;
                debug!(sheet = %id, size = body.len(), "Fetched cheatsheet body");
                Ok(body)
            }
        }
    }

    fn url_for(&self, id: &SheetId) -> String {
        sheet_url(&self.config.site_url, id)
    }
}

/// A local checkout of a cheatsheet repository.
pub struct DirectoryRepository {
    root: PathBuf,
    site_url: String,
}

impl DirectoryRepository {
    pub fn new(root: impl Into<PathBuf>, site_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            site_url: site_url.into(),
        }
    }

    /// Walk `root` depth-first, sorted by name, skipping `.git`.
    fn walk(root: &Path) -> std::io::Result<Vec<RawEntry>> {
        fn visit_dir(dir: &Path, root: &Path, results: &mut Vec<RawEntry>) -> std::io::Result<()> {
            let mut children = std::fs::read_dir(dir)?
                .map(|entry| entry.map(|e| e.path()))
                .collect::<std::io::Result<Vec<_>>>()?;
            children.sort();
            for path in children {
                let Ok(rel_path) = path.strip_prefix(root) else {
                    continue;
                };
                let rel = rel_path
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/");
                if path.is_dir() {
                    if path.file_name().is_some_and(|name| name == ".git") {
                        debug!(path = %path.display(), "Skipping directory");
                        continue;
                    }
                    results.push(RawEntry::directory(rel));
                    visit_dir(&path, root, results)?;
                } else if path.is_file() {
                    results.push(RawEntry::file(rel));
                } else {
                    results.push(RawEntry {
                        path: rel,
                        kind: EntryKind::Other,
                    });
                }
            }
            Ok(())
        }

        let mut results = Vec::new();
        visit_dir(root, root, &mut results)?;
        Ok(results)
    }
}

#[async_trait::async_trait]
impl Repository for DirectoryRepository {
    async fn list_entries(&self) -> Result<Vec<RawEntry>, RepositoryError> {
        info!(root = %self.root.display(), "Listing local repository");
        let root = self.root.clone();
        let entries = tokio::task::spawn_blocking(move || Self::walk(&root))
            .await
            .map_err(|e| RepositoryError::Fetch(format!("directory walk aborted: {e}")))?
            .map_err(|e| {
                error!(error = ?e, root = %self.root.display(), "Failed to list local repository");
                RepositoryError::Fetch(format!("{}: {e}", self.root.display()))
            })?;
        info!(count = entries.len(), "Listed local repository");
        Ok(entries)
    }

    async fn fetch_body(&self, id: &SheetId) -> Result<String, RepositoryError> {
        let path = self.root.join(format!("{id}.md"));
        debug!(sheet = %id, path = %path.display(), "Reading cheatsheet body");
        match tokio::fs::read_to_string(&path).await {
            Ok(body) => Ok(body),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(sheet = %id, path = %path.display(), "Cheatsheet not found");
                Err(RepositoryError::NotFound(id.clone()))
            }
            Err(e) => {
                error!(error = ?e, path = %path.display(), "Failed to read cheatsheet");
                Err(RepositoryError::Fetch(format!("{}: {e}", path.display())))
            }
        }
    }

    fn url_for(&self, id: &SheetId) -> String {
        sheet_url(&self.site_url, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_items_map_to_entry_kinds() {
        let json = r#"{
            "sha": "abc",
            "tree": [
                {"path": "vim.md", "type": "blob", "mode": "100644"},
                {"path": "_layouts", "type": "tree", "mode": "040000"},
                {"path": "vendor/thing", "type": "commit", "mode": "160000"}
            ],
            "truncated": false
        }"#;
        let tree: TreeResponse = serde_json::from_str(json).unwrap();
        let entries: Vec<RawEntry> = tree.tree.into_iter().map(RawEntry::from).collect();
        assert_eq!(
            entries,
            vec![
                RawEntry::file("vim.md"),
                RawEntry::directory("_layouts"),
                RawEntry {
                    path: "vendor/thing".into(),
                    kind: EntryKind::Other
                },
            ]
        );
    }

    #[test]
    fn github_urls_follow_config() {
        let repo = GithubRepository::new(RepositoryConfig::default(), None).unwrap();
        let id = SheetId::new("vim").unwrap();
        assert_eq!(
            repo.tree_url(),
            "https://api.github.com/repos/rstacruz/cheatsheets/git/trees/master"
        );
        assert_eq!(
            repo.raw_url(&id),
            "https://raw.githubusercontent.com/rstacruz/cheatsheets/master/vim.md"
        );
        assert_eq!(repo.url_for(&id), "https://devhints.io/vim");
    }

    #[test]
    fn sheet_url_trims_trailing_slashes() {
        let id = SheetId::new("bash").unwrap();
        assert_eq!(sheet_url("https://devhints.io/", &id), "https://devhints.io/bash");
        assert_eq!(sheet_url("https://devhints.io", &id), "https://devhints.io/bash");
    }
}
