use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

pub const DEFAULT_OWNER: &str = "rstacruz";
pub const DEFAULT_REPO: &str = "cheatsheets";
pub const DEFAULT_BRANCH: &str = "master";
pub const DEFAULT_SITE_URL: &str = "https://devhints.io";
pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_RAW_BASE: &str = "https://raw.githubusercontent.com";

/// Directory under the platform data dir that holds this tool's files.
pub const APP_DIR: &str = "cheatsheets";
const FAVORITES_FILE: &str = "favorites.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub repository: RepositoryConfig,
    pub favorites: FavoritesConfig,
}

impl Config {
    pub fn trace_loaded(&self) {
        self.repository.trace_loaded();
        info!(
            favorites_path = %self.favorites.resolved_path().display(),
            "Loaded favorites config"
        );
        debug!(?self, "Config loaded (full debug)");
    }
}

/// Where cheatsheets come from and where they are published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    pub owner: String,
    pub repo: String,
    /// Branch, tag, or commit.
    pub branch: String,
    /// Public site serving rendered sheets, used for browsable URLs.
    pub site_url: String,
    pub api_base: String,
    pub raw_base: String,
    /// Read from a local checkout instead of the network.
    pub local_dir: Option<PathBuf>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            owner: DEFAULT_OWNER.to_string(),
            repo: DEFAULT_REPO.to_string(),
            branch: DEFAULT_BRANCH.to_string(),
            site_url: DEFAULT_SITE_URL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            raw_base: DEFAULT_RAW_BASE.to_string(),
            local_dir: None,
        }
    }
}

impl RepositoryConfig {
    pub fn trace_loaded(&self) {
        match &self.local_dir {
            Some(dir) => info!(
                local_dir = %dir.display(),
                site_url = %self.site_url,
                "Loaded local repository config"
            ),
            None => info!(
                owner = %self.owner,
                repo = %self.repo,
                branch = %self.branch,
                site_url = %self.site_url,
                "Loaded GitHub repository config"
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FavoritesConfig {
    pub path: Option<PathBuf>,
}

impl FavoritesConfig {
    /// The configured path, else `<data dir>/cheatsheets/favorites.json`,
    /// else `./favorites.json` on platforms without a data dir.
    pub fn resolved_path(&self) -> PathBuf {
        if let Some(path) = &self.path {
            return path.clone();
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR).join(FAVORITES_FILE))
            .unwrap_or_else(|| PathBuf::from(FAVORITES_FILE))
    }
}
