/// `load_config` module: Loads the optional YAML config file and merges environment overrides
/// into the core [`Config`].
///
/// # Resolution order
/// 1. `--config <path>` flag
/// 2. `CHEATSHEETS_CONFIG` environment variable
/// 3. built-in defaults (the public devhints repository on GitHub)
///
/// After the file is read, `CHEATSHEETS_FAVORITES` overrides the favorites path and
/// `GITHUB_TOKEN` is picked up as the (optional) API token. Secrets never live in the file.
///
/// # Errors
/// All errors use `anyhow::Error` and are surfaced at the CLI boundary.
use anyhow::Result;
use cheatsheets_core::config::Config;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

pub const CONFIG_ENV: &str = "CHEATSHEETS_CONFIG";
pub const FAVORITES_ENV: &str = "CHEATSHEETS_FAVORITES";
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub core: Config,
    pub github_token: Option<String>,
}

/// Pick the config file path from the explicit flag or the environment.
pub fn resolve_config_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    explicit.or_else(|| {
        std::env::var(CONFIG_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
    })
}

/// Load the config for a CLI invocation: file (if any), then environment overrides.
pub fn resolve_config(explicit: Option<PathBuf>) -> Result<CliConfig> {
    let mut core = match resolve_config_path(explicit) {
        Some(path) => load_config(path)?,
        None => {
            info!("No config file given, using defaults");
            Config::default()
        }
    };

    if let Some(path) = non_empty_env(FAVORITES_ENV) {
        info!(favorites_path = %path, "Favorites path overridden from env");
        core.favorites.path = Some(PathBuf::from(path));
    }

    let github_token = non_empty_env(TOKEN_ENV);
    if github_token.is_some() {
        info!("GITHUB_TOKEN found in env");
    }

    core.trace_loaded();
    Ok(CliConfig { core, github_token })
}

/// Parse one YAML config file. Missing keys fall back to defaults; an empty file is
/// the same as no file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    if config_content.trim().is_empty() {
        return Ok(Config::default());
    }

    match serde_yaml::from_str::<Config>(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            Ok(conf)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
