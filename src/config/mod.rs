pub mod init;
mod schema;
mod validation;

pub use schema::{ColumnConfig, Config, Settings};
pub use validation::validate_config;

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Get the config directory path (~/.config/author-credit/)
pub fn get_config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("author-credit"))
}

/// Get the default config file path (~/.config/author-credit/config.yaml)
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.yaml"))
}

/// Load configuration from a YAML file.
///
/// With an explicit `path` the file must exist. Without one the default
/// path is used, and a missing default file means built-in defaults.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    match path {
        Some(path) => {
            if !path.exists() {
                bail!("Config file not found at {}", path.display());
            }
            read_config(&path)
        }
        None => {
            // No home directory behaves like a missing default file.
            let Ok(path) = get_config_path() else {
                return Ok(Config::default());
            };
            if !path.exists() {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Config::default());
            }
            read_config(&path)
        }
    }
}

fn read_config(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;

    let config: Config = serde_saphyr::from_str(&content)
        .with_context(|| format!("Failed to parse config: invalid YAML in {}", path.display()))?;

    debug!(path = %path.display(), "loaded config");
    Ok(config)
}
