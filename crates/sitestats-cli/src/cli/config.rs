use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sitestats_core::StatsConfig;
use tracing::debug;

/// `<config dir>/sitestats/config.json`, when the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sitestats").join("config.json"))
}

/// Load config from a JSON file
pub fn load(path: &Path) -> Result<StatsConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config = from_json(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(config)
}

pub fn from_json(json: &str) -> Result<StatsConfig> {
    serde_json::from_str(json).context("Failed to deserialize config")
}

/// An explicit path must exist. Without one, the default location is used
/// if present, else built-in defaults.
pub fn resolve(explicit: Option<&Path>) -> Result<StatsConfig> {
    if let Some(path) = explicit {
        return load(path);
    }

    match default_config_path() {
        Some(path) if path.exists() => load(&path),
        _ => {
            debug!("No config file found, using defaults");
            Ok(StatsConfig::default())
        }
    }
}
