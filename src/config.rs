use std::path::Path;

use anyhow::Result;
use serde::Deserialize;

use crate::models::DependencyRecord;

/// Root configuration structure, deserialized from `.license-fetchr/config.toml`.
///
/// Loaded once at process start and passed explicitly into the aggregator and
/// resolver; there is no ambient global table.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Package names dropped from every collector listing.
    ///
    /// Typically the host project itself plus packages attributed through the
    /// override table instead.
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Hand-maintained entries for dependencies no collector can discover
    /// (installer tooling, vendor SDKs under non-standard licensing).
    ///
    /// Overrides are exempt from `exclude`, which is how an excluded package
    /// still receives attribution.
    #[serde(default, rename = "override")]
    pub overrides: Vec<DependencyRecord>,
}

/// Load the configuration, searching in order:
///
/// 1. `config_override` — path passed via `--config`
/// 2. `<project_path>/.license-fetchr/config.toml`
/// 3. `~/.config/license-fetchr/config.toml`
/// 4. Empty [`Config::default`] (no exclusions, no overrides)
pub fn load_config(project_path: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        let content = std::fs::read_to_string(path)?;
        return Ok(toml::from_str(&content)?);
    }

    let project_config = project_path.join(".license-fetchr").join("config.toml");
    if project_config.exists() {
        let content = std::fs::read_to_string(&project_config)?;
        return Ok(toml::from_str(&content)?);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home
            .join(".config")
            .join("license-fetchr")
            .join("config.toml");
        if home_config.exists() {
            let content = std::fs::read_to_string(&home_config)?;
            return Ok(toml::from_str(&content)?);
        }
    }

    Ok(Config::default())
}
