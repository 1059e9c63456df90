use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::models::{DependencyRecord, LicenseMode};

/// Collector for the conda environment.
///
/// `conda list --json` yields everything installed, solver additions
/// included; `conda env export --from-history` yields only what the user
/// explicitly asked for. Output is the intersection, minus the global
/// exclusion set. Conda metadata carries no license or author fields, so
/// records start at `UNKNOWN` with the conda-forge feedstock as repository
/// and rely on the resolver to fill in the rest.
pub struct CondaCollector {
    project: PathBuf,
    exclude: HashSet<String>,
}

impl CondaCollector {
    pub fn new(project: &Path, exclude: HashSet<String>) -> Self {
        Self {
            project: project.to_path_buf(),
            exclude,
        }
    }
}

impl super::Collector for CondaCollector {
    fn name(&self) -> &'static str {
        "conda"
    }

    fn collect(&self) -> Result<Vec<DependencyRecord>> {
        let listing = super::run_command("conda", &["list", "--json"], &self.project)?;
        let history =
            super::run_command("conda", &["env", "export", "--from-history"], &self.project)?;
        intersect_history(&listing, &history, &self.exclude)
    }
}

#[derive(Debug, Deserialize)]
struct CondaPackage {
    name: String,
    version: String,
}

#[derive(Debug, Deserialize)]
struct CondaHistory {
    /// Entries are usually plain specs (`"numpy=1.26"`); a trailing `pip:`
    /// mapping may also appear and is ignored here.
    #[serde(default)]
    dependencies: Vec<serde_yaml::Value>,
}

/// Package names the user explicitly installed, specs stripped.
fn explicit_names(history_yaml: &str) -> Result<HashSet<String>> {
    let history: CondaHistory =
        serde_yaml::from_str(history_yaml).context("conda history export is not valid YAML")?;

    Ok(history
        .dependencies
        .iter()
        .filter_map(|v| v.as_str())
        .map(|spec| {
            spec.split(['=', '<', '>', ' '])
                .next()
                .unwrap_or(spec)
                .to_string()
        })
        .filter(|name| !name.is_empty())
        .collect())
}

/// Intersect the full install listing with the explicit history.
fn intersect_history(
    listing_json: &str,
    history_yaml: &str,
    exclude: &HashSet<String>,
) -> Result<Vec<DependencyRecord>> {
    let explicit = explicit_names(history_yaml)?;
    let full: Vec<CondaPackage> =
        serde_json::from_str(listing_json).context("conda list output is not valid JSON")?;

    Ok(full
        .into_iter()
        .filter(|p| explicit.contains(&p.name) && !exclude.contains(&p.name))
        .map(|p| DependencyRecord {
            repository: format!("https://github.com/conda-forge/{}-feedstock", p.name),
            name: p.name,
            version: p.version,
            authors: String::new(),
            license: "UNKNOWN".to_string(),
            license_file: None,
            description: String::new(),
            license_mode: LicenseMode::Fetch,
            license_source: None,
        })
        .collect())
}
