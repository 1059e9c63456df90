use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::models::{DependencyRecord, LicenseMode};

/// Collector for the Cargo ecosystem.
///
/// `cargo license --json` yields the full license inventory (direct and
/// transitive); `cargo metadata --no-deps` yields the workspace's declared
/// dependency edges. The output is the inventory restricted to direct,
/// normal-kind dependency names.
pub struct CargoCollector {
    project: PathBuf,
}

impl CargoCollector {
    pub fn new(project: &Path) -> Self {
        Self {
            project: project.to_path_buf(),
        }
    }
}

impl super::Collector for CargoCollector {
    fn name(&self) -> &'static str {
        "cargo"
    }

    fn collect(&self) -> Result<Vec<DependencyRecord>> {
        let inventory = super::run_command("cargo", &["license", "--json"], &self.project)?;
        let metadata = super::run_command(
            "cargo",
            &["metadata", "--format-version", "1", "--no-deps"],
            &self.project,
        )?;

        let direct = direct_dependency_names(&metadata)?;
        filter_inventory(&inventory, &direct)
    }
}

/// One entry of `cargo license --json` output.
#[derive(Debug, Deserialize)]
struct InventoryEntry {
    name: String,
    version: String,
    #[serde(default)]
    authors: Option<String>,
    #[serde(default)]
    repository: Option<String>,
    #[serde(default)]
    license: Option<String>,
    #[serde(default)]
    license_file: Option<PathBuf>,
    #[serde(default)]
    description: Option<String>,
}

/// Names of direct, normal-kind dependencies from `cargo metadata` output.
///
/// `kind: null` marks a normal dependency; `dev` and `build` edges are not
/// shipped and are not attributed.
fn direct_dependency_names(metadata_json: &str) -> Result<HashSet<String>> {
    let value: serde_json::Value =
        serde_json::from_str(metadata_json).context("cargo metadata output is not valid JSON")?;

    let mut names = HashSet::new();
    if let Some(packages) = value.get("packages").and_then(|p| p.as_array()) {
        for package in packages {
            let Some(deps) = package.get("dependencies").and_then(|d| d.as_array()) else {
                continue;
            };
            for dep in deps {
                let kind = dep.get("kind").and_then(|k| k.as_str());
                if kind.is_some() && kind != Some("normal") {
                    continue;
                }
                if let Some(name) = dep.get("name").and_then(|n| n.as_str()) {
                    names.insert(name.to_string());
                }
            }
        }
    }
    Ok(names)
}

/// Restrict the full license inventory to the direct dependency set.
fn filter_inventory(
    inventory_json: &str,
    direct: &HashSet<String>,
) -> Result<Vec<DependencyRecord>> {
    let entries: Vec<InventoryEntry> =
        serde_json::from_str(inventory_json).context("cargo license output is not valid JSON")?;

    Ok(entries
        .into_iter()
        .filter(|e| direct.contains(&e.name))
        .map(|e| DependencyRecord {
            name: e.name,
            version: e.version,
            authors: e.authors.unwrap_or_default(),
            repository: e.repository.unwrap_or_default(),
            license: e.license.unwrap_or_else(|| "UNKNOWN".to_string()),
            license_file: e.license_file,
            description: e.description.unwrap_or_default(),
            license_mode: LicenseMode::Fetch,
            license_source: None,
        })
        .collect())
}
