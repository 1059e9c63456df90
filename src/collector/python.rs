use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;

use crate::models::{DependencyRecord, LicenseMode};

/// Collector for the Python ecosystem.
///
/// Direct dependencies come from `pyproject.toml` `[project].dependencies`;
/// names are lower-cased and stripped of version specifiers for matching.
/// Installed-distribution metadata comes from `pip inspect`, and only
/// distributions whose normalized name matches a declared direct dependency
/// (and is not excluded) are emitted.
pub struct PythonCollector {
    project: PathBuf,
    exclude: HashSet<String>,
}

impl PythonCollector {
    pub fn new(project: &Path, exclude: HashSet<String>) -> Self {
        Self {
            project: project.to_path_buf(),
            exclude,
        }
    }
}

impl super::Collector for PythonCollector {
    fn name(&self) -> &'static str {
        "python"
    }

    fn collect(&self) -> Result<Vec<DependencyRecord>> {
        let manifest_path = self.project.join("pyproject.toml");
        let manifest = std::fs::read_to_string(&manifest_path)
            .with_context(|| format!("failed to read {}", manifest_path.display()))?;
        let direct = declared_names(&manifest)?;

        let inspect = super::run_command("pip", &["inspect"], &self.project)?;
        installed_matches(&inspect, &direct, &self.exclude)
    }
}

#[derive(Debug, Deserialize)]
struct Pyproject {
    project: Option<PyprojectProject>,
}

#[derive(Debug, Deserialize)]
struct PyprojectProject {
    #[serde(default)]
    dependencies: Vec<String>,
}

/// Declared direct dependency names, normalized for matching.
///
/// `"Requests >=2.28, <3"` → `"requests"`.
fn declared_names(pyproject_toml: &str) -> Result<HashSet<String>> {
    let pyproject: Pyproject =
        toml::from_str(pyproject_toml).context("pyproject.toml is not valid TOML")?;

    let re = Regex::new(r"^([A-Za-z0-9_\-\.]+)")?;
    let mut names = HashSet::new();

    if let Some(project) = pyproject.project {
        for dep in &project.dependencies {
            if let Some(caps) = re.captures(dep.trim()) {
                names.insert(caps[1].to_lowercase());
            }
        }
    }
    Ok(names)
}

/// Installed distributions (from `pip inspect` output) restricted to the
/// declared direct set, minus exclusions.
fn installed_matches(
    inspect_json: &str,
    direct: &HashSet<String>,
    exclude: &HashSet<String>,
) -> Result<Vec<DependencyRecord>> {
    let value: serde_json::Value =
        serde_json::from_str(inspect_json).context("pip inspect output is not valid JSON")?;

    let mut records = Vec::new();
    let Some(installed) = value.get("installed").and_then(|v| v.as_array()) else {
        return Ok(records);
    };

    for dist in installed {
        let Some(meta) = dist.get("metadata") else {
            continue;
        };
        let name = meta.get("name").and_then(|v| v.as_str()).unwrap_or("");
        let normalized = name.to_lowercase();
        if name.is_empty() || !direct.contains(&normalized) || exclude.contains(&normalized) {
            continue;
        }

        records.push(DependencyRecord {
            name: name.to_string(),
            version: meta
                .get("version")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown")
                .to_string(),
            authors: meta
                .get("author")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string(),
            repository: repository_url(meta),
            license: meta
                .get("license")
                .and_then(|v| v.as_str())
                .unwrap_or("UNKNOWN")
                .to_string(),
            license_file: None,
            description: meta
                .get("summary")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string(),
            license_mode: LicenseMode::Fetch,
            license_source: None,
        });
    }
    Ok(records)
}

/// Pick a repository URL, preferring a GitHub project URL over the generic
/// homepage. `project_url` entries have the form `"Label, https://..."`.
fn repository_url(meta: &serde_json::Value) -> String {
    if let Some(urls) = meta.get("project_url").and_then(|v| v.as_array()) {
        for entry in urls {
            if let Some(s) = entry.as_str() {
                if s.to_lowercase().contains("github.com") {
                    return s.rsplit(',').next().unwrap_or(s).trim().to_string();
                }
            }
        }
    }
    meta.get("home_page")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}
