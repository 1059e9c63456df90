use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::models::DependencyRecord;

/// Intermediate listing filenames, in ecosystem order. The combined list keeps
/// this order (then overrides) for audit readability; the license store's
/// write-once semantics make it the conflict tiebreaker too.
pub const INTERMEDIATE_FILES: &[&str] = &[
    "cargo_licenses.json",
    "conda_licenses.json",
    "python_licenses.json",
];

/// Merge all available per-ecosystem listings with the manual override table.
///
/// A missing listing file means that ecosystem contributed nothing this run;
/// it is not an error. Excluded names are dropped from collector output, but
/// override entries bypass the filter: they exist precisely to attribute
/// packages the collectors cannot discover or must otherwise exclude.
pub fn aggregate(data_dir: &Path, config: &Config) -> Result<Vec<DependencyRecord>> {
    let exclude: HashSet<&str> = config.exclude.iter().map(String::as_str).collect();
    let mut combined = Vec::new();

    for file in INTERMEDIATE_FILES {
        let path = data_dir.join(file);
        if !path.exists() {
            continue;
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let entries: Vec<DependencyRecord> = serde_json::from_str(&content)
            .with_context(|| format!("{} is not a valid dependency listing", file))?;
        combined.extend(
            entries
                .into_iter()
                .filter(|e| !exclude.contains(e.name.as_str())),
        );
    }

    combined.extend(config.overrides.iter().cloned());
    Ok(combined)
}
