use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One discovered or manually declared dependency.
///
/// Collector output, override-table entries, and resolved manifest entries all
/// share this shape; `license_mode` defaults to [`LicenseMode::Fetch`], which
/// is what plain discovered records use. After resolution, `license` and
/// `license_source` may have been rewritten from the GitHub API's answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyRecord {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub authors: String,
    /// Repository URL; may be empty or point at a host we cannot resolve.
    #[serde(default)]
    pub repository: String,
    #[serde(default = "unknown_license")]
    pub license: String,
    /// Pre-supplied license file path, when an ecosystem provides one.
    #[serde(default)]
    pub license_file: Option<PathBuf>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub license_mode: LicenseMode,
    /// URL of the license text; rewritten by the resolver on success.
    #[serde(default)]
    pub license_source: Option<String>,
}

fn default_version() -> String {
    "latest".to_string()
}

fn unknown_license() -> String {
    "UNKNOWN".to_string()
}

/// Strategy used to obtain a dependency's license text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseMode {
    /// Remote lookup of a discovered entry (the default).
    #[default]
    Fetch,
    /// No lookup; the document body is a single reference line.
    Link,
    /// Remote lookup of a declared override entry; same wire path as `Fetch`.
    Copy,
}

impl std::fmt::Display for LicenseMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LicenseMode::Fetch => write!(f, "fetch"),
            LicenseMode::Link => write!(f, "link"),
            LicenseMode::Copy => write!(f, "copy"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_defaults_to_fetch() {
        let record: DependencyRecord =
            serde_json::from_str(r#"{"name": "serde", "version": "1.0.150"}"#).unwrap();
        assert_eq!(record.license_mode, LicenseMode::Fetch);
        assert_eq!(record.license, "UNKNOWN");
        assert!(record.license_source.is_none());
    }

    #[test]
    fn test_mode_parses_lowercase_tags() {
        let record: DependencyRecord =
            serde_json::from_str(r#"{"name": "uv", "license_mode": "copy"}"#).unwrap();
        assert_eq!(record.license_mode, LicenseMode::Copy);
        // Override entries without a pinned version get the "latest" marker
        assert_eq!(record.version, "latest");

        let record: DependencyRecord =
            serde_json::from_str(r#"{"name": "custatevec", "license_mode": "link"}"#).unwrap();
        assert_eq!(record.license_mode, LicenseMode::Link);
    }

    // Display matches the wire tags; warnings print the mode this way.
    #[test]
    fn test_mode_display_matches_serde_tags() {
        assert_eq!(LicenseMode::Fetch.to_string(), "fetch");
        assert_eq!(LicenseMode::Link.to_string(), "link");
        assert_eq!(LicenseMode::Copy.to_string(), "copy");
    }
}
