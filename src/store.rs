use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::models::DependencyRecord;
use crate::registry::github;

/// Write-once, file-backed cache of resolved license documents.
///
/// Each entry maps to one deterministic filename key, so re-runs (and
/// parallel writers racing on the same key) leave previously resolved
/// documents untouched.
pub struct LicenseStore {
    dir: PathBuf,
}

impl LicenseStore {
    pub fn new(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create license directory {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist one license document. Returns `false` when the key already
    /// exists; the stored document is then left untouched and treated as
    /// canonical.
    pub fn save(&self, entry: &DependencyRecord, text: &str) -> Result<bool> {
        let path = self.dir.join(document_filename(entry));

        // Exclusive create keeps the write-once invariant race-free under
        // parallel resolution; there is no check-then-write window.
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to create {}", path.display()))
            }
        };

        write!(
            file,
            "{} v{}\nAuthor: {}\nRepository: {}\nLicense: {}\nSource: {}\n\n{}",
            entry.name,
            entry.version,
            entry.authors,
            entry.repository,
            entry.license,
            entry.license_source.as_deref().unwrap_or(""),
            text
        )
        .with_context(|| format!("failed to write {}", path.display()))?;

        Ok(true)
    }
}

/// Deterministic filename key: `{name}-{version}_{owner_repo}.txt`, with the
/// `unknown_repo` sentinel when the repository URL is unresolvable.
pub fn document_filename(entry: &DependencyRecord) -> String {
    let repo_key = github::extract_repo_path(&entry.repository)
        .map(|p| p.replace('/', "_"))
        .unwrap_or_else(|| "unknown_repo".to_string());
    format!("{}-{}_{}.txt", entry.name, entry.version, repo_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LicenseMode;

    fn entry(name: &str, version: &str, repository: &str) -> DependencyRecord {
        DependencyRecord {
            name: name.to_string(),
            version: version.to_string(),
            authors: "Astral".to_string(),
            repository: repository.to_string(),
            license: "MIT".to_string(),
            license_file: None,
            description: String::new(),
            license_mode: LicenseMode::Copy,
            license_source: Some("https://github.com/astral-sh/uv/blob/main/LICENSE".to_string()),
        }
    }

    #[test]
    fn test_filename_key_is_deterministic() {
        let e = entry("uv", "latest", "https://github.com/astral-sh/uv");
        assert_eq!(document_filename(&e), "uv-latest_astral-sh_uv.txt");

        let e = entry("custatevec", "1.4.0", "https://developer.nvidia.com/cuquantum-sdk");
        assert_eq!(document_filename(&e), "custatevec-1.4.0_unknown_repo.txt");
    }

    #[test]
    fn test_document_header_then_body() {
        let dir = tempfile::tempdir().unwrap();
        let store = LicenseStore::new(dir.path()).unwrap();
        let e = entry("uv", "latest", "https://github.com/astral-sh/uv");

        assert!(store.save(&e, "MIT License\n\nPermission...").unwrap());

        let content =
            std::fs::read_to_string(dir.path().join("uv-latest_astral-sh_uv.txt")).unwrap();
        assert!(content.starts_with("uv vlatest\n"));
        assert!(content.contains("Author: Astral\n"));
        assert!(content.contains("License: MIT\n"));
        assert!(content.contains("\n\nMIT License"));
    }

    #[test]
    fn test_second_save_is_an_idempotent_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let store = LicenseStore::new(dir.path()).unwrap();
        let e = entry("uv", "latest", "https://github.com/astral-sh/uv");

        assert!(store.save(&e, "first text").unwrap());
        let first = std::fs::read(dir.path().join("uv-latest_astral-sh_uv.txt")).unwrap();

        assert!(!store.save(&e, "second text").unwrap());
        let second = std::fs::read(dir.path().join("uv-latest_astral-sh_uv.txt")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_distinct_keys_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let store = LicenseStore::new(dir.path()).unwrap();

        assert!(store
            .save(&entry("uv", "latest", "https://github.com/astral-sh/uv"), "x")
            .unwrap());
        assert!(store
            .save(&entry("uv", "0.4.0", "https://github.com/astral-sh/uv"), "y")
            .unwrap());

        assert!(dir.path().join("uv-latest_astral-sh_uv.txt").exists());
        assert!(dir.path().join("uv-0.4.0_astral-sh_uv.txt").exists());
    }
}
