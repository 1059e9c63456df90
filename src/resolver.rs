use anyhow::Result;
use colored::Colorize;
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};

use crate::models::{DependencyRecord, LicenseMode};
use crate::registry::github::{self, FetchedLicense};
use crate::store::LicenseStore;

/// Body placeholder for link-mode entries that carry no URL.
pub const LINK_PLACEHOLDER: &str = "(no URL provided)";

/// Reference line written as the whole document body for link-mode entries.
pub fn link_document_text(license_source: Option<&str>) -> String {
    format!("See license: {}", license_source.unwrap_or(LINK_PLACEHOLDER))
}

/// What one entry's resolution produced.
enum Outcome {
    /// Link mode: the synthesized reference line. Has no failure path.
    Linked(String),
    /// Fetch/copy mode: the API answered with a decoded license.
    Fetched(FetchedLicense),
    /// Fetch/copy mode: unresolvable URL or a failed request; the entry is
    /// not persisted this run and any prior document stays authoritative.
    Unresolved(String),
}

/// Resolves license texts for combined entries, in bounded concurrent batches.
pub struct Resolver {
    client: reqwest::Client,
    token: Option<String>,
    batch_size: usize,
    quiet: bool,
}

impl Resolver {
    pub fn new(token: Option<String>, batch_size: usize, quiet: bool) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            token,
            batch_size: batch_size.max(1),
            quiet,
        })
    }

    /// Resolve every entry and persist the successful ones into `store`.
    ///
    /// Returns the combined manifest: the same entries, with `license` and
    /// `license_source` rewritten wherever the API answered. Per-entry
    /// failures warn and continue; this stage never aborts the run.
    pub async fn resolve_all(
        &self,
        mut entries: Vec<DependencyRecord>,
        store: &LicenseStore,
    ) -> Result<Vec<DependencyRecord>> {
        let pb = if !self.quiet {
            let pb = ProgressBar::new(entries.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template(
                        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                    )?
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        for batch in entries.chunks_mut(self.batch_size) {
            let futures: Vec<_> = batch
                .iter()
                .map(|entry| {
                    let client = self.client.clone();
                    let token = self.token.clone();
                    let mode = entry.license_mode;
                    let repository = entry.repository.clone();
                    let source = entry.license_source.clone();
                    async move {
                        match mode {
                            LicenseMode::Link => Outcome::Linked(link_document_text(source.as_deref())),
                            LicenseMode::Fetch | LicenseMode::Copy => {
                                match github::fetch_license(&client, &repository, token.as_deref())
                                    .await
                                {
                                    Ok(Some(found)) => Outcome::Fetched(found),
                                    Ok(None) => Outcome::Unresolved(format!(
                                        "repository {:?} does not resolve to a GitHub owner/repo",
                                        repository
                                    )),
                                    Err(e) => Outcome::Unresolved(format!("{:#}", e)),
                                }
                            }
                        }
                    }
                })
                .collect();

            let outcomes = join_all(futures).await;

            // Store writes stay on the driver task; the exclusive-create in
            // LicenseStore::save makes same-key races a no-op regardless.
            for (entry, outcome) in batch.iter_mut().zip(outcomes) {
                match outcome {
                    Outcome::Linked(text) => {
                        if entry.license_source.is_none() {
                            entry.license_source = Some(LINK_PLACEHOLDER.to_string());
                        }
                        store.save(entry, &text)?;
                    }
                    Outcome::Fetched(found) => {
                        entry.license = found.spdx_id;
                        entry.license_source = Some(found.html_url);
                        store.save(entry, &found.text)?;
                    }
                    Outcome::Unresolved(detail) => {
                        eprintln!(
                            "{} could not resolve a license for {} ({}): {}",
                            "warning:".yellow().bold(),
                            entry.name,
                            entry.license_mode,
                            detail
                        );
                    }
                }
                if let Some(pb) = &pb {
                    pb.inc(1);
                }
            }
        }

        if let Some(pb) = pb {
            pb.finish_with_message("Done");
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link_entry(name: &str, source: Option<&str>) -> DependencyRecord {
        DependencyRecord {
            name: name.to_string(),
            version: "latest".to_string(),
            authors: String::new(),
            repository: String::new(),
            license: "UNKNOWN".to_string(),
            license_file: None,
            description: String::new(),
            license_mode: LicenseMode::Link,
            license_source: source.map(str::to_string),
        }
    }

    #[test]
    fn test_link_body_is_exactly_the_reference_line() {
        assert_eq!(
            link_document_text(Some("https://docs.nvidia.com/cuquantum/license.html")),
            "See license: https://docs.nvidia.com/cuquantum/license.html"
        );
        assert_eq!(link_document_text(None), "See license: (no URL provided)");
    }

    // Link-mode entries never contact the network, so resolving them works
    // offline end to end.
    #[tokio::test]
    async fn test_link_entries_resolve_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let store = LicenseStore::new(dir.path()).unwrap();
        let resolver = Resolver::new(None, 4, true).unwrap();

        let manifest = resolver
            .resolve_all(vec![link_entry("custatevec", None)], &store)
            .await
            .unwrap();

        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest[0].license_source.as_deref(), Some(LINK_PLACEHOLDER));

        let doc = std::fs::read_to_string(
            dir.path().join("custatevec-latest_unknown_repo.txt"),
        )
        .unwrap();
        let body = doc.split_once("\n\n").unwrap().1;
        assert_eq!(body, "See license: (no URL provided)");
    }

    #[tokio::test]
    async fn test_link_entry_keeps_its_own_source_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = LicenseStore::new(dir.path()).unwrap();
        let resolver = Resolver::new(None, 4, true).unwrap();

        let url = "https://docs.nvidia.com/cuda/cuquantum/latest/license.html";
        let manifest = resolver
            .resolve_all(vec![link_entry("custatevec", Some(url))], &store)
            .await
            .unwrap();

        assert_eq!(manifest[0].license_source.as_deref(), Some(url));
        let doc = std::fs::read_to_string(
            dir.path().join("custatevec-latest_unknown_repo.txt"),
        )
        .unwrap();
        assert!(doc.ends_with(&format!("See license: {}", url)));
    }
}
