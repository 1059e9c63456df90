//! `license-fetchr` — collect direct-dependency metadata across package
//! ecosystems, resolve license texts from GitHub, and build one report.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]).
//! 2. Load the exclusion set and manual overrides ([`config::load_config`]).
//! 3. Run the ecosystem collectors ([`collector`]) sequentially; any failing
//!    external command aborts the run with a diagnostic.
//! 4. Merge intermediate listings with the override table ([`aggregator`]).
//! 5. Resolve license texts per entry ([`resolver`], [`registry`]) into the
//!    write-once store ([`store`]); per-entry failures warn and continue.
//! 6. Snapshot the combined manifest, then rebuild the report ([`report`]).
//! 7. Exit `0` once the merge stage is reached, even if entries were skipped;
//!    the manifest/document counts in the summary make gaps auditable.

mod aggregator;
mod cli;
mod collector;
mod config;
mod models;
mod registry;
mod report;
mod resolver;
mod store;

use std::collections::HashSet;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use cli::{Cli, EcosystemArg};
use collector::cargo::CargoCollector;
use collector::conda::CondaCollector;
use collector::python::PythonCollector;
use collector::Collector;
use config::load_config;
use resolver::Resolver;
use store::LicenseStore;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Resolve project path
    let path = cli
        .path
        .canonicalize()
        .unwrap_or_else(|_| cli.path.clone());

    let config = load_config(&path, cli.config.as_deref())?;
    let exclude: HashSet<String> = config.exclude.iter().cloned().collect();

    let store = LicenseStore::new(&cli.licenses_dir)?;
    let data_dir =
        tempfile::tempdir().context("failed to create intermediate data directory")?;

    let mut collectors: Vec<Box<dyn Collector>> = Vec::new();
    if !cli.skip_ecosystem.contains(&EcosystemArg::Cargo) {
        collectors.push(Box::new(CargoCollector::new(&path)));
    }
    if !cli.skip_ecosystem.contains(&EcosystemArg::Conda) {
        collectors.push(Box::new(CondaCollector::new(&path, exclude.clone())));
    }
    if !cli.skip_ecosystem.contains(&EcosystemArg::Python) {
        collectors.push(Box::new(PythonCollector::new(&path, exclude.clone())));
    }

    // Collectors run sequentially; a failing listing command is fatal and the
    // aggregator is never reached.
    for collector in &collectors {
        let records = match collector.collect() {
            Ok(records) => records,
            Err(e) => {
                eprintln!(
                    "{} {} collector failed: {:#}",
                    "error:".red().bold(),
                    collector.name(),
                    e
                );
                std::process::exit(1);
            }
        };

        if !cli.quiet {
            eprintln!(
                "  {} {} {} direct dependencies",
                "→".cyan(),
                collector.name(),
                records.len()
            );
        }

        let listing = data_dir
            .path()
            .join(format!("{}_licenses.json", collector.name()));
        std::fs::write(&listing, serde_json::to_string_pretty(&records)?)
            .with_context(|| format!("failed to write {}", listing.display()))?;
    }

    let combined = aggregator::aggregate(data_dir.path(), &config)?;
    if !cli.quiet {
        eprintln!("  {} {} combined entries", "→".cyan(), combined.len());
    }

    let token = cli.token.clone().or_else(|| std::env::var("GITHUB_TOKEN").ok());
    let resolver = Resolver::new(token, cli.jobs, cli.quiet)?;
    let manifest = resolver.resolve_all(combined, &store).await?;

    std::fs::write(&cli.manifest, serde_json::to_string_pretty(&manifest)?)
        .with_context(|| format!("failed to write {}", cli.manifest.display()))?;

    let merged = report::merge(store.dir(), &cli.output)?;

    println!(
        "{} {} manifest entries, {} license documents merged into {}",
        "✓".green().bold(),
        manifest.len(),
        merged,
        cli.output.display()
    );

    Ok(())
}
