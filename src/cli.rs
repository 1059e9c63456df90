use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "license-fetchr",
    about = "Aggregate third-party dependency licenses into a consolidated report",
    version
)]
pub struct Cli {
    /// Host project path to scan
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Directory holding resolved license documents (write-once cache)
    #[arg(long, default_value = "licenses", value_name = "DIR")]
    pub licenses_dir: PathBuf,

    /// Consolidated report output path (overwritten each run)
    #[arg(long, default_value = "THIRD_PARTY_LICENSES.txt", value_name = "FILE")]
    pub output: PathBuf,

    /// Combined manifest snapshot path
    #[arg(long, default_value = "third_party_manifest.json", value_name = "FILE")]
    pub manifest: PathBuf,

    /// Config file [default: ./.license-fetchr/config.toml, fallback ~/.config/license-fetchr/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// GitHub API token; falls back to GITHUB_TOKEN. Absence only lowers rate limits
    #[arg(long, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Skip an ecosystem collector (repeatable)
    #[arg(long = "skip-ecosystem", value_name = "ECOSYSTEM")]
    pub skip_ecosystem: Vec<EcosystemArg>,

    /// Concurrent license lookups per batch
    #[arg(long, default_value_t = 8, value_name = "N")]
    pub jobs: usize,

    /// Only print the final summary line
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, PartialEq, clap::ValueEnum)]
pub enum EcosystemArg {
    Cargo,
    Conda,
    Python,
}
