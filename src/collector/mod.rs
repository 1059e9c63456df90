//! Per-ecosystem direct-dependency collectors.
//!
//! Each collector queries one ecosystem's installed/declared package set via
//! its own tooling, cross-references the full listing against the project's
//! declared direct dependencies, and normalizes the survivors into
//! [`DependencyRecord`]s. Parsing is kept in free functions over raw command
//! output so the logic is testable without the real tooling installed.

use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};

use crate::models::DependencyRecord;

pub mod cargo;
pub mod conda;
pub mod python;

pub trait Collector {
    /// Short ecosystem label used in diagnostics and intermediate filenames.
    fn name(&self) -> &'static str;

    /// List the host project's direct dependencies for this ecosystem.
    ///
    /// A failing external command is a fatal error for the whole run: the
    /// returned error carries the command line and its captured stderr.
    fn collect(&self) -> Result<Vec<DependencyRecord>>;
}

/// Run an external listing command and return its stdout.
///
/// Non-zero exit is an error, not a degradation; collectors have no
/// partial-failure mode.
pub(crate) fn run_command(program: &str, args: &[&str], cwd: &Path) -> Result<String> {
    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .output()
        .with_context(|| format!("failed to run `{} {}`", program, args.join(" ")))?;

    if !output.status.success() {
        bail!(
            "command `{} {}` exited with {}:\n{}",
            program,
            args.join(" "),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim_end()
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_successful_command_returns_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let stdout = run_command("sh", &["-c", "echo listing"], dir.path()).unwrap();
        assert_eq!(stdout, "listing\n");
    }

    // A non-zero exit is fatal for the whole run; the diagnostic must carry
    // both the failing command line and its captured stderr.
    #[test]
    fn test_failing_command_is_fatal_with_command_and_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_command("sh", &["-c", "echo boom >&2; exit 1"], dir.path()).unwrap_err();

        let message = format!("{:#}", err);
        assert!(message.contains("command `sh -c echo boom >&2; exit 1`"));
        assert!(message.contains("exit status: 1"));
        assert!(message.contains("boom"));
    }

    #[test]
    fn test_missing_program_reports_the_command() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_command("definitely-not-a-real-tool", &["--json"], dir.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("definitely-not-a-real-tool --json"));
    }
}
