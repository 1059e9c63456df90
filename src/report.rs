use std::path::Path;

use anyhow::{Context, Result};

/// Width of the separator line prefixed to each document in the report.
const SEPARATOR_WIDTH: usize = 80;

/// Rebuild the consolidated report from every document in the license store.
///
/// Documents are concatenated in lexicographic filename order, each prefixed
/// by a dash separator, and the output file is overwritten wholesale; there
/// is no incremental mode. Returns the number of documents merged.
pub fn merge(store_dir: &Path, output: &Path) -> Result<usize> {
    let mut files: Vec<_> = std::fs::read_dir(store_dir)
        .with_context(|| format!("failed to read {}", store_dir.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "txt"))
        .collect();
    files.sort();

    let mut sections = Vec::with_capacity(files.len());
    for path in &files {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        sections.push(format!(
            "{}\n{}",
            "-".repeat(SEPARATOR_WIDTH),
            content.trim()
        ));
    }

    std::fs::write(output, sections.join("\n\n"))
        .with_context(|| format!("failed to write {}", output.display()))?;

    Ok(files.len())
}
