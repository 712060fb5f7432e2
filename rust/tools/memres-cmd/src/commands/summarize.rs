//! Summarize command implementation

use std::path::PathBuf;

use anyhow::{Context, Result};
use memres_logging::LogSummary;

pub fn run(path: PathBuf) -> Result<()> {
    let summary = LogSummary::from_path(&path)
        .with_context(|| format!("Failed to summarize {}", path.display()))?;
    if !summary.is_balanced() {
        log::warn!(
            "{}: {} outstanding allocation(s), {} unmatched free(s)",
            path.display(),
            summary.outstanding.len(),
            summary.unmatched_frees.len()
        );
    }
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
