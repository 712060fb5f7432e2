//! Scratch locations for log files written by tests.

use std::path::PathBuf;

use tempfile::TempDir;

/// Creates a fresh temporary directory for log files; removed when dropped.
pub fn temp_log_dir() -> anyhow::Result<TempDir> {
    Ok(tempfile::Builder::new().prefix("memres-logs-").tempdir()?)
}

/// Returns a not-yet-existing path for a log file named `name`, nested one directory
/// below `dir` so that parent directory creation is exercised as well.
pub fn nested_log_path(dir: &TempDir, name: &str) -> anyhow::Result<PathBuf> {
    let path = dir.path().join("logs").join(name);
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_nested_log_path() {
        let dir = super::temp_log_dir().unwrap();
        let path = super::nested_log_path(&dir, "a.csv").unwrap();
        assert!(path.starts_with(dir.path()));
        assert!(!path.parent().unwrap().exists());
    }
}
