//! Platform paths and file helpers

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Get the directory holding both data files.
pub fn data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().context("Could not find data directory")?;
    Ok(data_dir.join("task-manager"))
}

/// Get the path of the persisted task list.
pub fn tasks_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("tasks.json"))
}

/// Get the path of the persisted settings.
pub fn settings_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("settings.json"))
}

/// Replace `path` with `contents` through a temp file in the same
/// directory, so the file is never observed half-written.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = path
        .parent()
        .with_context(|| format!("Data file {:?} has no parent directory", path))?;
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create data directory {:?}", dir))?;

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {:?}", dir))?;
    tmp.write_all(contents.as_bytes())
        .context("Failed to write temp file")?;
    tmp.persist(path)
        .with_context(|| format!("Failed to replace {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::write_atomic;
    use tempfile::TempDir;

    #[test]
    fn write_atomic_creates_and_replaces() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("file.json");
        write_atomic(&path, "first").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first");
        write_atomic(&path, "second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
    }
}
