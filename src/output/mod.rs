// src/output/mod.rs

pub mod csv;
pub mod parquet;

pub use self::csv::write_observations;
pub use self::parquet::write_parquet;

use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;
use tempfile::NamedTempFile;

/// Write through a temporary sibling of `path`, then rename over it, so a
/// failed run never leaves a truncated file behind.
pub fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut File) -> Result<()>,
{
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temporary file in {}", dir.display()))?;
    write(tmp.as_file_mut())?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(path)
        .with_context(|| format!("renaming temporary file onto {}", path.display()))?;
    Ok(())
}
