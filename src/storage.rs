//! Output directory hygiene

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::Result;

/// Suffix of files still being written.
pub const TEMP_SUFFIX: &str = ".tmp";

/// Create the directory and its parents if missing.
pub fn ensure_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path)?;
    Ok(())
}

/// Temporary path a download is written to before it is renamed into place.
pub fn temp_path_for(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

/// Delete leftovers of interrupted downloads from the top level of `dir`.
///
/// Returns the number of files removed.
pub fn cleanup_incomplete(dir: &Path) -> Result<usize> {
    let mut removed = 0;

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_partial = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(TEMP_SUFFIX));
        if !is_partial {
            continue;
        }

        tracing::warn!("Removing incomplete file: {}", entry.path().display());
        fs::remove_file(entry.path())?;
        removed += 1;
    }

    Ok(removed)
}
