//! Single-attachment download that never exposes a partial file.

use std::fs;
use std::path::{Path, PathBuf};

use crate::source::ChannelSource;
use crate::storage::temp_path_for;

/// A file that is present, complete, under its final name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRecord {
    pub path: PathBuf,
    pub size: u64,
    /// True when the file was already on disk and nothing was fetched.
    pub already_present: bool,
}

/// Fetch one attachment to `target`.
///
/// An existing file at `target` is reused as-is. Otherwise the data goes to
/// `<target>.tmp` and is renamed only once it is non-empty. Any failure is
/// logged, the temporary file is removed and `None` is returned.
pub async fn fetch_file<S: ChannelSource>(
    source: &S,
    media: &S::Media,
    target: &Path,
) -> Option<DownloadRecord> {
    if let Ok(metadata) = fs::metadata(target) {
        if !metadata.is_file() {
            tracing::error!(
                "Cannot save {}: the path exists and is not a file",
                target.display()
            );
            return None;
        }
        tracing::info!(
            "File already exists: {}, skipping download.",
            target.display()
        );
        return Some(DownloadRecord {
            path: target.to_path_buf(),
            size: metadata.len(),
            already_present: true,
        });
    }

    let temp_path = temp_path_for(target);

    if let Err(err) = source.download_media(media, &temp_path).await {
        tracing::error!("Failed to download file {}: {}", target.display(), err);
        remove_partial(&temp_path);
        return None;
    }

    let size = fs::metadata(&temp_path).map(|m| m.len()).unwrap_or(0);
    if size == 0 {
        tracing::warn!(
            "Downloaded file is incomplete or missing: {}",
            temp_path.display()
        );
        remove_partial(&temp_path);
        return None;
    }

    if let Err(err) = fs::rename(&temp_path, target) {
        tracing::error!(
            "Failed to move {} into place: {}",
            temp_path.display(),
            err
        );
        remove_partial(&temp_path);
        return None;
    }

    tracing::info!("Downloaded: {}", target.display());
    Some(DownloadRecord {
        path: target.to_path_buf(),
        size,
        already_present: false,
    })
}

fn remove_partial(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => tracing::debug!("Removed partial file {}", path.display()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => tracing::warn!("Could not remove {}: {}", path.display(), err),
    }
}
