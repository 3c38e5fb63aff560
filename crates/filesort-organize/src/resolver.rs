//! Destination resolution and collision naming
//!
//! A suggested folder is sanitized and joined to the base directory. If the
//! filename is taken, `_1`, `_2`, … is inserted before the extension. No
//! randomness or clock is involved, so the same directory state always
//! yields the same path.

use std::path::{Path, PathBuf};

use filesort_core::domain::sanitize_relative;
use tracing::debug;

use crate::OrganizeError;

/// Computes collision-free destinations under a base directory
#[derive(Debug, Clone)]
pub struct DestinationResolver {
    base_dir: PathBuf,
}

impl DestinationResolver {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Folder a suggested relative path maps to, without touching the disk
    pub fn folder_for(&self, suggested: &str) -> PathBuf {
        self.base_dir.join(sanitize_relative(suggested))
    }

    /// Returns the absolute destination for `filename` in `suggested`
    ///
    /// Creates `base_dir/suggested` when it is missing.
    ///
    /// # Errors
    /// Returns an `OrganizeError` if the destination folder cannot be created
    pub async fn resolve(&self, suggested: &str, filename: &str) -> Result<PathBuf, OrganizeError> {
        let folder = self.folder_for(suggested);
        tokio::fs::create_dir_all(&folder)
            .await
            .map_err(|e| OrganizeError::from_io(e, &folder))?;

        let target = Self::unique_path(&folder.join(filename));
        debug!(suggested, target = %target.display(), "Resolved destination");
        Ok(target)
    }

    /// `candidate` itself if free, otherwise the first free numbered sibling
    pub fn unique_path(candidate: &Path) -> PathBuf {
        unique_with(candidate, |p| p.symlink_metadata().is_ok())
    }
}

/// Collision policy over an arbitrary existence check
fn unique_with<F>(candidate: &Path, mut exists: F) -> PathBuf
where
    F: FnMut(&Path) -> bool,
{
    if !exists(candidate) {
        return candidate.to_path_buf();
    }

    let stem = candidate
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = candidate
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut n: u64 = 1;
    loop {
        let numbered = candidate.with_file_name(format!("{stem}_{n}{ext}"));
        if !exists(&numbered) {
            return numbered;
        }
        n += 1;
    }
}
