//! Per-path exclusion for concurrent placements
//!
//! A path is in flight from the moment the watch loop picks it up until its
//! placement ends. Membership is held by an [`InFlightGuard`], so it is
//! released on every exit path: success, error, panic or task abort.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashSet;

/// Set of paths currently being processed
#[derive(Debug, Clone, Default)]
pub struct InFlightSet {
    paths: Arc<DashSet<PathBuf>>,
}

impl InFlightSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `path` in flight, or returns `None` if it already is
    pub fn try_acquire(&self, path: &Path) -> Option<InFlightGuard> {
        if self.paths.insert(path.to_path_buf()) {
            Some(InFlightGuard {
                paths: Arc::clone(&self.paths),
                path: path.to_path_buf(),
            })
        } else {
            None
        }
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Releases its path from the set when dropped
#[derive(Debug)]
pub struct InFlightGuard {
    paths: Arc<DashSet<PathBuf>>,
    path: PathBuf,
}

impl InFlightGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.paths.remove(&self.path);
    }
}
