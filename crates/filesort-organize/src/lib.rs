//! filesort organize - Decision and execution engine
//!
//! Provides:
//! - Confidence-gated placement of single files
//! - Sequential execution of migration plans with progress checkpoints
//! - A debounced watch loop over the drop directory
//! - File reminders fired on a fixed interval
//!
//! ## Modules
//!
//! - [`extractor`] - Builds `FileDescriptor`s from paths, with an optional preview
//! - [`resolver`] - Destination paths and the `_1`, `_2` collision policy
//! - [`fsops`] - Moves with cross-device fallback, archive naming
//! - [`placement`] - Single-file placement engine
//! - [`executor`] - Migration plan executor
//! - [`watcher`] - `notify` adapter and debounce queue
//! - [`watch_loop`] - Drives placement from watcher events
//! - [`inflight`] - Per-path exclusion guards
//! - [`filter`] - Ignore rules for hidden, temporary and partial files
//! - [`hints`] - Existing-folder hints for the classifier
//! - [`notifier`] - `INotificationSink` that writes to the log
//! - [`reminders`] - Reminder scheduling and the due-reminder loop

pub mod executor;
pub mod extractor;
pub mod filter;
pub mod fsops;
pub mod hints;
pub mod inflight;
pub mod notifier;
pub mod placement;
pub mod reminders;
pub mod resolver;
pub mod watch_loop;
pub mod watcher;

#[cfg(test)]
pub(crate) mod testing;

use std::io;
use std::path::{Path, PathBuf};

use filesort_audit::ReasonCode;
use thiserror::Error;

pub use executor::PlanExecutor;
pub use extractor::MetadataExtractor;
pub use placement::{ConfidencePolicy, PlacementEngine, PlacementOutcome};
pub use reminders::ReminderService;
pub use resolver::DestinationResolver;
pub use watch_loop::{WatchControl, WatchLoop};

/// Filesystem failures during placement or plan execution
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// The file or folder to act on does not exist
    #[error("Path not found: {0}")]
    SourceNotFound(PathBuf),

    /// Insufficient filesystem permissions
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// No space left on the destination device
    #[error("Disk full")]
    DiskFull,

    /// Any other I/O failure
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl OrganizeError {
    /// Classifies an I/O error raised while acting on `path`
    pub fn from_io(err: io::Error, path: &Path) -> Self {
        match ReasonCode::from_io(&err) {
            ReasonCode::SourceNotFound => OrganizeError::SourceNotFound(path.to_path_buf()),
            ReasonCode::PermissionDenied => OrganizeError::PermissionDenied(path.to_path_buf()),
            ReasonCode::DiskFull => OrganizeError::DiskFull,
            _ => OrganizeError::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    pub fn reason_code(&self) -> ReasonCode {
        match self {
            OrganizeError::SourceNotFound(_) => ReasonCode::SourceNotFound,
            OrganizeError::PermissionDenied(_) => ReasonCode::PermissionDenied,
            OrganizeError::DiskFull => ReasonCode::DiskFull,
            OrganizeError::Io { .. } => ReasonCode::IoError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_io_maps_kinds() {
        let p = Path::new("/x");
        let nf = OrganizeError::from_io(io::Error::new(io::ErrorKind::NotFound, "gone"), p);
        assert!(matches!(nf, OrganizeError::SourceNotFound(ref q) if q == p));
        assert_eq!(nf.reason_code(), ReasonCode::SourceNotFound);

        let pd = OrganizeError::from_io(io::Error::new(io::ErrorKind::PermissionDenied, "no"), p);
        assert_eq!(pd.reason_code(), ReasonCode::PermissionDenied);

        let other = OrganizeError::from_io(io::Error::new(io::ErrorKind::Other, "?"), p);
        assert_eq!(other.reason_code(), ReasonCode::IoError);
        assert!(other.to_string().contains("/x"));
    }

    #[cfg(unix)]
    #[test]
    fn test_from_io_disk_full() {
        let err = OrganizeError::from_io(io::Error::from_raw_os_error(libc::ENOSPC), Path::new("/x"));
        assert!(matches!(err, OrganizeError::DiskFull));
    }
}
