//! Reason codes for failed operations
//!
//! Attached to failure log lines and to user-facing error events so a
//! failure can be grouped without parsing its message.

use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};

/// Why an operation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    /// The file or folder to act on no longer exists
    SourceNotFound,
    /// Insufficient permissions on source or destination
    PermissionDenied,
    /// No space left on the destination device
    DiskFull,
    /// The destination folder could not be created
    DestinationUnavailable,
    /// The classification provider failed and the fallback was used
    ProviderUnavailable,
    /// Any other I/O failure
    IoError,
}

impl ReasonCode {
    /// Maps an I/O error to the closest reason
    pub fn from_io(err: &io::Error) -> Self {
        #[cfg(unix)]
        if err.raw_os_error() == Some(libc::ENOSPC) {
            return ReasonCode::DiskFull;
        }
        match err.kind() {
            io::ErrorKind::NotFound => ReasonCode::SourceNotFound,
            io::ErrorKind::PermissionDenied => ReasonCode::PermissionDenied,
            _ => ReasonCode::IoError,
        }
    }

    /// Short human explanation
    pub fn description(&self) -> &'static str {
        match self {
            ReasonCode::SourceNotFound => "file no longer exists",
            ReasonCode::PermissionDenied => "permission denied",
            ReasonCode::DiskFull => "no space left on device",
            ReasonCode::DestinationUnavailable => "destination folder could not be created",
            ReasonCode::ProviderUnavailable => "classifier unavailable, used fallback",
            ReasonCode::IoError => "filesystem error",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReasonCode::SourceNotFound => "source_not_found",
            ReasonCode::PermissionDenied => "permission_denied",
            ReasonCode::DiskFull => "disk_full",
            ReasonCode::DestinationUnavailable => "destination_unavailable",
            ReasonCode::ProviderUnavailable => "provider_unavailable",
            ReasonCode::IoError => "io_error",
        };
        write!(f, "{s}")
    }
}
