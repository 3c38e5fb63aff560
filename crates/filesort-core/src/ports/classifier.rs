//! Classification port (driven/secondary port)
//!
//! A classifier maps a file descriptor to a suggested destination. The
//! placement engine treats every error from this port as recoverable and
//! substitutes the deterministic fallback.
//!
//! ## Design Notes
//!
//! - Timeouts are enforced by the caller, not by implementations.
//! - Implementations must never return a partially-filled result; anything
//!   incomplete is reported as `ProviderError::Unparsable`.

use std::time::Duration;

use thiserror::Error;

use crate::domain::{ClassificationResult, FileDescriptor};

/// Maximum number of folder hints sent by default
pub const DEFAULT_HINT_LIMIT: usize = 50;

// ============================================================================
// ProviderError
// ============================================================================

/// Why a classifier could not produce a result
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Classifier timed out after {0:?}")]
    Timeout(Duration),

    #[error("Classifier request failed: {0}")]
    Request(String),

    #[error("Classifier returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Classifier output could not be parsed: {0}")]
    Unparsable(String),

    #[error("No classifier credentials configured")]
    MissingCredentials,
}

// ============================================================================
// FolderHints
// ============================================================================

/// Existing destination folders, relative to the placement base
///
/// Passed to the classifier so it can reuse folders that already exist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderHints {
    folders: Vec<String>,
}

impl FolderHints {
    /// Builds hints, keeping at most `limit` entries in the given order
    pub fn new(folders: Vec<String>, limit: usize) -> Self {
        let mut folders = folders;
        folders.truncate(limit);
        Self { folders }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn folders(&self) -> &[String] {
        &self.folders
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }
}

// ============================================================================
// IClassifier trait
// ============================================================================

/// Port trait for file classification
#[async_trait::async_trait]
pub trait IClassifier: Send + Sync {
    /// Classifies one file
    ///
    /// # Arguments
    /// * `descriptor` - Metadata snapshot of the file
    /// * `hints` - Existing folders the classifier may prefer
    async fn classify(
        &self,
        descriptor: &FileDescriptor,
        hints: &FolderHints,
    ) -> Result<ClassificationResult, ProviderError>;

    /// Short name used in logs
    fn name(&self) -> &str;
}
