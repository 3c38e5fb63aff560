//! File descriptor: the metadata snapshot handed to classifiers
//!
//! A descriptor is built once by the extractor and never mutated afterwards.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fallback MIME type when nothing better is known
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Normalized metadata of a single file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    name: String,
    extension: String,
    size_bytes: Option<u64>,
    mime_type: String,
    created_at: Option<DateTime<Utc>>,
    modified_at: Option<DateTime<Utc>>,
    content_preview: Option<String>,
}

impl FileDescriptor {
    /// Creates a descriptor holding only the file name and its derived extension
    ///
    /// # Example
    ///
    /// ```
    /// use filesort_core::domain::FileDescriptor;
    ///
    /// let d = FileDescriptor::new("Report.PDF");
    /// assert_eq!(d.extension(), "pdf");
    /// assert_eq!(d.mime_type(), "application/octet-stream");
    /// ```
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let extension = Path::new(&name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        Self {
            name,
            extension,
            size_bytes: None,
            mime_type: DEFAULT_MIME_TYPE.to_string(),
            created_at: None,
            modified_at: None,
            content_preview: None,
        }
    }

    /// Minimal descriptor for a path, used when extraction fails
    pub fn minimal(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lower-cased extension without the leading dot, empty if none
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn size_bytes(&self) -> Option<u64> {
        self.size_bytes
    }

    /// Size in megabytes, rounded to two decimals
    pub fn size_mb(&self) -> Option<f64> {
        self.size_bytes
            .map(|b| (b as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0)
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        self.modified_at
    }

    pub fn content_preview(&self) -> Option<&str> {
        self.content_preview.as_deref()
    }

    pub fn with_size_bytes(mut self, size: u64) -> Self {
        self.size_bytes = Some(size);
        self
    }

    pub fn with_mime_type(mut self, mime: impl Into<String>) -> Self {
        self.mime_type = mime.into();
        self
    }

    pub fn with_created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    pub fn with_modified_at(mut self, at: DateTime<Utc>) -> Self {
        self.modified_at = Some(at);
        self
    }

    /// Attaches a content preview; blank text is discarded
    pub fn with_content_preview(mut self, preview: impl Into<String>) -> Self {
        let preview = preview.into();
        self.content_preview = if preview.trim().is_empty() {
            None
        } else {
            Some(preview)
        };
        self
    }
}
