//! Metadata extraction
//!
//! Builds a [`FileDescriptor`] for a path. Extraction never fails: when the
//! file cannot be stat'ed the descriptor carries only the name and
//! extension, and an unreadable preview is simply absent.

use std::path::Path;

use chrono::{DateTime, Utc};
use filesort_core::config::PrivacyConfig;
use filesort_core::domain::FileDescriptor;
use tokio::io::AsyncReadExt;
use tracing::{debug, warn};

/// Extensions whose content may be previewed
pub const PREVIEW_EXTENSIONS: &[&str] = &["pdf", "txt", "md", "csv", "json", "rtf", "log"];

/// PDFs larger than this are not parsed for a preview
const MAX_PDF_BYTES: u64 = 20 * 1024 * 1024;

/// Turns paths into classification-ready descriptors
#[derive(Debug, Clone, Default)]
pub struct MetadataExtractor {
    /// Maximum preview length in characters; `None` disables previews
    preview_limit: Option<usize>,
}

impl MetadataExtractor {
    pub fn new(preview_limit: Option<usize>) -> Self {
        Self {
            preview_limit: preview_limit.filter(|n| *n > 0),
        }
    }

    pub fn from_privacy(privacy: &PrivacyConfig) -> Self {
        Self::new(privacy.preview_limit())
    }

    pub fn preview_limit(&self) -> Option<usize> {
        self.preview_limit
    }

    /// Extracts a descriptor for `path`
    pub async fn extract(&self, path: &Path) -> FileDescriptor {
        let metadata = match tokio::fs::metadata(path).await {
            Ok(m) => m,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not read file metadata");
                return FileDescriptor::minimal(path);
            }
        };

        let mut descriptor = FileDescriptor::minimal(path).with_size_bytes(metadata.len());

        if let Some(mime) = mime_guess::from_path(path).first() {
            descriptor = descriptor.with_mime_type(mime.essence_str());
        }
        if let Ok(created) = metadata.created() {
            descriptor = descriptor.with_created_at(DateTime::<Utc>::from(created));
        }
        if let Ok(modified) = metadata.modified() {
            descriptor = descriptor.with_modified_at(DateTime::<Utc>::from(modified));
        }

        if let Some(limit) = self.preview_limit {
            if PREVIEW_EXTENSIONS.contains(&descriptor.extension()) {
                let preview = if descriptor.extension() == "pdf" {
                    pdf_preview(path, metadata.len(), limit).await
                } else {
                    text_preview(path, limit).await
                };
                if let Some(text) = preview {
                    descriptor = descriptor.with_content_preview(text);
                }
            }
        }

        descriptor
    }
}

/// First `limit` characters of `text`
fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect::<String>().trim().to_string()
}

async fn text_preview(path: &Path, limit: usize) -> Option<String> {
    // Four bytes per char covers any UTF-8 sequence.
    let budget = (limit as u64).saturating_mul(4);
    let file = match tokio::fs::File::open(path).await {
        Ok(f) => f,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Preview unavailable");
            return None;
        }
    };

    let mut buf = Vec::new();
    if let Err(e) = file.take(budget).read_to_end(&mut buf).await {
        debug!(path = %path.display(), error = %e, "Preview read failed");
        return None;
    }

    Some(truncate_chars(&String::from_utf8_lossy(&buf), limit))
}

async fn pdf_preview(path: &Path, size: u64, limit: usize) -> Option<String> {
    if size > MAX_PDF_BYTES {
        debug!(path = %path.display(), size, "PDF too large for preview");
        return None;
    }

    let path = path.to_path_buf();
    let result = tokio::task::spawn_blocking(move || {
        let bytes = std::fs::read(&path).ok()?;
        // pdf-extract panics on some malformed fonts.
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem(&bytes)
        })) {
            Ok(Ok(text)) => Some(truncate_chars(&text, limit)),
            Ok(Err(e)) => {
                debug!(path = %path.display(), error = %e, "PDF text extraction failed");
                None
            }
            Err(_) => {
                warn!(path = %path.display(), "PDF parser panicked");
                None
            }
        }
    })
    .await;

    result.ok().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_extract_basic_metadata() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Notes.TXT");
        std::fs::write(&path, "lecture 4: graphs").unwrap();

        let d = MetadataExtractor::new(Some(500)).extract(&path).await;

        assert_eq!(d.name(), "Notes.TXT");
        assert_eq!(d.extension(), "txt");
        assert_eq!(d.size_bytes(), Some(17));
        assert_eq!(d.mime_type(), "text/plain");
        assert!(d.modified_at().is_some());
        assert_eq!(d.content_preview(), Some("lecture 4: graphs"));
    }

    #[tokio::test]
    async fn test_preview_is_bounded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("long.md");
        std::fs::write(&path, "é".repeat(1000)).unwrap();

        let d = MetadataExtractor::new(Some(10)).extract(&path).await;
        assert_eq!(d.content_preview().map(|p| p.chars().count()), Some(10));
    }

    #[tokio::test]
    async fn test_preview_disabled() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("secret.txt");
        std::fs::write(&path, "password").unwrap();

        let d = MetadataExtractor::new(None).extract(&path).await;
        assert!(d.content_preview().is_none());
        assert_eq!(d.size_bytes(), Some(8));
    }

    #[tokio::test]
    async fn test_no_preview_for_binary_types() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("photo.jpg");
        std::fs::write(&path, [0xFF, 0xD8, 0xFF]).unwrap();

        let d = MetadataExtractor::new(Some(500)).extract(&path).await;
        assert!(d.content_preview().is_none());
        assert_eq!(d.mime_type(), "image/jpeg");
    }

    #[tokio::test]
    async fn test_corrupt_pdf_yields_no_preview() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"%PDF-1.4 this is not really a pdf").unwrap();

        let d = MetadataExtractor::new(Some(500)).extract(&path).await;
        assert!(d.content_preview().is_none());
        assert_eq!(d.mime_type(), "application/pdf");
    }

    #[tokio::test]
    async fn test_missing_file_yields_minimal_descriptor() {
        let d = MetadataExtractor::new(Some(500))
            .extract(Path::new("/definitely/not/here/Report.PDF"))
            .await;

        assert_eq!(d.name(), "Report.PDF");
        assert_eq!(d.extension(), "pdf");
        assert!(d.size_bytes().is_none());
        assert_eq!(d.mime_type(), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_unknown_extension_defaults_mime() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blob.zzzq");
        std::fs::write(&path, b"?").unwrap();

        let d = MetadataExtractor::default().extract(&path).await;
        assert_eq!(d.mime_type(), "application/octet-stream");
    }
}
