//! Classification results and the deterministic fallback classifier

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::descriptor::FileDescriptor;
use super::errors::DomainError;

// ============================================================================
// Category
// ============================================================================

/// Closed set of top-level categories a file can be placed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Homework,
    Work,
    Personal,
    Receipt,
    Media,
    Document,
    Code,
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Homework,
        Category::Work,
        Category::Personal,
        Category::Receipt,
        Category::Media,
        Category::Document,
        Category::Code,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Homework => "homework",
            Category::Work => "work",
            Category::Personal => "personal",
            Category::Receipt => "receipt",
            Category::Media => "media",
            Category::Document => "document",
            Category::Code => "code",
            Category::Other => "other",
        }
    }

    /// Parses a provider-supplied label, mapping anything unknown to `Other`
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or(Category::Other)
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == needle)
            .ok_or_else(|| DomainError::UnknownValue {
                kind: "category",
                value: s.to_string(),
            })
    }
}

// ============================================================================
// Confidence
// ============================================================================

/// Certainty in [0, 1]; construction clamps, NaN becomes 0
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Confidence(f64);

impl Confidence {
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            Self(0.0)
        } else {
            Self(value.clamp(0.0, 1.0))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl From<f64> for Confidence {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Confidence> for f64 {
    fn from(c: Confidence) -> Self {
        c.0
    }
}

impl Display for Confidence {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

// ============================================================================
// ClassificationResult
// ============================================================================

/// Optional context the provider may have recognized
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semester: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
}

impl ClassificationMetadata {
    pub fn is_empty(&self) -> bool {
        self.school.is_none()
            && self.course.is_none()
            && self.semester.is_none()
            && self.company.is_none()
            && self.project.is_none()
    }
}

/// Where a classification came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationSource {
    Provider,
    Fallback,
}

/// Output of a classifier for one file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: Category,
    pub subcategory: String,
    /// Relative destination folder, never empty
    pub suggested_path: String,
    pub confidence: Confidence,
    pub reasoning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ClassificationMetadata>,
    pub source: ClassificationSource,
}

impl ClassificationResult {
    /// Builds a provider result
    ///
    /// # Errors
    /// Returns `DomainError::ValidationFailed` if `suggested_path` is blank.
    pub fn new(
        category: Category,
        subcategory: impl Into<String>,
        suggested_path: impl Into<String>,
        confidence: f64,
    ) -> Result<Self, DomainError> {
        let suggested_path = suggested_path.into();
        if suggested_path.trim().is_empty() {
            return Err(DomainError::ValidationFailed(
                "suggested_path must not be empty".to_string(),
            ));
        }
        Ok(Self {
            category,
            subcategory: subcategory.into(),
            suggested_path,
            confidence: Confidence::new(confidence),
            reasoning: String::new(),
            metadata: None,
            source: ClassificationSource::Provider,
        })
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = reasoning.into();
        self
    }

    /// Attaches metadata, dropping it when every field is empty
    pub fn with_metadata(mut self, metadata: ClassificationMetadata) -> Self {
        self.metadata = if metadata.is_empty() {
            None
        } else {
            Some(metadata)
        };
        self
    }

    pub fn is_fallback(&self) -> bool {
        self.source == ClassificationSource::Fallback
    }
}

// ============================================================================
// Fallback rules
// ============================================================================

const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "docx", "doc", "txt"];
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "heic"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv"];
const CODE_EXTENSIONS: &[&str] = &["py", "js", "java", "cpp", "c", "html", "css"];

/// Classifies a file from its name and extension alone
///
/// Total: every descriptor maps to a result with a non-empty path and a
/// confidence in the 0.3..=0.8 band.
pub fn fallback_classification(descriptor: &FileDescriptor) -> ClassificationResult {
    let ext = descriptor.extension();
    let name = descriptor.name().to_lowercase();

    let (category, subcategory, path, confidence) = if DOCUMENT_EXTENSIONS.contains(&ext) {
        if ["hw", "homework", "assignment"]
            .iter()
            .any(|k| name.contains(k))
        {
            (Category::Homework, "assignment", "school/homework", 0.6)
        } else if ["receipt", "invoice"].iter().any(|k| name.contains(k)) {
            (Category::Receipt, "financial", "personal/receipts", 0.7)
        } else {
            (Category::Document, "general", "documents", 0.5)
        }
    } else if IMAGE_EXTENSIONS.contains(&ext) {
        (Category::Media, "image", "media/images", 0.8)
    } else if VIDEO_EXTENSIONS.contains(&ext) {
        (Category::Media, "video", "media/videos", 0.8)
    } else if CODE_EXTENSIONS.contains(&ext) {
        (Category::Code, "source", "code/projects", 0.7)
    } else {
        (Category::Other, "unknown", "misc", 0.3)
    };

    ClassificationResult {
        category,
        subcategory: subcategory.to_string(),
        suggested_path: path.to_string(),
        confidence: Confidence::new(confidence),
        reasoning: "Classified by file extension and name".to_string(),
        metadata: None,
        source: ClassificationSource::Fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_clamps() {
        assert_eq!(Confidence::new(1.7).value(), 1.0);
        assert_eq!(Confidence::new(-0.2).value(), 0.0);
        assert_eq!(Confidence::new(f64::NAN).value(), 0.0);
        assert_eq!(Confidence::new(0.42).value(), 0.42);
    }

    #[test]
    fn test_confidence_deserialize_clamps() {
        let c: Confidence = serde_json::from_str("3.5").unwrap();
        assert_eq!(c.value(), 1.0);
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("Homework".parse::<Category>().unwrap(), Category::Homework);
        assert!("spaceship".parse::<Category>().is_err());
        assert_eq!(Category::parse_lenient("spaceship"), Category::Other);
        assert_eq!(Category::parse_lenient(" receipt "), Category::Receipt);
    }

    #[test]
    fn test_category_serialization() {
        let json = serde_json::to_string(&Category::Media).unwrap();
        assert_eq!(json, "\"media\"");
    }

    #[test]
    fn test_result_rejects_empty_path() {
        let err = ClassificationResult::new(Category::Work, "x", "   ", 0.9).unwrap_err();
        assert!(matches!(err, DomainError::ValidationFailed(_)));
    }

    #[test]
    fn test_result_clamps_confidence() {
        let r = ClassificationResult::new(Category::Work, "reports", "work/reports", 2.0).unwrap();
        assert_eq!(r.confidence.value(), 1.0);
        assert!(!r.is_fallback());
    }

    #[test]
    fn test_empty_metadata_is_dropped() {
        let r = ClassificationResult::new(Category::Work, "x", "work", 0.5)
            .unwrap()
            .with_metadata(ClassificationMetadata::default());
        assert!(r.metadata.is_none());
    }

    #[test]
    fn test_fallback_rules() {
        let cases = [
            ("CS170_HW7.pdf", Category::Homework, "school/homework", 0.6),
            ("assignment3.docx", Category::Homework, "school/homework", 0.6),
            ("Invoice-2024.pdf", Category::Receipt, "personal/receipts", 0.7),
            ("receipt.txt", Category::Receipt, "personal/receipts", 0.7),
            ("paper.pdf", Category::Document, "documents", 0.5),
            ("IMG_0001.HEIC", Category::Media, "media/images", 0.8),
            ("clip.mkv", Category::Media, "media/videos", 0.8),
            ("main.py", Category::Code, "code/projects", 0.7),
            ("setup.exe", Category::Other, "misc", 0.3),
            ("README", Category::Other, "misc", 0.3),
        ];

        for (name, category, path, confidence) in cases {
            let r = fallback_classification(&FileDescriptor::new(name));
            assert_eq!(r.category, category, "{name}");
            assert_eq!(r.suggested_path, path, "{name}");
            assert_eq!(r.confidence.value(), confidence, "{name}");
            assert!(r.is_fallback());
        }
    }

    #[test]
    fn test_fallback_is_total() {
        let names = ["", ".", "..", ".hidden", "a.b.c.d", "no_ext", "x.PDF", "💾.bin", "hw"];
        let exts = ["", "pdf", "png", "mov", "js", "zip", "weird-ext"];

        for name in names {
            for ext in exts {
                let full = if ext.is_empty() {
                    name.to_string()
                } else {
                    format!("{name}.{ext}")
                };
                let r = fallback_classification(&FileDescriptor::new(full));
                assert!((0.0..=1.0).contains(&r.confidence.value()));
                assert!(!r.suggested_path.is_empty());
            }
        }
    }
}
