//! Reply parsing
//!
//! Models often wrap the JSON object in prose or a code fence, so the object
//! is taken from the first `{` to the last `}`. Only `suggested_path` is
//! mandatory. An unknown category becomes `other` and a missing confidence
//! becomes [`DEFAULT_CONFIDENCE`].

use serde::Deserialize;

use filesort_core::domain::{Category, ClassificationMetadata, ClassificationResult};
use filesort_core::ports::ProviderError;

/// Confidence assumed when the reply omits one
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

#[derive(Debug, Deserialize)]
struct RawClassification {
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    subcategory: Option<String>,
    #[serde(default)]
    suggested_path: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default)]
    metadata: Option<ClassificationMetadata>,
}

/// Returns the slice between the first `{` and the last `}` inclusive
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Parses a model reply into a provider classification
///
/// # Errors
/// `ProviderError::Unparsable` when no JSON object is present, it does not
/// deserialize, or it lacks a non-empty `suggested_path`.
pub fn parse_classification(text: &str) -> Result<ClassificationResult, ProviderError> {
    let json = extract_json_object(text)
        .ok_or_else(|| ProviderError::Unparsable("no JSON object in reply".to_string()))?;

    let raw: RawClassification = serde_json::from_str(json)
        .map_err(|e| ProviderError::Unparsable(format!("invalid JSON: {e}")))?;

    let path = raw
        .suggested_path
        .as_deref()
        .map(normalize_path)
        .unwrap_or_default();

    let category = raw
        .category
        .as_deref()
        .map(Category::parse_lenient)
        .unwrap_or(Category::Other);

    let result = ClassificationResult::new(
        category,
        raw.subcategory.unwrap_or_default(),
        path,
        raw.confidence.unwrap_or(DEFAULT_CONFIDENCE),
    )
    .map_err(|e| ProviderError::Unparsable(e.to_string()))?
    .with_reasoning(raw.reasoning.unwrap_or_default());

    Ok(match raw.metadata {
        Some(m) => result.with_metadata(m),
        None => result,
    })
}

/// Trims whitespace and surrounding slashes from a suggested folder
fn normalize_path(path: &str) -> String {
    path.trim().trim_matches('/').trim().to_string()
}
