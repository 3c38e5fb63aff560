//! Single-file placement engine
//!
//! ## State machine
//!
//! ```text
//! Detected ──→ Classifying ──┬──→ Moved          (confidence > threshold)
//!                            ├──→ LeftForReview  (confidence <= threshold,
//!                            │                    or already in the suggested folder)
//!                            └──→ Errored        (vanished source, mkdir or move failure)
//! ```
//!
//! A file is never moved within its own folder. Renaming it there would
//! look like a new arrival to the watcher and start the cycle again.
//!
//! Classifier failures and timeouts are not errors here: the deterministic
//! fallback classification takes over and the file continues down the
//! normal path. Nothing escapes [`PlacementEngine::place`] as an `Err`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use filesort_audit::{AuditLogger, ReasonCode};
use filesort_core::config::PlacementConfig;
use filesort_core::domain::{
    fallback_classification, Category, ClassificationResult, FileDescriptor, OperationType,
    OrganizerEvent, RecordId,
};
use filesort_core::ports::{
    FolderHints, IClassifier, INotificationSink, ProviderError, DEFAULT_HINT_LIMIT,
};
use tracing::{debug, info, instrument, warn};

use crate::extractor::MetadataExtractor;
use crate::fsops::{file_name_of, move_path, parent_name_of};
use crate::hints::collect_folder_hints;
use crate::resolver::DestinationResolver;
use crate::OrganizeError;

/// Default auto-move threshold
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.25;

/// Default classifier deadline
pub const DEFAULT_CLASSIFY_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// ConfidencePolicy
// ============================================================================

/// Decides between auto-move and review
///
/// A file moves only when its confidence is strictly greater than the
/// threshold for its category.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidencePolicy {
    default: f64,
    per_category: HashMap<Category, f64>,
}

impl ConfidencePolicy {
    pub fn new(default: f64) -> Self {
        Self {
            default,
            per_category: HashMap::new(),
        }
    }

    pub fn from_config(config: &PlacementConfig) -> Self {
        Self {
            default: config.confidence_threshold,
            per_category: config.category_thresholds.clone(),
        }
    }

    pub fn with_override(mut self, category: Category, threshold: f64) -> Self {
        self.per_category.insert(category, threshold);
        self
    }

    pub fn threshold_for(&self, category: Category) -> f64 {
        self.per_category
            .get(&category)
            .copied()
            .unwrap_or(self.default)
    }

    pub fn should_auto_move(&self, classification: &ClassificationResult) -> bool {
        classification.confidence.value() > self.threshold_for(classification.category)
    }
}

impl Default for ConfidencePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIDENCE_THRESHOLD)
    }
}

// ============================================================================
// PlacementOutcome
// ============================================================================

/// Terminal state of one placement attempt
#[derive(Debug, Clone, PartialEq)]
pub enum PlacementOutcome {
    /// The file now lives at `to`
    Moved {
        from: PathBuf,
        to: PathBuf,
        classification: ClassificationResult,
    },
    /// Confidence was too low; the file was not touched
    LeftForReview { classification: ClassificationResult },
    /// The attempt failed; the file is where it was (if it still exists)
    Errored { reason: ReasonCode, message: String },
}

impl PlacementOutcome {
    pub fn is_moved(&self) -> bool {
        matches!(self, PlacementOutcome::Moved { .. })
    }
}

// ============================================================================
// PlacementEngine
// ============================================================================

/// Classifies one file and moves it, or leaves it for review
pub struct PlacementEngine {
    classifier: Arc<dyn IClassifier>,
    audit: Arc<AuditLogger>,
    notifier: Arc<dyn INotificationSink>,
    extractor: MetadataExtractor,
    resolver: DestinationResolver,
    policy: ConfidencePolicy,
    classify_timeout: Duration,
    hint_depth: usize,
    hint_limit: usize,
    hint_exclusions: Vec<PathBuf>,
}

impl PlacementEngine {
    pub fn new(
        classifier: Arc<dyn IClassifier>,
        audit: Arc<AuditLogger>,
        notifier: Arc<dyn INotificationSink>,
        resolver: DestinationResolver,
    ) -> Self {
        Self {
            classifier,
            audit,
            notifier,
            extractor: MetadataExtractor::default(),
            resolver,
            policy: ConfidencePolicy::default(),
            classify_timeout: DEFAULT_CLASSIFY_TIMEOUT,
            hint_depth: 2,
            hint_limit: DEFAULT_HINT_LIMIT,
            hint_exclusions: Vec::new(),
        }
    }

    pub fn with_extractor(mut self, extractor: MetadataExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_policy(mut self, policy: ConfidencePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_classify_timeout(mut self, timeout: Duration) -> Self {
        self.classify_timeout = timeout;
        self
    }

    /// Folder hint collection; a depth of 0 sends no hints
    pub fn with_folder_hints(mut self, depth: usize, limit: usize) -> Self {
        self.hint_depth = depth;
        self.hint_limit = limit;
        self
    }

    /// Never offers `dir` (or anything below it) as a folder hint
    ///
    /// The folder a file is classified from is always excluded as well.
    pub fn exclude_from_hints(mut self, dir: impl Into<PathBuf>) -> Self {
        self.hint_exclusions.push(dir.into());
        self
    }

    pub fn policy(&self) -> &ConfidencePolicy {
        &self.policy
    }

    /// Extracts and classifies `path` without touching it
    ///
    /// Provider errors and timeouts are replaced by the fallback
    /// classification.
    pub async fn classify(&self, path: &Path) -> (FileDescriptor, ClassificationResult) {
        let descriptor = self.extractor.extract(path).await;

        let mut exclude = self.hint_exclusions.clone();
        if let Some(parent) = path.parent() {
            exclude.push(parent.to_path_buf());
        }
        let hints = collect_folder_hints(
            self.resolver.base_dir(),
            self.hint_depth,
            self.hint_limit,
            &exclude,
        )
        .await;
        let classification = self.classify_descriptor(&descriptor, &hints).await;
        (descriptor, classification)
    }

    async fn classify_descriptor(
        &self,
        descriptor: &FileDescriptor,
        hints: &FolderHints,
    ) -> ClassificationResult {
        let attempt = tokio::time::timeout(
            self.classify_timeout,
            self.classifier.classify(descriptor, hints),
        )
        .await
        .unwrap_or(Err(ProviderError::Timeout(self.classify_timeout)));

        match attempt {
            Ok(result) => result,
            Err(e) => {
                warn!(
                    file = descriptor.name(),
                    classifier = self.classifier.name(),
                    reason = %ReasonCode::ProviderUnavailable,
                    error = %e,
                    "Classification failed, using fallback"
                );
                fallback_classification(descriptor)
            }
        }
    }

    /// Runs one file through the state machine
    #[instrument(skip_all, fields(path = %path.display()))]
    pub async fn place(&self, path: &Path) -> PlacementOutcome {
        let filename = file_name_of(path);

        if tokio::fs::symlink_metadata(path).await.is_err() {
            let err = OrganizeError::SourceNotFound(path.to_path_buf());
            return self.errored(&filename, None, err.reason_code(), err.to_string()).await;
        }

        let (_, classification) = self.classify(path).await;
        debug!(
            category = %classification.category,
            confidence = classification.confidence.value(),
            fallback = classification.is_fallback(),
            "Classified"
        );

        if !self.policy.should_auto_move(&classification) {
            info!(
                confidence = classification.confidence.value(),
                threshold = self.policy.threshold_for(classification.category),
                "Confidence too low, leaving file for review"
            );
            return self.leave_for_review(path, &filename, classification).await;
        }

        if self
            .is_current_folder(path, &classification.suggested_path)
            .await
        {
            info!(
                suggested = %classification.suggested_path,
                "File is already in the suggested folder, leaving it for review"
            );
            return self.leave_for_review(path, &filename, classification).await;
        }

        let record = self
            .audit
            .log_placement(OperationType::Move, path, &classification)
            .await;

        let target = match self
            .resolver
            .resolve(&classification.suggested_path, &filename)
            .await
        {
            Ok(t) => t,
            Err(e) => {
                let code = match e {
                    OrganizeError::PermissionDenied(_) | OrganizeError::DiskFull => e.reason_code(),
                    _ => ReasonCode::DestinationUnavailable,
                };
                return self.errored(&filename, record, code, e.to_string()).await;
            }
        };

        if let Err(e) = move_path(path, &target).await {
            let e = OrganizeError::from_io(e, path);
            return self
                .errored(&filename, record, e.reason_code(), e.to_string())
                .await;
        }

        self.audit.log_completed(record, Some(&target)).await;
        info!(
            to = %target.display(),
            category = %classification.category,
            "File organized"
        );

        self.publish(OrganizerEvent::FileOrganized {
            filename,
            from_folder: parent_name_of(path),
            to_folder: self.display_folder(&target),
        })
        .await;

        PlacementOutcome::Moved {
            from: path.to_path_buf(),
            to: target,
            classification,
        }
    }

    async fn leave_for_review(
        &self,
        path: &Path,
        filename: &str,
        classification: ClassificationResult,
    ) -> PlacementOutcome {
        self.audit
            .log_placement(OperationType::Review, path, &classification)
            .await;

        self.publish(OrganizerEvent::FileNeedsReview {
            filename: filename.to_string(),
        })
        .await;

        PlacementOutcome::LeftForReview { classification }
    }

    async fn errored(
        &self,
        filename: &str,
        record: Option<RecordId>,
        reason: ReasonCode,
        message: String,
    ) -> PlacementOutcome {
        self.audit.log_failed(record, reason, &message).await;
        warn!(%reason, error = %message, "Placement failed");

        self.publish(OrganizerEvent::ProcessingError {
            filename: filename.to_string(),
            reason: message.clone(),
        })
        .await;

        PlacementOutcome::Errored { reason, message }
    }

    /// True when `suggested` maps to the folder `path` already sits in
    async fn is_current_folder(&self, path: &Path, suggested: &str) -> bool {
        let Some(parent) = path.parent() else {
            return false;
        };
        let folder = self.resolver.folder_for(suggested);
        if folder == parent {
            return true;
        }
        match (
            tokio::fs::canonicalize(&folder).await,
            tokio::fs::canonicalize(parent).await,
        ) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }

    /// Destination folder relative to the base, for user-facing events
    fn display_folder(&self, target: &Path) -> String {
        target
            .parent()
            .and_then(|p| p.strip_prefix(self.resolver.base_dir()).ok())
            .map(|p| p.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| parent_name_of(target))
    }

    async fn publish(&self, event: OrganizerEvent) {
        if let Err(e) = self.notifier.publish(&event).await {
            warn!(event = event.kind(), error = %e, "Failed to publish event");
        }
    }
}
