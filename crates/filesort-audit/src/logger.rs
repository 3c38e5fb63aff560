//! AuditLogger - high-level audit trail service
//!
//! Wraps `IAuditStore` with one method per step of an operation's life:
//! a pending record is appended when the decision is made, then moved to
//! `completed` or `failed` once. All methods are non-fatal: store errors
//! are logged via `tracing::warn!` and never propagated.

use std::path::Path;
use std::sync::Arc;

use filesort_core::{
    domain::{
        ClassificationResult, OperationRecord, OperationStatus, OperationType, RecordId,
    },
    ports::IAuditStore,
};

use crate::reason::ReasonCode;

/// Classification tag used for plan operations without a reason
pub const DEFAULT_PLAN_REASON: &str = "reorganization";

/// Non-fatal facade over the audit store.
///
/// Returned ids are `None` when the store rejected the append; later
/// transitions on a `None` id are skipped.
pub struct AuditLogger {
    store: Arc<dyn IAuditStore>,
}

impl AuditLogger {
    pub fn new(store: Arc<dyn IAuditStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn IAuditStore> {
        &self.store
    }

    async fn append(&self, record: &OperationRecord) -> Option<RecordId> {
        match self.store.append(record).await {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    file = record.filename(),
                    "Failed to append audit record"
                );
                None
            }
        }
    }

    async fn transition(
        &self,
        id: Option<RecordId>,
        status: OperationStatus,
        new_path: Option<&Path>,
    ) {
        let Some(id) = id else { return };
        if let Err(e) = self.store.update_status(id, status, new_path).await {
            tracing::warn!(error = %e, record = %id, %status, "Failed to update audit record");
        }
    }

    // ========================================================================
    // Watched-file placement
    // ========================================================================

    /// Records a placement decision for `source`
    ///
    /// `Move` records are later completed or failed; `Review` records stay
    /// pending until a human acts on the file.
    pub async fn log_placement(
        &self,
        operation_type: OperationType,
        source: &Path,
        classification: &ClassificationResult,
    ) -> Option<RecordId> {
        let record = OperationRecord::new(operation_type, source)
            .with_classification(classification.category.as_str())
            .with_confidence(classification.confidence.value());
        self.append(&record).await
    }

    // ========================================================================
    // Plan operations
    // ========================================================================

    /// Records the start of a plan operation on `path`
    ///
    /// Plan operations are user-approved, so confidence is always 1.0.
    pub async fn log_plan_operation(
        &self,
        operation_type: OperationType,
        path: &Path,
        reason: Option<&str>,
    ) -> Option<RecordId> {
        let record = OperationRecord::new(operation_type, path)
            .with_classification(reason.unwrap_or(DEFAULT_PLAN_REASON))
            .with_confidence(1.0);
        self.append(&record).await
    }

    // ========================================================================
    // Outcomes
    // ========================================================================

    /// Marks a pending record completed, storing where the item ended up
    pub async fn log_completed(&self, id: Option<RecordId>, new_path: Option<&Path>) {
        self.transition(id, OperationStatus::Completed, new_path).await;
    }

    /// Marks a pending record failed and stores the reason with it
    ///
    /// The reason is logged even when there is no record to attach it to.
    pub async fn log_failed(&self, id: Option<RecordId>, code: ReasonCode, message: &str) {
        tracing::warn!(record = ?id, %code, message, "Operation failed");
        let Some(id) = id else { return };
        let reason = format!("{code}: {message}");
        if let Err(e) = self.store.mark_failed(id, &reason).await {
            tracing::warn!(error = %e, record = %id, "Failed to update audit record");
        }
    }
}
