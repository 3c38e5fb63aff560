//! Migration plan executor
//!
//! Applies a [`MigrationPlan`] one operation at a time, in order. A failed
//! operation is recorded and the run moves on; there is no rollback. Each
//! call to [`PlanExecutor::execute`] owns its counters, progress tracker and
//! log, so the executor itself holds no per-run state.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::{Local, Utc};
use filesort_audit::AuditLogger;
use filesort_core::domain::{
    LogEntry, MigrationPlan, Operation, OperationType, OrganizerEvent, PlanAction,
    ProgressTracker, RunSummary, DEFAULT_THRESHOLDS,
};
use filesort_core::ports::INotificationSink;
use tracing::{debug, info, instrument, warn};

use crate::fsops::{archive_destination, ensure_parent, file_name_of, move_path};
use crate::resolver::DestinationResolver;
use crate::OrganizeError;

/// What an operation did
#[derive(Debug)]
enum Applied {
    Moved { to: PathBuf },
    Created { newly: bool },
    Archived { to: PathBuf },
}

/// Executes migration plans against the filesystem
pub struct PlanExecutor {
    audit: Arc<AuditLogger>,
    notifier: Arc<dyn INotificationSink>,
    archive_root: PathBuf,
    thresholds: Vec<u8>,
}

impl PlanExecutor {
    pub fn new(
        audit: Arc<AuditLogger>,
        notifier: Arc<dyn INotificationSink>,
        archive_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            audit,
            notifier,
            archive_root: archive_root.into(),
            thresholds: DEFAULT_THRESHOLDS.to_vec(),
        }
    }

    pub fn archive_root(&self) -> &Path {
        &self.archive_root
    }

    /// Runs every operation of `plan` and reports what happened
    #[instrument(skip_all, fields(operations = plan.len()))]
    pub async fn execute(&self, plan: &MigrationPlan) -> RunSummary {
        let start = Instant::now();
        let total = plan.len();
        let mut summary = RunSummary::new(total);
        let mut tracker = ProgressTracker::new(&self.thresholds);

        info!(run_id = %summary.run_id, total, "Starting reorganization");

        for (index, operation) in plan.iter().enumerate() {
            let op_type = operation_type(operation);
            let subject = subject_path(operation);
            let reason = match operation {
                Operation::Move { reason, .. } => reason.as_deref(),
                _ => None,
            };

            let record = self
                .audit
                .log_plan_operation(op_type, subject, reason)
                .await;

            match self.apply(operation).await {
                Ok(applied) => {
                    let to = match &applied {
                        Applied::Moved { to } => {
                            summary.files_moved += 1;
                            Some(to.clone())
                        }
                        Applied::Created { newly } => {
                            if *newly {
                                summary.folders_created += 1;
                            }
                            None
                        }
                        Applied::Archived { to } => {
                            summary.folders_archived += 1;
                            Some(to.clone())
                        }
                    };
                    debug!(index, action = %op_type, ?applied, "Operation applied");

                    let new_path = to.as_deref().or(match operation {
                        Operation::Create { destination } => Some(destination.as_path()),
                        _ => None,
                    });
                    self.audit.log_completed(record, new_path).await;
                    summary
                        .operations_log
                        .push(log_entry(op_type, subject, to, true));
                }
                Err(e) => {
                    let message = format!(
                        "Operation {}: {} {} failed: {}",
                        index + 1,
                        operation.action(),
                        subject.display(),
                        e
                    );
                    warn!(index, action = %op_type, reason = %e.reason_code(), "{message}");
                    self.audit
                        .log_failed(record, e.reason_code(), &message)
                        .await;
                    summary.errors.push(message);
                    summary
                        .operations_log
                        .push(log_entry(op_type, subject, None, false));
                }
            }

            summary.completed += 1;
            for percentage in tracker.observe(summary.completed, total) {
                self.publish(OrganizerEvent::ReorganizationProgress {
                    completed: summary.completed,
                    total,
                    percentage,
                })
                .await;
            }
        }

        summary.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            run_id = %summary.run_id,
            files_moved = summary.files_moved,
            folders_created = summary.folders_created,
            folders_archived = summary.folders_archived,
            errors = summary.errors.len(),
            duration_ms = summary.duration_ms,
            "Reorganization finished"
        );

        self.publish(OrganizerEvent::ReorganizationComplete {
            files_moved: summary.files_moved,
            folders_created: summary.folders_created,
        })
        .await;

        summary
    }

    async fn apply(&self, operation: &Operation) -> Result<Applied, OrganizeError> {
        match operation {
            Operation::Move {
                source,
                destination,
                ..
            } => {
                require_exists(source).await?;
                ensure_parent(destination)
                    .await
                    .map_err(|e| OrganizeError::from_io(e, destination))?;
                let target = DestinationResolver::unique_path(destination);
                move_path(source, &target)
                    .await
                    .map_err(|e| OrganizeError::from_io(e, source))?;
                Ok(Applied::Moved { to: target })
            }
            Operation::Create { destination } => {
                let existed = tokio::fs::try_exists(destination).await.unwrap_or(false);
                tokio::fs::create_dir_all(destination)
                    .await
                    .map_err(|e| OrganizeError::from_io(e, destination))?;
                Ok(Applied::Created { newly: !existed })
            }
            Operation::Archive { source } => {
                require_exists(source).await?;
                tokio::fs::create_dir_all(&self.archive_root)
                    .await
                    .map_err(|e| OrganizeError::from_io(e, &self.archive_root))?;
                let stamped = archive_destination(
                    &self.archive_root,
                    &file_name_of(source),
                    Local::now().naive_local(),
                );
                let target = DestinationResolver::unique_path(&stamped);
                move_path(source, &target)
                    .await
                    .map_err(|e| OrganizeError::from_io(e, source))?;
                Ok(Applied::Archived { to: target })
            }
        }
    }

    async fn publish(&self, event: OrganizerEvent) {
        if let Err(e) = self.notifier.publish(&event).await {
            warn!(event = event.kind(), error = %e, "Failed to publish event");
        }
    }
}

async fn require_exists(path: &Path) -> Result<(), OrganizeError> {
    tokio::fs::symlink_metadata(path)
        .await
        .map(|_| ())
        .map_err(|e| OrganizeError::from_io(e, path))
}

fn operation_type(operation: &Operation) -> OperationType {
    match operation.action() {
        PlanAction::Move => OperationType::Move,
        PlanAction::Create => OperationType::Create,
        PlanAction::Archive => OperationType::Archive,
    }
}

/// The path an operation acts on
fn subject_path(operation: &Operation) -> &Path {
    match operation {
        Operation::Move { source, .. } | Operation::Archive { source } => source,
        Operation::Create { destination } => destination,
    }
}

fn log_entry(action: OperationType, subject: &Path, to: Option<PathBuf>, succeeded: bool) -> LogEntry {
    let from = match action {
        OperationType::Create => None,
        _ => Some(subject.to_path_buf()),
    };
    let to = match action {
        OperationType::Create => Some(subject.to_path_buf()),
        _ => to,
    };
    LogEntry {
        action,
        filename: file_name_of(subject),
        from,
        to,
        succeeded,
        timestamp: Utc::now(),
    }
}
