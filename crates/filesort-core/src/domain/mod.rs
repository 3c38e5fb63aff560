//! Domain entities and business logic
//!
//! This module contains the core domain types for filesort:
//! - File descriptors and classification results (with the fallback rules)
//! - Migration plans and their operations
//! - Operation records for the audit trail
//! - Run summaries, progress checkpoints and organizer events
//! - File reminders and their delays
//! - Domain-specific error types

pub mod classification;
pub mod descriptor;
pub mod errors;
pub mod events;
pub mod paths;
pub mod plan;
pub mod progress;
pub mod record;
pub mod reminder;
pub mod summary;

// Re-export commonly used types
pub use classification::{
    fallback_classification, Category, ClassificationMetadata, ClassificationResult,
    ClassificationSource, Confidence,
};
pub use descriptor::FileDescriptor;
pub use errors::DomainError;
pub use events::OrganizerEvent;
pub use paths::{expand_tilde, sanitize_relative};
pub use plan::{MigrationPlan, Operation, PlanAction, PlanEntry, PlanError};
pub use progress::{percentage, ProgressTracker, DEFAULT_THRESHOLDS};
pub use record::{OperationRecord, OperationStatus, OperationType, RecordId};
pub use reminder::{Reminder, ReminderDelay, ReminderId, ReminderStatus};
pub use summary::{LogEntry, RunSummary};
