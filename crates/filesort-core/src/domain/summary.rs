//! Result of a migration plan run

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::record::OperationType;

/// One line of the per-run operations log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub action: OperationType,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<PathBuf>,
    pub succeeded: bool,
    pub timestamp: DateTime<Utc>,
}

/// Counters and log produced by one executor run
///
/// `completed` counts processed operations, failed ones included, so a
/// finished run always has `completed == total_operations`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub total_operations: usize,
    pub completed: usize,
    pub files_moved: usize,
    pub folders_created: usize,
    pub folders_archived: usize,
    pub errors: Vec<String>,
    pub operations_log: Vec<LogEntry>,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl RunSummary {
    /// Empty summary for a run over `total_operations` operations
    pub fn new(total_operations: usize) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            total_operations,
            completed: 0,
            files_moved: 0,
            folders_created: 0,
            folders_archived: 0,
            errors: Vec::new(),
            operations_log: Vec::new(),
            started_at: Utc::now(),
            duration_ms: 0,
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.operations_log.iter().filter(|e| e.succeeded).count()
    }
}
