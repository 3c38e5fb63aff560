//! Operation records persisted to the audit store

use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// Store-assigned identifier of an operation record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(i64);

impl RecordId {
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Kind of operation a record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    Move,
    Create,
    Archive,
    /// File left in place awaiting a human decision
    Review,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Move => "move",
            OperationType::Create => "create",
            OperationType::Archive => "archive",
            OperationType::Review => "review",
        }
    }
}

impl Display for OperationType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "move" => Ok(OperationType::Move),
            "create" => Ok(OperationType::Create),
            "archive" => Ok(OperationType::Archive),
            "review" => Ok(OperationType::Review),
            other => Err(DomainError::UnknownValue {
                kind: "operation type",
                value: other.to_string(),
            }),
        }
    }
}

/// Record lifecycle: `Pending` leaves at most once for a terminal state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    Pending,
    Completed,
    Failed,
}

impl OperationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationStatus::Pending => "pending",
            OperationStatus::Completed => "completed",
            OperationStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, OperationStatus::Pending)
    }
}

impl Display for OperationStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OperationStatus::Pending),
            "completed" => Ok(OperationStatus::Completed),
            "failed" => Ok(OperationStatus::Failed),
            other => Err(DomainError::UnknownValue {
                kind: "operation status",
                value: other.to_string(),
            }),
        }
    }
}

/// One entry of the audit trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationRecord {
    id: Option<RecordId>,
    filename: String,
    original_path: PathBuf,
    new_path: Option<PathBuf>,
    operation_type: OperationType,
    classification: Option<String>,
    confidence: Option<f64>,
    status: OperationStatus,
    /// Why a failed record failed
    failure_reason: Option<String>,
    timestamp: DateTime<Utc>,
}

impl OperationRecord {
    /// Creates a pending record for `original_path`
    ///
    /// The filename is taken from the path's last component.
    pub fn new(operation_type: OperationType, original_path: impl Into<PathBuf>) -> Self {
        let original_path = original_path.into();
        let filename = original_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            id: None,
            filename,
            original_path,
            new_path: None,
            operation_type,
            classification: None,
            confidence: None,
            status: OperationStatus::Pending,
            failure_reason: None,
            timestamp: Utc::now(),
        }
    }

    pub fn id(&self) -> Option<RecordId> {
        self.id
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn original_path(&self) -> &Path {
        &self.original_path
    }

    pub fn new_path(&self) -> Option<&Path> {
        self.new_path.as_deref()
    }

    pub fn operation_type(&self) -> OperationType {
        self.operation_type
    }

    pub fn classification(&self) -> Option<&str> {
        self.classification.as_deref()
    }

    pub fn confidence(&self) -> Option<f64> {
        self.confidence
    }

    pub fn status(&self) -> OperationStatus {
        self.status
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    pub fn with_new_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.new_path = Some(path.into());
        self
    }

    pub fn with_classification(mut self, classification: impl Into<String>) -> Self {
        self.classification = Some(classification.into());
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence.clamp(0.0, 1.0));
        self
    }

    /// Sets the status directly; used when rehydrating from storage
    pub fn with_status(mut self, status: OperationStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_failure_reason(mut self, reason: impl Into<String>) -> Self {
        self.failure_reason = Some(reason.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Moves the record out of `Pending`
    ///
    /// # Errors
    /// Returns `DomainError::InvalidState` if the record is already terminal
    /// or if `status` is `Pending`.
    pub fn transition(&mut self, status: OperationStatus) -> Result<(), DomainError> {
        if self.status.is_terminal() || !status.is_terminal() {
            return Err(DomainError::InvalidState {
                from: self.status.to_string(),
                to: status.to_string(),
            });
        }
        self.status = status;
        Ok(())
    }
}
