//! SQLite implementation of IAuditStore
//!
//! ## Type Mapping
//!
//! | Domain Type       | SQL Type | Strategy                                   |
//! |-------------------|----------|--------------------------------------------|
//! | RecordId          | INTEGER  | AUTOINCREMENT rowid                        |
//! | PathBuf           | TEXT     | lossy UTF-8 string                         |
//! | OperationType     | TEXT     | `as_str()` / `FromStr`                     |
//! | OperationStatus   | TEXT     | `as_str()` / `FromStr`                     |
//! | DateTime<Utc>     | TEXT     | ISO 8601 via `to_rfc3339()`                |

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use filesort_core::domain::{OperationRecord, OperationStatus, OperationType, RecordId};
use filesort_core::ports::{AuditStatistics, IAuditStore};

use crate::CacheError;

/// SQLite-backed audit store
pub struct SqliteAuditStore {
    pool: SqlitePool,
}

impl SqliteAuditStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// Helper functions
// ============================================================================

/// Parse a DateTime<Utc> from an ISO 8601 string
pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, CacheError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // SQLite's CURRENT_TIMESTAMP format
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .map_err(|e| {
            CacheError::SerializationError(format!("Failed to parse datetime '{}': {}", s, e))
        })
}

pub(crate) fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Reconstruct an OperationRecord from a database row
fn record_from_row(row: &SqliteRow) -> Result<OperationRecord, CacheError> {
    let id: i64 = row.get("id");
    let filename: String = row.get("filename");
    let original_path: String = row.get("original_path");
    let new_path: Option<String> = row.get("new_path");
    let operation_type: String = row.get("operation_type");
    let classification: Option<String> = row.get("classification");
    let confidence: Option<f64> = row.get("confidence");
    let status: String = row.get("status");
    let failure_reason: Option<String> = row.get("failure_reason");
    let timestamp: String = row.get("timestamp");

    let operation_type: OperationType = operation_type
        .parse()
        .map_err(|e| CacheError::SerializationError(format!("{e}")))?;
    let status: OperationStatus = status
        .parse()
        .map_err(|e| CacheError::SerializationError(format!("{e}")))?;

    let mut record = OperationRecord::new(operation_type, PathBuf::from(original_path))
        .with_id(RecordId::new(id))
        .with_filename(filename)
        .with_status(status)
        .with_timestamp(parse_datetime(&timestamp)?);

    if let Some(p) = new_path {
        record = record.with_new_path(p);
    }
    if let Some(c) = classification {
        record = record.with_classification(c);
    }
    if let Some(c) = confidence {
        record = record.with_confidence(c);
    }
    if let Some(r) = failure_reason {
        record = record.with_failure_reason(r);
    }
    Ok(record)
}

// ============================================================================
// IAuditStore implementation
// ============================================================================

#[async_trait::async_trait]
impl IAuditStore for SqliteAuditStore {
    async fn append(&self, record: &OperationRecord) -> anyhow::Result<RecordId> {
        let result = sqlx::query(
            "INSERT INTO file_operations \
             (filename, original_path, new_path, operation_type, classification, \
              confidence, status, timestamp) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.filename())
        .bind(path_to_string(record.original_path()))
        .bind(record.new_path().map(path_to_string))
        .bind(record.operation_type().as_str())
        .bind(record.classification())
        .bind(record.confidence())
        .bind(record.status().as_str())
        .bind(record.timestamp().to_rfc3339())
        .execute(&self.pool)
        .await?;

        let id = RecordId::new(result.last_insert_rowid());
        tracing::trace!(record = %id, op = %record.operation_type(), "Appended audit record");
        Ok(id)
    }

    async fn update_status(
        &self,
        id: RecordId,
        status: OperationStatus,
        new_path: Option<&Path>,
    ) -> anyhow::Result<()> {
        if !status.is_terminal() {
            anyhow::bail!("record {id}: cannot transition back to {status}");
        }

        let result = sqlx::query(
            "UPDATE file_operations \
             SET status = ?, new_path = COALESCE(?, new_path) \
             WHERE id = ? AND status = 'pending'",
        )
        .bind(status.as_str())
        .bind(new_path.map(path_to_string))
        .bind(id.as_i64())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            anyhow::bail!("record {id} does not exist or is no longer pending");
        }
        tracing::trace!(record = %id, %status, "Updated audit record");
        Ok(())
    }

    async fn mark_failed(&self, id: RecordId, reason: &str) -> anyhow::Result<()> {
        let result = sqlx::query(
            "UPDATE file_operations \
             SET status = 'failed', failure_reason = ? \
             WHERE id = ? AND status = 'pending'",
        )
        .bind(reason)
        .bind(id.as_i64())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            anyhow::bail!("record {id} does not exist or is no longer pending");
        }
        tracing::trace!(record = %id, reason, "Marked audit record failed");
        Ok(())
    }

    async fn recent(&self, limit: u32) -> anyhow::Result<Vec<OperationRecord>> {
        let rows = sqlx::query(
            "SELECT * FROM file_operations \
             ORDER BY timestamp DESC, id DESC LIMIT ?",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            records.push(record_from_row(row)?);
        }
        Ok(records)
    }

    async fn statistics(&self) -> anyhow::Result<AuditStatistics> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM file_operations")
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query(
            "SELECT operation_type, COUNT(*) AS n FROM file_operations \
             GROUP BY operation_type",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_type = BTreeMap::new();
        for row in &rows {
            let op: String = row.get("operation_type");
            let n: i64 = row.get("n");
            by_type.insert(op, n as u64);
        }

        let start_of_day = Utc::now()
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|d| d.and_utc().to_rfc3339())
            .unwrap_or_default();
        let (today,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM file_operations WHERE timestamp >= ?")
                .bind(&start_of_day)
                .fetch_one(&self.pool)
                .await?;

        Ok(AuditStatistics {
            total_operations: total as u64,
            by_type,
            today: today as u64,
        })
    }
}
