//! Audit store port (driven/secondary port)
//!
//! An append-mostly log of operation records. The only mutation after
//! insertion is the single status transition of a pending record.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because storage errors are adapter-specific
//!   and don't need domain-level classification.
//! - Nothing in the core ever deletes records.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{OperationRecord, OperationStatus, RecordId};

/// Aggregate counts over the audit trail
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStatistics {
    pub total_operations: u64,
    /// Record counts keyed by operation type name
    pub by_type: BTreeMap<String, u64>,
    /// Records whose timestamp falls on the current UTC day
    pub today: u64,
}

/// Port trait for persisting operation records
#[async_trait::async_trait]
pub trait IAuditStore: Send + Sync {
    /// Appends a record and returns its assigned id
    async fn append(&self, record: &OperationRecord) -> anyhow::Result<RecordId>;

    /// Moves a pending record to `status`
    ///
    /// `new_path` is stored when given, typically when a move completes.
    /// Implementations must refuse to change a record that is no longer
    /// pending.
    async fn update_status(
        &self,
        id: RecordId,
        status: OperationStatus,
        new_path: Option<&Path>,
    ) -> anyhow::Result<()>;

    /// Moves a pending record to `failed`, keeping `reason` with it
    ///
    /// The same single-transition rule as `update_status` applies.
    async fn mark_failed(&self, id: RecordId, reason: &str) -> anyhow::Result<()>;

    /// Most recent records first, at most `limit` of them
    async fn recent(&self, limit: u32) -> anyhow::Result<Vec<OperationRecord>>;

    /// Usage statistics
    async fn statistics(&self) -> anyhow::Result<AuditStatistics>;
}
