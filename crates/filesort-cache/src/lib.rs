//! filesort cache - Local persistence of the audit trail
//!
//! ## Architecture
//!
//! This crate implements the `IAuditStore` and `IReminderStore` ports from
//! `filesort-core` using SQLite as the storage backend. It is a driven (secondary) adapter
//! in the hexagonal architecture.
//!
//! ## Key Components
//!
//! - [`DatabasePool`] - Connection pool with migration support
//! - [`SqliteAuditStore`] - `IAuditStore` implementation
//! - [`SqliteReminderStore`] - `IReminderStore` implementation
//! - [`CacheError`] - Error types for cache operations
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use filesort_cache::{DatabasePool, SqliteAuditStore};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let pool = DatabasePool::new(Path::new("/home/user/.local/share/filesort/filesort.db")).await?;
//! let store = SqliteAuditStore::new(pool.pool().clone());
//! // Use store as IAuditStore...
//! # Ok(())
//! # }
//! ```

pub mod pool;
pub mod reminders;
pub mod repository;

pub use pool::DatabasePool;
pub use reminders::SqliteReminderStore;
pub use repository::SqliteAuditStore;

/// Errors that can occur during cache operations
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Failed to establish a database connection
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A database query failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Schema migration failed
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// A stored value could not be mapped back to a domain type
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<sqlx::Error> for CacheError {
    fn from(e: sqlx::Error) -> Self {
        CacheError::QueryFailed(e.to_string())
    }
}
