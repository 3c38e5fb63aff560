//! SQLite implementation of IReminderStore
//!
//! Reminders share the audit database. Times are stored as fixed-width
//! RFC 3339 UTC strings so they sort chronologically as text.

use std::path::PathBuf;

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use filesort_core::domain::{Reminder, ReminderId, ReminderStatus};
use filesort_core::ports::IReminderStore;

use crate::repository::{parse_datetime, path_to_string};
use crate::CacheError;

/// SQLite-backed reminder store
pub struct SqliteReminderStore {
    pool: SqlitePool,
}

impl SqliteReminderStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn reminder_from_row(row: &SqliteRow) -> Result<Reminder, CacheError> {
    let id: i64 = row.get("id");
    let file_path: String = row.get("file_path");
    let due_at: String = row.get("due_at");
    let message: Option<String> = row.get("message");
    let status: String = row.get("status");
    let created_at: String = row.get("created_at");

    let status: ReminderStatus = status
        .parse()
        .map_err(|e| CacheError::SerializationError(format!("{e}")))?;

    let mut reminder = Reminder::new(PathBuf::from(file_path), parse_datetime(&due_at)?)
        .with_id(ReminderId::new(id))
        .with_status(status)
        .with_created_at(parse_datetime(&created_at)?);
    if let Some(m) = message {
        reminder = reminder.with_message(m);
    }
    Ok(reminder)
}

fn reminders_from_rows(rows: &[SqliteRow]) -> Result<Vec<Reminder>, CacheError> {
    rows.iter().map(reminder_from_row).collect()
}

#[async_trait::async_trait]
impl IReminderStore for SqliteReminderStore {
    async fn create_reminder(&self, reminder: &Reminder) -> anyhow::Result<ReminderId> {
        let result = sqlx::query(
            "INSERT INTO reminders (file_path, due_at, message, status, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(path_to_string(reminder.file_path()))
        .bind(timestamp(reminder.due_at()))
        .bind(reminder.message())
        .bind(reminder.status().as_str())
        .bind(timestamp(reminder.created_at()))
        .execute(&self.pool)
        .await?;

        let id = ReminderId::new(result.last_insert_rowid());
        tracing::trace!(reminder = %id, due_at = %reminder.due_at(), "Stored reminder");
        Ok(id)
    }

    async fn due_reminders(&self, now: DateTime<Utc>) -> anyhow::Result<Vec<Reminder>> {
        let rows = sqlx::query(
            "SELECT * FROM reminders \
             WHERE status = 'active' AND due_at <= ? \
             ORDER BY due_at, id",
        )
        .bind(timestamp(now))
        .fetch_all(&self.pool)
        .await?;

        Ok(reminders_from_rows(&rows)?)
    }

    async fn active_reminders(&self) -> anyhow::Result<Vec<Reminder>> {
        let rows = sqlx::query(
            "SELECT * FROM reminders WHERE status = 'active' ORDER BY due_at, id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(reminders_from_rows(&rows)?)
    }

    async fn complete_reminder(&self, id: ReminderId) -> anyhow::Result<()> {
        let result = sqlx::query(
            "UPDATE reminders SET status = 'completed' \
             WHERE id = ? AND status = 'active'",
        )
        .bind(id.as_i64())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            anyhow::bail!("reminder {id} does not exist or has already fired");
        }
        tracing::trace!(reminder = %id, "Completed reminder");
        Ok(())
    }
}
