//! Reminder store port (driven/secondary port)
//!
//! Persists file reminders until they fire. A reminder moves from `active`
//! to `completed` exactly once, after its notification has been published.

use chrono::{DateTime, Utc};

use crate::domain::{Reminder, ReminderId};

/// Port trait for persisting file reminders
#[async_trait::async_trait]
pub trait IReminderStore: Send + Sync {
    /// Stores an active reminder and returns its assigned id
    async fn create_reminder(&self, reminder: &Reminder) -> anyhow::Result<ReminderId>;

    /// Active reminders whose due time is at or before `now`, earliest first
    async fn due_reminders(&self, now: DateTime<Utc>) -> anyhow::Result<Vec<Reminder>>;

    /// Every reminder that has not fired yet, earliest first
    async fn active_reminders(&self) -> anyhow::Result<Vec<Reminder>>;

    /// Marks an active reminder completed
    ///
    /// Implementations must refuse to complete a reminder twice.
    async fn complete_reminder(&self, id: ReminderId) -> anyhow::Result<()>;
}
