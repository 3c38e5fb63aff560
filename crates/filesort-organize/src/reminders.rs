//! File reminders
//!
//! `ReminderService` stores reminders and, while the daemon runs, checks for
//! due ones on a fixed interval. Each due reminder is published once as
//! `ReminderDue` and then marked completed, even if the sink rejected it.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use filesort_core::config::RemindersConfig;
use filesort_core::domain::{OrganizerEvent, Reminder, ReminderDelay};
use filesort_core::ports::{INotificationSink, IReminderStore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Default time between checks for due reminders
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(30);

/// Schedules file reminders and fires them when due
pub struct ReminderService {
    store: Arc<dyn IReminderStore>,
    notifier: Arc<dyn INotificationSink>,
    check_interval: Duration,
}

impl ReminderService {
    pub fn new(store: Arc<dyn IReminderStore>, notifier: Arc<dyn INotificationSink>) -> Self {
        Self {
            store,
            notifier,
            check_interval: DEFAULT_CHECK_INTERVAL,
        }
    }

    pub fn with_check_interval(mut self, interval: Duration) -> Self {
        self.check_interval = interval;
        self
    }

    pub fn configure(self, config: &RemindersConfig) -> Self {
        self.with_check_interval(config.check_interval())
    }

    /// Stores a reminder for `path` that fires `delay` from now
    ///
    /// # Errors
    /// Returns the store's error if the reminder cannot be saved
    #[instrument(skip_all, fields(path = %path.display(), delay = %delay))]
    pub async fn schedule(
        &self,
        path: &Path,
        delay: ReminderDelay,
        message: Option<&str>,
    ) -> anyhow::Result<Reminder> {
        let mut reminder = Reminder::after(path, delay, Utc::now());
        if let Some(m) = message {
            reminder = reminder.with_message(m);
        }

        let id = self.store.create_reminder(&reminder).await?;
        info!(reminder = %id, due_at = %reminder.due_at(), "Reminder scheduled");
        Ok(reminder.with_id(id))
    }

    /// Publishes every reminder due at `now` and returns how many fired
    ///
    /// Store failures are logged and end the pass early; the next pass
    /// picks up whatever is still active.
    pub async fn fire_due(&self, now: DateTime<Utc>) -> usize {
        let due = match self.store.due_reminders(now).await {
            Ok(due) => due,
            Err(e) => {
                warn!(error = %e, "Failed to query due reminders");
                return 0;
            }
        };

        let mut fired = 0;
        for reminder in due {
            let Some(id) = reminder.id() else {
                continue;
            };

            let event = OrganizerEvent::ReminderDue {
                filename: reminder.filename(),
                message: reminder.text(),
            };
            if let Err(e) = self.notifier.publish(&event).await {
                warn!(reminder = %id, error = %e, "Failed to publish reminder");
            }

            if let Err(e) = self.store.complete_reminder(id).await {
                warn!(reminder = %id, error = %e, "Failed to complete reminder");
                break;
            }
            debug!(reminder = %id, file = %reminder.file_path().display(), "Reminder fired");
            fired += 1;
        }
        fired
    }

    /// Checks for due reminders until `shutdown` is cancelled
    ///
    /// The first check happens immediately, so reminders that came due while
    /// the daemon was stopped fire on startup.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.check_interval.as_secs(),
            "Reminder service starting"
        );

        let mut timer = tokio::time::interval(self.check_interval);
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => break,

                _ = timer.tick() => {
                    let fired = self.fire_due(Utc::now()).await;
                    if fired > 0 {
                        info!(fired, "Reminders fired");
                    }
                }
            }
        }

        info!("Reminder service stopped");
    }
}
