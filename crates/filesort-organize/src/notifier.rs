//! Notification sink that writes events to the log
//!
//! Desktop delivery lives outside this workspace. The daemon and the CLI use
//! this sink so every event still ends up somewhere a user can see it.

use async_trait::async_trait;
use filesort_core::domain::OrganizerEvent;
use filesort_core::ports::{INotificationSink, Notification, NotificationPriority};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl TracingNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl INotificationSink for TracingNotifier {
    async fn publish(&self, event: &OrganizerEvent) -> anyhow::Result<()> {
        let n = Notification::from(event);
        match n.priority {
            NotificationPriority::High => warn!(
                event = event.kind(),
                category = %n.category,
                title = %n.title,
                "{}",
                n.body
            ),
            _ => info!(
                event = event.kind(),
                category = %n.category,
                title = %n.title,
                "{}",
                n.body
            ),
        }
        Ok(())
    }
}
