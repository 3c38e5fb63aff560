//! Notification sink port (driven/secondary port)
//!
//! Organizer events flow out through this port. Adapters decide how to
//! surface them: desktop toasts, log lines, or nothing at all.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because delivery failures are adapter-specific.
//! - Publishing is fire-and-forget; callers log and ignore failures.

use serde::{Deserialize, Serialize};

use crate::domain::OrganizerEvent;

// ============================================================================
// Notification struct and NotificationPriority enum
// ============================================================================

/// Priority level for a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationPriority {
    /// Low priority, may not be shown immediately
    Low,
    /// Normal priority, shown in the notification area
    #[default]
    Normal,
    /// High priority, may trigger a banner or sound
    High,
}

impl std::fmt::Display for NotificationPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NotificationPriority::Low => "low",
            NotificationPriority::Normal => "normal",
            NotificationPriority::High => "high",
        };
        write!(f, "{}", s)
    }
}

/// Rendered, user-facing form of an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub priority: NotificationPriority,
    /// Grouping key: "organize", "review", "error", "reorganize" or "reminder"
    pub category: String,
}

impl Notification {
    /// Creates a notification with `Normal` priority and no category
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            priority: NotificationPriority::Normal,
            category: String::new(),
        }
    }

    pub fn with_priority(mut self, priority: NotificationPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}

impl From<&OrganizerEvent> for Notification {
    fn from(event: &OrganizerEvent) -> Self {
        match event {
            OrganizerEvent::FileOrganized {
                filename,
                to_folder,
                ..
            } => Notification::new("File Organized", format!("{filename} → {to_folder}/"))
                .with_category("organize"),
            OrganizerEvent::FileNeedsReview { filename } => Notification::new(
                "File Needs Review",
                format!("Not sure where to put: {filename}"),
            )
            .with_category("review"),
            OrganizerEvent::ProcessingError { filename, reason } => {
                Notification::new("Error Processing File", format!("{filename}: {reason}"))
                    .with_priority(NotificationPriority::High)
                    .with_category("error")
            }
            OrganizerEvent::ReorganizationProgress {
                completed,
                total,
                percentage,
            } => Notification::new(
                "Reorganizing",
                format!("{percentage}% complete ({completed}/{total})"),
            )
            .with_priority(NotificationPriority::Low)
            .with_category("reorganize"),
            OrganizerEvent::ReorganizationComplete {
                files_moved,
                folders_created,
            } => Notification::new(
                "Reorganization Complete",
                format!("Moved {files_moved} files, created {folders_created} folders"),
            )
            .with_category("reorganize"),
            OrganizerEvent::ReminderDue { filename, message } => {
                Notification::new("File Reminder", format!("{message} ({filename})"))
                    .with_priority(NotificationPriority::High)
                    .with_category("reminder")
            }
        }
    }
}

// ============================================================================
// INotificationSink trait
// ============================================================================

/// Port trait for publishing organizer events
///
/// Implementations should treat a missing delivery channel as a no-op
/// rather than an error where possible.
#[async_trait::async_trait]
pub trait INotificationSink: Send + Sync {
    /// Publishes one event
    async fn publish(&self, event: &OrganizerEvent) -> anyhow::Result<()>;
}
