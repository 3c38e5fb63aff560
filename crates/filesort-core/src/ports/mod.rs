//! Port definitions (hexagonal architecture interfaces)
//!
//! Ports are interfaces that the organizer depends on, but whose
//! implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IClassifier`] - Suggests a destination for a file
//! - [`IAuditStore`] - Persistent log of operation records
//! - [`INotificationSink`] - Receives organizer events
//! - [`IReminderStore`] - Pending file reminders

pub mod audit_store;
pub mod classifier;
pub mod notification;
pub mod reminder_store;

pub use audit_store::{AuditStatistics, IAuditStore};
pub use classifier::{FolderHints, IClassifier, ProviderError, DEFAULT_HINT_LIMIT};
pub use notification::{INotificationSink, Notification, NotificationPriority};
pub use reminder_store::IReminderStore;
