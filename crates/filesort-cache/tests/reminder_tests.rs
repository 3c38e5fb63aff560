//! Integration tests for SqliteReminderStore
//!
//! Every test gets its own in-memory database.

use std::path::Path;

use chrono::{Duration, TimeZone, Utc};

use filesort_cache::{DatabasePool, SqliteReminderStore};
use filesort_core::domain::{Reminder, ReminderDelay, ReminderId, ReminderStatus};
use filesort_core::ports::IReminderStore;

async fn setup() -> SqliteReminderStore {
    let pool = DatabasePool::in_memory()
        .await
        .expect("Failed to create in-memory database");
    SqliteReminderStore::new(pool.pool().clone())
}

#[tokio::test]
async fn test_create_round_trips_fields() {
    let store = setup().await;
    let created = Utc.with_ymd_and_hms(2024, 3, 9, 14, 0, 0).unwrap();
    let reminder = Reminder::after("/dl/lease.pdf", ReminderDelay::ONE_HOUR, created)
        .with_message("Sign and return");

    let id = store.create_reminder(&reminder).await.unwrap();

    let active = store.active_reminders().await.unwrap();
    assert_eq!(active.len(), 1);
    let r = &active[0];
    assert_eq!(r.id(), Some(id));
    assert_eq!(r.file_path(), Path::new("/dl/lease.pdf"));
    assert_eq!(r.due_at(), Utc.with_ymd_and_hms(2024, 3, 9, 15, 0, 0).unwrap());
    assert_eq!(r.created_at(), created);
    assert_eq!(r.message(), Some("Sign and return"));
    assert_eq!(r.status(), ReminderStatus::Active);
}

#[tokio::test]
async fn test_due_reminders_only_returns_past_due_in_order() {
    let store = setup().await;
    let now = Utc::now();

    let late = Reminder::new("/dl/late.pdf", now - Duration::minutes(5));
    let later = Reminder::new("/dl/later.pdf", now - Duration::minutes(1));
    let future = Reminder::new("/dl/future.pdf", now + Duration::minutes(30));
    store.create_reminder(&later).await.unwrap();
    store.create_reminder(&future).await.unwrap();
    store.create_reminder(&late).await.unwrap();

    let due = store.due_reminders(now).await.unwrap();
    let names: Vec<_> = due.iter().map(|r| r.filename()).collect();
    assert_eq!(names, vec!["late.pdf", "later.pdf"]);

    assert_eq!(store.active_reminders().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_completed_reminder_is_no_longer_due() {
    let store = setup().await;
    let now = Utc::now();
    let id = store
        .create_reminder(&Reminder::new("/dl/a.pdf", now - Duration::minutes(1)))
        .await
        .unwrap();

    store.complete_reminder(id).await.unwrap();

    assert!(store.due_reminders(now).await.unwrap().is_empty());
    assert!(store.active_reminders().await.unwrap().is_empty());
    assert!(store.complete_reminder(id).await.is_err());
}

#[tokio::test]
async fn test_complete_unknown_reminder_fails() {
    let store = setup().await;
    assert!(store.complete_reminder(ReminderId::new(42)).await.is_err());
}

#[tokio::test]
async fn test_blank_message_falls_back_to_generic_text() {
    let store = setup().await;
    store
        .create_reminder(&Reminder::new("/dl/x.zip", Utc::now()).with_message(""))
        .await
        .unwrap();

    let r = &store.active_reminders().await.unwrap()[0];
    assert_eq!(r.message(), None);
    assert_eq!(r.text(), "Check file: x.zip");
}
