//! In-crate mock ports shared by the engine, executor and loop tests

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use chrono::{DateTime, Utc};
use filesort_core::domain::{
    ClassificationResult, FileDescriptor, OperationRecord, OperationStatus, OrganizerEvent,
    RecordId, Reminder, ReminderId, ReminderStatus,
};
use filesort_core::ports::{
    AuditStatistics, FolderHints, IAuditStore, IClassifier, INotificationSink, IReminderStore,
    ProviderError,
};

/// Audit store that keeps records in memory, in insertion order
#[derive(Default)]
pub struct RecordingStore {
    records: Mutex<Vec<OperationRecord>>,
}

impl RecordingStore {
    pub fn records(&self) -> Vec<OperationRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl IAuditStore for RecordingStore {
    async fn append(&self, record: &OperationRecord) -> anyhow::Result<RecordId> {
        let mut records = self.records.lock().unwrap();
        let id = RecordId::new(records.len() as i64 + 1);
        records.push(record.clone().with_id(id));
        Ok(id)
    }

    async fn update_status(
        &self,
        id: RecordId,
        status: OperationStatus,
        new_path: Option<&Path>,
    ) -> anyhow::Result<()> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id() == Some(id))
            .ok_or_else(|| anyhow::anyhow!("no record {id}"))?;
        record.transition(status)?;
        if let Some(p) = new_path {
            *record = record.clone().with_new_path(p);
        }
        Ok(())
    }

    async fn mark_failed(&self, id: RecordId, reason: &str) -> anyhow::Result<()> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id() == Some(id))
            .ok_or_else(|| anyhow::anyhow!("no record {id}"))?;
        record.transition(OperationStatus::Failed)?;
        *record = record.clone().with_failure_reason(reason);
        Ok(())
    }

    async fn recent(&self, limit: u32) -> anyhow::Result<Vec<OperationRecord>> {
        let mut all = self.records();
        all.reverse();
        all.truncate(limit as usize);
        Ok(all)
    }

    async fn statistics(&self) -> anyhow::Result<AuditStatistics> {
        Ok(AuditStatistics::default())
    }
}

/// Notification sink that remembers every event
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<OrganizerEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<OrganizerEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl INotificationSink for RecordingSink {
    async fn publish(&self, event: &OrganizerEvent) -> anyhow::Result<()> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Reminder store backed by a vector
#[derive(Default)]
pub struct RecordingReminders {
    reminders: Mutex<Vec<Reminder>>,
}

impl RecordingReminders {
    pub fn reminders(&self) -> Vec<Reminder> {
        self.reminders.lock().unwrap().clone()
    }
}

#[async_trait]
impl IReminderStore for RecordingReminders {
    async fn create_reminder(&self, reminder: &Reminder) -> anyhow::Result<ReminderId> {
        let mut reminders = self.reminders.lock().unwrap();
        let id = ReminderId::new(reminders.len() as i64 + 1);
        reminders.push(reminder.clone().with_id(id));
        Ok(id)
    }

    async fn due_reminders(&self, now: DateTime<Utc>) -> anyhow::Result<Vec<Reminder>> {
        let mut due: Vec<_> = self
            .reminders()
            .into_iter()
            .filter(|r| r.is_due(now))
            .collect();
        due.sort_by_key(|r| r.due_at());
        Ok(due)
    }

    async fn active_reminders(&self) -> anyhow::Result<Vec<Reminder>> {
        Ok(self
            .reminders()
            .into_iter()
            .filter(|r| r.status() == ReminderStatus::Active)
            .collect())
    }

    async fn complete_reminder(&self, id: ReminderId) -> anyhow::Result<()> {
        let mut reminders = self.reminders.lock().unwrap();
        let reminder = reminders
            .iter_mut()
            .find(|r| r.id() == Some(id) && r.status() == ReminderStatus::Active)
            .ok_or_else(|| anyhow::anyhow!("no active reminder {id}"))?;
        *reminder = reminder.clone().with_status(ReminderStatus::Completed);
        Ok(())
    }
}

/// What a [`ScriptedClassifier`] does on every call
pub enum Script {
    Return(ClassificationResult),
    Fail,
    Hang,
}

/// Classifier with a fixed answer
pub struct ScriptedClassifier {
    script: Script,
    calls: Mutex<Vec<String>>,
}

impl ScriptedClassifier {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn returning(result: ClassificationResult) -> Self {
        Self::new(Script::Return(result))
    }

    /// Names of the files this classifier was asked about
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl IClassifier for ScriptedClassifier {
    async fn classify(
        &self,
        descriptor: &FileDescriptor,
        _hints: &FolderHints,
    ) -> Result<ClassificationResult, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push(descriptor.name().to_string());
        match &self.script {
            Script::Return(result) => Ok(result.clone()),
            Script::Fail => Err(ProviderError::Status {
                status: 500,
                message: "internal error".to_string(),
            }),
            Script::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(ProviderError::Request("unreachable".to_string()))
            }
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
