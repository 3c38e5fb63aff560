//! Events published by the placement engine, the plan executor and the
//! reminder service

use serde::{Deserialize, Serialize};

/// Something the user may want to hear about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OrganizerEvent {
    /// A watched file was moved automatically
    FileOrganized {
        filename: String,
        from_folder: String,
        to_folder: String,
    },
    /// A watched file was left in place because confidence was too low
    FileNeedsReview { filename: String },
    /// Placement of a watched file failed; the file was not touched
    ProcessingError { filename: String, reason: String },
    /// A migration run crossed a progress threshold
    ReorganizationProgress {
        completed: usize,
        total: usize,
        percentage: u8,
    },
    /// A migration run finished
    ReorganizationComplete {
        files_moved: usize,
        folders_created: usize,
    },
    /// A file reminder came due
    ReminderDue { filename: String, message: String },
}

impl OrganizerEvent {
    /// Short machine name, used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            OrganizerEvent::FileOrganized { .. } => "file_organized",
            OrganizerEvent::FileNeedsReview { .. } => "file_needs_review",
            OrganizerEvent::ProcessingError { .. } => "processing_error",
            OrganizerEvent::ReorganizationProgress { .. } => "reorganization_progress",
            OrganizerEvent::ReorganizationComplete { .. } => "reorganization_complete",
            OrganizerEvent::ReminderDue { .. } => "reminder_due",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = OrganizerEvent::ReorganizationProgress {
            completed: 5,
            total: 10,
            percentage: 50,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "reorganization_progress");
        assert_eq!(json["percentage"], 50);
        assert_eq!(event.kind(), "reorganization_progress");
    }

    #[test]
    fn test_review_event_carries_only_the_filename() {
        let event = OrganizerEvent::FileNeedsReview {
            filename: "memo.docx".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "event": "file_needs_review", "filename": "memo.docx" })
        );
    }
}
