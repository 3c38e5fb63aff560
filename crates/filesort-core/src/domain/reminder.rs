//! File reminders
//!
//! A reminder asks the user to look at a file again after a delay, usually
//! one that was left for review. Presets are `30m`, `1h` and `3h`; any other
//! whole number of minutes or hours is accepted too.

use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// Store-assigned identifier of a reminder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReminderId(i64);

impl ReminderId {
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for ReminderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ReminderDelay
// ============================================================================

/// How long to wait before a reminder fires, in whole minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReminderDelay {
    minutes: u32,
}

impl ReminderDelay {
    pub const THIRTY_MINUTES: Self = Self { minutes: 30 };
    pub const ONE_HOUR: Self = Self { minutes: 60 };
    pub const THREE_HOURS: Self = Self { minutes: 180 };

    /// # Errors
    /// Returns `DomainError::ValidationFailed` for a zero delay
    pub fn from_minutes(minutes: u32) -> Result<Self, DomainError> {
        if minutes == 0 {
            return Err(DomainError::ValidationFailed(
                "reminder delay must be at least one minute".to_string(),
            ));
        }
        Ok(Self { minutes })
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    /// When a reminder created at `now` becomes due
    pub fn due_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + chrono::Duration::minutes(i64::from(self.minutes))
    }
}

impl Default for ReminderDelay {
    fn default() -> Self {
        Self::THIRTY_MINUTES
    }
}

impl Display for ReminderDelay {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.minutes % 60 == 0 {
            write!(f, "{}h", self.minutes / 60)
        } else {
            write!(f, "{}m", self.minutes)
        }
    }
}

impl FromStr for ReminderDelay {
    type Err = DomainError;

    /// Parses `30m`, `45min`, `1h`, `3hr` or a bare number of minutes
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        let (number, unit) = s.split_at(split);

        let invalid = || DomainError::UnknownValue {
            kind: "reminder delay",
            value: s.clone(),
        };

        let n: u32 = number.parse().map_err(|_| invalid())?;
        let minutes = match unit {
            "" | "m" | "min" | "mins" => n,
            "h" | "hr" | "hrs" => n.checked_mul(60).ok_or_else(invalid)?,
            _ => return Err(invalid()),
        };
        Self::from_minutes(minutes)
    }
}

// ============================================================================
// Reminder
// ============================================================================

/// Reminder lifecycle: `Active` until it has fired once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderStatus {
    Active,
    Completed,
}

impl ReminderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderStatus::Active => "active",
            ReminderStatus::Completed => "completed",
        }
    }
}

impl Display for ReminderStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReminderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ReminderStatus::Active),
            "completed" => Ok(ReminderStatus::Completed),
            other => Err(DomainError::UnknownValue {
                kind: "reminder status",
                value: other.to_string(),
            }),
        }
    }
}

/// A request to bring a file back to the user's attention
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    id: Option<ReminderId>,
    file_path: PathBuf,
    due_at: DateTime<Utc>,
    message: Option<String>,
    status: ReminderStatus,
    created_at: DateTime<Utc>,
}

impl Reminder {
    pub fn new(file_path: impl Into<PathBuf>, due_at: DateTime<Utc>) -> Self {
        Self {
            id: None,
            file_path: file_path.into(),
            due_at,
            message: None,
            status: ReminderStatus::Active,
            created_at: Utc::now(),
        }
    }

    /// Reminder for `file_path` that fires `delay` after `now`
    pub fn after(file_path: impl Into<PathBuf>, delay: ReminderDelay, now: DateTime<Utc>) -> Self {
        Self::new(file_path, delay.due_from(now)).with_created_at(now)
    }

    pub fn id(&self) -> Option<ReminderId> {
        self.id
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn filename(&self) -> String {
        self.file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.file_path.to_string_lossy().into_owned())
    }

    pub fn due_at(&self) -> DateTime<Utc> {
        self.due_at
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The custom message, or a generic one naming the file
    pub fn text(&self) -> String {
        match &self.message {
            Some(m) => m.clone(),
            None => format!("Check file: {}", self.filename()),
        }
    }

    pub fn status(&self) -> ReminderStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == ReminderStatus::Active && self.due_at <= now
    }

    pub fn with_id(mut self, id: ReminderId) -> Self {
        self.id = Some(id);
        self
    }

    /// Blank messages are dropped in favour of the generic text
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        self.message = (!message.trim().is_empty()).then_some(message);
        self
    }

    pub fn with_status(mut self, status: ReminderStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_delay_presets_parse() {
        assert_eq!("30m".parse::<ReminderDelay>().unwrap(), ReminderDelay::THIRTY_MINUTES);
        assert_eq!("30min".parse::<ReminderDelay>().unwrap(), ReminderDelay::THIRTY_MINUTES);
        assert_eq!("1h".parse::<ReminderDelay>().unwrap(), ReminderDelay::ONE_HOUR);
        assert_eq!("1hr".parse::<ReminderDelay>().unwrap(), ReminderDelay::ONE_HOUR);
        assert_eq!(" 3H ".parse::<ReminderDelay>().unwrap(), ReminderDelay::THREE_HOURS);
    }

    #[test]
    fn test_delay_custom_values() {
        assert_eq!("45".parse::<ReminderDelay>().unwrap().minutes(), 45);
        assert_eq!("2h".parse::<ReminderDelay>().unwrap().minutes(), 120);
        assert_eq!(ReminderDelay::from_minutes(90).unwrap().to_string(), "90m");
        assert_eq!(ReminderDelay::THREE_HOURS.to_string(), "3h");
    }

    #[test]
    fn test_delay_rejects_garbage() {
        for bad in ["", "0m", "soon", "5d", "m30", "-5m"] {
            assert!(bad.parse::<ReminderDelay>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_reminder_due_time_and_text() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 14, 0, 0).unwrap();
        let r = Reminder::after("/home/u/Downloads/lease.pdf", ReminderDelay::ONE_HOUR, now);

        assert_eq!(r.due_at(), Utc.with_ymd_and_hms(2024, 3, 9, 15, 0, 0).unwrap());
        assert_eq!(r.created_at(), now);
        assert_eq!(r.text(), "Check file: lease.pdf");
        assert!(!r.is_due(now));
        assert!(r.is_due(r.due_at()));

        let r = r.with_message("Sign and return");
        assert_eq!(r.text(), "Sign and return");
        assert_eq!(r.clone().with_message("  ").message(), None);
    }

    #[test]
    fn test_completed_reminder_is_never_due() {
        let now = Utc::now();
        let r = Reminder::new("/a.pdf", now).with_status(ReminderStatus::Completed);
        assert!(!r.is_due(now));
        assert_eq!("completed".parse::<ReminderStatus>().unwrap(), ReminderStatus::Completed);
        assert!("snoozed".parse::<ReminderStatus>().is_err());
    }
}
