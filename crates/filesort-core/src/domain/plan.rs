//! Migration plans: ordered batches of filesystem operations
//!
//! Plans arrive as JSON arrays of `{action, source?, destination?, reason?}`
//! entries. A plan is validated as a whole before any operation runs.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::paths::expand_tilde;

/// Errors raised while parsing or validating a plan
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Malformed plan: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Operation {index} ({action}): missing required field '{field}'")]
    MissingField {
        index: usize,
        action: PlanAction,
        field: &'static str,
    },
}

/// Action tag of a plan entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanAction {
    Move,
    Create,
    Archive,
}

impl std::fmt::Display for PlanAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PlanAction::Move => "move",
            PlanAction::Create => "create",
            PlanAction::Archive => "archive",
        };
        write!(f, "{}", s)
    }
}

/// Wire shape of one plan entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub action: PlanAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// A single validated filesystem operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Operation {
    Move {
        source: PathBuf,
        destination: PathBuf,
        reason: Option<String>,
    },
    Create {
        destination: PathBuf,
    },
    Archive {
        source: PathBuf,
    },
}

impl Operation {
    pub fn action(&self) -> PlanAction {
        match self {
            Operation::Move { .. } => PlanAction::Move,
            Operation::Create { .. } => PlanAction::Create,
            Operation::Archive { .. } => PlanAction::Archive,
        }
    }

    /// Validates a wire entry, expanding `~` in its paths
    ///
    /// # Errors
    /// Returns `PlanError::MissingField` when the action's required
    /// path is absent or blank.
    pub fn from_entry(index: usize, entry: PlanEntry) -> Result<Self, PlanError> {
        let action = entry.action;
        let require = |value: Option<String>, field: &'static str| {
            value
                .filter(|v| !v.trim().is_empty())
                .map(expand_tilde)
                .ok_or(PlanError::MissingField {
                    index,
                    action,
                    field,
                })
        };

        match action {
            PlanAction::Move => Ok(Operation::Move {
                source: require(entry.source, "source")?,
                destination: require(entry.destination, "destination")?,
                reason: entry.reason,
            }),
            PlanAction::Create => Ok(Operation::Create {
                destination: require(entry.destination, "destination")?,
            }),
            PlanAction::Archive => Ok(Operation::Archive {
                source: require(entry.source, "source")?,
            }),
        }
    }
}

/// An ordered list of operations, executed without reordering
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MigrationPlan {
    operations: Vec<Operation>,
}

impl MigrationPlan {
    pub fn new(operations: Vec<Operation>) -> Self {
        Self { operations }
    }

    /// Validates every entry; a single bad entry rejects the plan
    pub fn from_entries(entries: Vec<PlanEntry>) -> Result<Self, PlanError> {
        let operations = entries
            .into_iter()
            .enumerate()
            .map(|(i, e)| Operation::from_entry(i, e))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { operations })
    }

    /// Parses a JSON array of plan entries
    ///
    /// ```
    /// use filesort_core::domain::MigrationPlan;
    ///
    /// let plan = MigrationPlan::from_json(r#"[
    ///     {"action": "create", "destination": "/tmp/school"},
    ///     {"action": "archive", "source": "/tmp/old_notes"}
    /// ]"#).unwrap();
    /// assert_eq!(plan.len(), 2);
    /// ```
    pub fn from_json(json: &str) -> Result<Self, PlanError> {
        let entries: Vec<PlanEntry> = serde_json::from_str(json)?;
        Self::from_entries(entries)
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
        self.operations.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_actions() {
        let plan = MigrationPlan::from_json(
            r#"[
                {"action": "move", "source": "/a/x.pdf", "destination": "/b/x.pdf", "reason": "tidy"},
                {"action": "create", "destination": "/b/new"},
                {"action": "archive", "source": "/a/old"}
            ]"#,
        )
        .unwrap();

        assert_eq!(plan.len(), 3);
        assert_eq!(
            plan.operations()[0],
            Operation::Move {
                source: PathBuf::from("/a/x.pdf"),
                destination: PathBuf::from("/b/x.pdf"),
                reason: Some("tidy".to_string()),
            }
        );
        assert_eq!(plan.operations()[1].action(), PlanAction::Create);
        assert_eq!(plan.operations()[2].action(), PlanAction::Archive);
    }

    #[test]
    fn test_missing_field_rejects_whole_plan() {
        let err = MigrationPlan::from_json(
            r#"[
                {"action": "create", "destination": "/ok"},
                {"action": "move", "source": "/a"}
            ]"#,
        )
        .unwrap_err();

        match err {
            PlanError::MissingField {
                index,
                action,
                field,
            } => {
                assert_eq!(index, 1);
                assert_eq!(action, PlanAction::Move);
                assert_eq!(field, "destination");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_blank_path_counts_as_missing() {
        let err = MigrationPlan::from_json(r#"[{"action": "archive", "source": "  "}]"#)
            .unwrap_err();
        assert!(matches!(err, PlanError::MissingField { field: "source", .. }));
    }

    #[test]
    fn test_unknown_action_is_malformed() {
        let err = MigrationPlan::from_json(r#"[{"action": "delete", "source": "/a"}]"#)
            .unwrap_err();
        assert!(matches!(err, PlanError::Malformed(_)));
    }

    #[test]
    fn test_tilde_is_expanded() {
        let plan =
            MigrationPlan::from_json(r#"[{"action": "create", "destination": "~/Sorted"}]"#)
                .unwrap();
        if let (Some(home), Operation::Create { destination }) =
            (dirs::home_dir(), &plan.operations()[0])
        {
            assert_eq!(destination, &home.join("Sorted"));
        }
    }

    #[test]
    fn test_empty_plan() {
        let plan = MigrationPlan::from_json("[]").unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_missing_field_message() {
        let err = PlanError::MissingField {
            index: 4,
            action: PlanAction::Archive,
            field: "source",
        };
        assert_eq!(
            err.to_string(),
            "Operation 4 (archive): missing required field 'source'"
        );
    }
}
