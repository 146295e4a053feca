//! Assignment history model.
//!
//! # Responsibility
//! - Represent one scheduled hand-off of a task to a member.
//!
//! # Invariants
//! - Assignments are append-only; only `status` changes after creation, and
//!   only through task-completion operations outside the rotation engine.
//! - At most one assignment exists per `(task_uuid, scheduled_date)`.

use crate::model::family::MemberId;
use crate::model::task::TaskId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable assignment identifier.
pub type AssignmentId = Uuid;

/// Completion state of one assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    /// Created by a rotation run, not yet acted on.
    Pending,
    /// Done by the assignee. The only status that advances rotation.
    Completed,
    /// Explicitly skipped.
    Skipped,
    /// Day passed without completion.
    Missed,
}

impl AssignmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Skipped => "skipped",
            Self::Missed => "missed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "skipped" => Some(Self::Skipped),
            "missed" => Some(Self::Missed),
            _ => None,
        }
    }

    pub fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Persisted assignment record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub assignment_uuid: AssignmentId,
    pub task_uuid: TaskId,
    pub member_uuid: MemberId,
    pub scheduled_date: NaiveDate,
    pub status: AssignmentStatus,
    /// Set when the assignee kept the task because the prior one was not
    /// completed.
    pub is_rollover: bool,
    /// Epoch ms insert timestamp. Secondary ordering key for history.
    pub created_at: i64,
}

/// Insert request for the history store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAssignment {
    pub task_uuid: TaskId,
    pub member_uuid: MemberId,
    pub scheduled_date: NaiveDate,
    pub is_rollover: bool,
}

#[cfg(test)]
mod tests {
    use super::AssignmentStatus;

    #[test]
    fn status_text_mapping_is_stable() {
        for status in [
            AssignmentStatus::Pending,
            AssignmentStatus::Completed,
            AssignmentStatus::Skipped,
            AssignmentStatus::Missed,
        ] {
            assert_eq!(AssignmentStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(AssignmentStatus::parse("done"), None);
    }

    #[test]
    fn only_completed_counts_as_completed() {
        assert!(AssignmentStatus::Completed.is_completed());
        assert!(!AssignmentStatus::Pending.is_completed());
        assert!(!AssignmentStatus::Missed.is_completed());
    }
}
