//! Pure rotation engine.
//!
//! # Rules
//! - Empty member list: `NoEligibleMember`, nothing is assigned.
//! - No prior assignment: oldest member (`members[0]`), not a rollover.
//! - Prior assignment not completed: same assignee, rollover. Membership is
//!   not consulted.
//! - Prior assignment completed: next member after the assignee, wrapping
//!   to the oldest after the youngest.
//! - Prior assignment completed by someone no longer in the family: resolved
//!   by `MissingAssigneePolicy`.

use crate::model::assignment::Assignment;
use crate::model::family::{Member, MemberId};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// What to do when the latest assignee is not in the member list anymore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingAssigneePolicy {
    /// Hand the task to the oldest current member.
    #[default]
    OldestMember,
    /// Restart as if the task had never been assigned.
    RestartCycle,
    /// Assign nobody and report the task as failed for this run.
    FailTask,
}

/// Why the engine picked an assignee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    FirstAssignment,
    Rollover,
    Advanced,
    /// Prior assignee left; chosen by `OldestMember`.
    AssigneeDeparted,
    /// Prior assignee left; chosen by `RestartCycle`.
    CycleRestarted,
}

/// Engine output for one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentDecision {
    pub assignee: MemberId,
    pub is_rollover: bool,
    pub reason: DecisionReason,
}

/// Conditions under which no assignee can be chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationError {
    /// The family has no members.
    NoEligibleMember,
    /// Latest assignee is not a current member and policy is `FailTask`.
    AssigneeNotMember(MemberId),
}

impl Display for RotationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoEligibleMember => write!(f, "family has no eligible member"),
            Self::AssigneeNotMember(id) => {
                write!(f, "latest assignee {id} is no longer a family member")
            }
        }
    }
}

impl Error for RotationError {}

/// Stateless decision function configured with a missing-assignee policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RotationEngine {
    policy: MissingAssigneePolicy,
}

impl RotationEngine {
    pub fn new(policy: MissingAssigneePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> MissingAssigneePolicy {
        self.policy
    }

    /// Computes the next assignment.
    ///
    /// `members` must already be in rotation order (oldest first).
    ///
    /// # Errors
    /// - `NoEligibleMember` when `members` is empty.
    /// - `AssigneeNotMember` when the latest completed assignment belongs to a
    ///   former member and the policy is `FailTask`.
    pub fn decide(
        &self,
        members: &[Member],
        last: Option<&Assignment>,
    ) -> Result<AssignmentDecision, RotationError> {
        let Some(oldest) = members.first() else {
            return Err(RotationError::NoEligibleMember);
        };

        let Some(last) = last else {
            return Ok(AssignmentDecision {
                assignee: oldest.member_uuid,
                is_rollover: false,
                reason: DecisionReason::FirstAssignment,
            });
        };

        if !last.status.is_completed() {
            return Ok(AssignmentDecision {
                assignee: last.member_uuid,
                is_rollover: true,
                reason: DecisionReason::Rollover,
            });
        }

        let Some(index) = members
            .iter()
            .position(|member| member.member_uuid == last.member_uuid)
        else {
            return self.resolve_departed(oldest, last.member_uuid);
        };

        let next = &members[(index + 1) % members.len()];
        Ok(AssignmentDecision {
            assignee: next.member_uuid,
            is_rollover: false,
            reason: DecisionReason::Advanced,
        })
    }

    fn resolve_departed(
        &self,
        oldest: &Member,
        departed: MemberId,
    ) -> Result<AssignmentDecision, RotationError> {
        let reason = match self.policy {
            MissingAssigneePolicy::OldestMember => DecisionReason::AssigneeDeparted,
            MissingAssigneePolicy::RestartCycle => DecisionReason::CycleRestarted,
            MissingAssigneePolicy::FailTask => {
                return Err(RotationError::AssigneeNotMember(departed));
            }
        };
        Ok(AssignmentDecision {
            assignee: oldest.member_uuid,
            is_rollover: false,
            reason,
        })
    }
}
