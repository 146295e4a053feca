//! Rotation run orchestration.
//!
//! # Responsibility
//! - Run the rotation engine once for every rotation-enabled task.
//! - Persist each decision as a new `pending` assignment dated `now`.
//! - Produce a per-task report; one task's failure never aborts the run.
//!
//! # Invariants
//! - At most one assignment per task and calendar day: a task whose latest
//!   assignment is dated on or after `now` is left untouched.
//! - Tasks are processed sequentially, in task source order.
//! - When the run deadline passes, remaining tasks are reported `NotRun`.

use crate::config::RotationConfig;
use crate::model::assignment::{Assignment, AssignmentId, NewAssignment};
use crate::model::task::{Task, TaskId};
use crate::repo::assignment_repo::AssignmentHistoryStore;
use crate::repo::error::RepoError;
use crate::repo::family_repo::MembershipProvider;
use crate::repo::task_repo::TaskSource;
use crate::rotation::engine::{RotationEngine, RotationError};
use chrono::NaiveDate;
use log::{error, info, warn};
use serde::Serialize;
use std::time::Instant;

/// Why a task could not be rotated in this run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum RotationFailure {
    /// Store unavailable or write rejected.
    Persistence(String),
    /// History references a member that cannot be resolved, or stored rows
    /// are corrupt.
    InconsistentHistory(String),
}

/// Result of one task within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskOutcome {
    /// A new assignment was written.
    Assigned { assignment: Assignment },
    /// The task already has an assignment for the run date.
    AlreadyAssigned { assignment_uuid: AssignmentId },
    /// The family has no members.
    SkippedNoMembers,
    Failed { failure: RotationFailure },
    /// The run deadline passed before this task was started.
    NotRun,
}

/// One report line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskRunOutcome {
    pub task_uuid: TaskId,
    pub task_title: String,
    pub outcome: TaskOutcome,
}

/// Complete outcome of one rotation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub run_date: NaiveDate,
    /// Set when the task list itself could not be loaded.
    pub task_listing_error: Option<String>,
    pub outcomes: Vec<TaskRunOutcome>,
}

impl RunReport {
    fn empty(run_date: NaiveDate) -> Self {
        Self {
            run_date,
            task_listing_error: None,
            outcomes: Vec::new(),
        }
    }

    /// Returns the outcome recorded for one task.
    pub fn outcome_for(&self, task_uuid: TaskId) -> Option<&TaskOutcome> {
        self.outcomes
            .iter()
            .find(|line| line.task_uuid == task_uuid)
            .map(|line| &line.outcome)
    }

    pub fn assigned_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, TaskOutcome::Assigned { .. }))
    }

    pub fn already_assigned_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, TaskOutcome::AlreadyAssigned { .. }))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, TaskOutcome::SkippedNoMembers))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, TaskOutcome::Failed { .. }))
    }

    pub fn not_run_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, TaskOutcome::NotRun))
    }

    /// True when nothing failed and every task was reached.
    pub fn is_clean(&self) -> bool {
        self.task_listing_error.is_none() && self.failed_count() == 0 && self.not_run_count() == 0
    }

    fn count(&self, predicate: impl Fn(&TaskOutcome) -> bool) -> usize {
        self.outcomes
            .iter()
            .filter(|line| predicate(&line.outcome))
            .count()
    }
}

/// Orchestrates one rotation run over injected collaborators.
pub struct RotationService<T, M, H>
where
    T: TaskSource,
    M: MembershipProvider,
    H: AssignmentHistoryStore,
{
    tasks: T,
    members: M,
    history: H,
    engine: RotationEngine,
    config: RotationConfig,
}

impl<T, M, H> RotationService<T, M, H>
where
    T: TaskSource,
    M: MembershipProvider,
    H: AssignmentHistoryStore,
{
    pub fn new(tasks: T, members: M, history: H, config: RotationConfig) -> Self {
        Self {
            tasks,
            members,
            history,
            engine: RotationEngine::new(config.missing_assignee_policy),
            config,
        }
    }

    /// Rotates every rotation-enabled task for `now`.
    ///
    /// Never fails as a whole; every problem is recorded in the report.
    pub fn run(&self, now: NaiveDate) -> RunReport {
        let started_at = Instant::now();
        info!("event=rotation_run module=rotation status=start run_date={now}");

        let mut report = RunReport::empty(now);
        let tasks = match self.tasks.list_rotation_enabled_tasks() {
            Ok(tasks) => tasks,
            Err(err) => {
                error!(
                    "event=rotation_run module=rotation status=error run_date={} error_code=task_listing_failed error={}",
                    now, err
                );
                report.task_listing_error = Some(err.to_string());
                return report;
            }
        };

        let deadline = self.config.max_run_duration();
        for task in &tasks {
            let outcome = match deadline {
                Some(limit) if started_at.elapsed() >= limit => TaskOutcome::NotRun,
                _ => self.rotate_task(task, now),
            };
            log_task_outcome(task, &outcome);
            report.outcomes.push(TaskRunOutcome {
                task_uuid: task.task_uuid,
                task_title: task.title.clone(),
                outcome,
            });
        }

        info!(
            "event=rotation_run module=rotation status=ok run_date={} duration_ms={} tasks={} assigned={} already_assigned={} skipped={} failed={} not_run={}",
            now,
            started_at.elapsed().as_millis(),
            report.outcomes.len(),
            report.assigned_count(),
            report.already_assigned_count(),
            report.skipped_count(),
            report.failed_count(),
            report.not_run_count()
        );
        report
    }

    fn rotate_task(&self, task: &Task, now: NaiveDate) -> TaskOutcome {
        let members = match self
            .members
            .list_members_ordered_by_birth_date(task.family_uuid)
        {
            Ok(members) => members,
            Err(err) => return failed(RotationFailure::Persistence(err.to_string())),
        };

        let last = match self.history.latest_assignment(task.task_uuid) {
            Ok(last) => last,
            Err(err) => return history_read_failure(err),
        };

        if let Some(existing) = last.as_ref().filter(|last| last.scheduled_date >= now) {
            return TaskOutcome::AlreadyAssigned {
                assignment_uuid: existing.assignment_uuid,
            };
        }

        let decision = match self.engine.decide(&members, last.as_ref()) {
            Ok(decision) => decision,
            Err(RotationError::NoEligibleMember) => return TaskOutcome::SkippedNoMembers,
            Err(err @ RotationError::AssigneeNotMember(_)) => {
                return failed(RotationFailure::InconsistentHistory(err.to_string()));
            }
        };

        let new_assignment = NewAssignment {
            task_uuid: task.task_uuid,
            member_uuid: decision.assignee,
            scheduled_date: now,
            is_rollover: decision.is_rollover,
        };
        match self.history.create_assignment(&new_assignment) {
            Ok(assignment) => TaskOutcome::Assigned { assignment },
            Err(RepoError::Duplicate(message)) => self.resolve_concurrent_write(task, message),
            Err(err) => failed(RotationFailure::Persistence(err.to_string())),
        }
    }

    // Another writer stored today's assignment between our read and insert.
    fn resolve_concurrent_write(&self, task: &Task, message: String) -> TaskOutcome {
        match self.history.latest_assignment(task.task_uuid) {
            Ok(Some(existing)) => TaskOutcome::AlreadyAssigned {
                assignment_uuid: existing.assignment_uuid,
            },
            Ok(None) => failed(RotationFailure::Persistence(message)),
            Err(err) => history_read_failure(err),
        }
    }
}

fn failed(failure: RotationFailure) -> TaskOutcome {
    TaskOutcome::Failed { failure }
}

fn history_read_failure(err: RepoError) -> TaskOutcome {
    match err {
        RepoError::InvalidData(message) => failed(RotationFailure::InconsistentHistory(message)),
        other => failed(RotationFailure::Persistence(other.to_string())),
    }
}

fn log_task_outcome(task: &Task, outcome: &TaskOutcome) {
    match outcome {
        TaskOutcome::Assigned { assignment } => info!(
            "event=rotation_task module=rotation status=assigned task_uuid={} member_uuid={} is_rollover={}",
            task.task_uuid, assignment.member_uuid, assignment.is_rollover
        ),
        TaskOutcome::AlreadyAssigned { assignment_uuid } => info!(
            "event=rotation_task module=rotation status=already_assigned task_uuid={} assignment_uuid={}",
            task.task_uuid, assignment_uuid
        ),
        TaskOutcome::SkippedNoMembers => warn!(
            "event=rotation_task module=rotation status=skipped task_uuid={} reason=no_eligible_member",
            task.task_uuid
        ),
        TaskOutcome::Failed { failure } => {
            let (code, message) = match failure {
                RotationFailure::Persistence(message) => ("persistence_failure", message),
                RotationFailure::InconsistentHistory(message) => {
                    ("inconsistent_history", message)
                }
            };
            error!(
                "event=rotation_task module=rotation status=error task_uuid={} error_code={} error={}",
                task.task_uuid, code, message
            );
        }
        TaskOutcome::NotRun => warn!(
            "event=rotation_task module=rotation status=not_run task_uuid={} reason=run_deadline_exceeded",
            task.task_uuid
        ),
    }
}
