//! Household task rotation core.
//!
//! Assigns recurring family tasks in birth-date order, keeping a task with
//! the same member while their assignment stays incomplete.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod rotation;
pub mod service;

pub use config::RotationConfig;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::assignment::{Assignment, AssignmentId, AssignmentStatus, NewAssignment};
pub use model::family::{Family, FamilyId, Member, MemberId};
pub use model::task::{Task, TaskId, DEFAULT_FREQUENCY_DAYS};
pub use model::validation::ModelValidationError;
pub use repo::assignment_repo::{AssignmentHistoryStore, SqliteAssignmentRepository};
pub use repo::error::{RepoError, RepoResult};
pub use repo::family_repo::{MembershipProvider, SqliteFamilyRepository};
pub use repo::task_repo::{SqliteTaskRepository, TaskSource};
pub use rotation::engine::{
    AssignmentDecision, DecisionReason, MissingAssigneePolicy, RotationEngine, RotationError,
};
pub use service::rotation_service::{
    RotationFailure, RotationService, RunReport, TaskOutcome, TaskRunOutcome,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
