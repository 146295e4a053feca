//! Rotation task domain model.
//!
//! # Invariants
//! - `title` is non-blank.
//! - `frequency_days >= 1`. The value is stored but does not gate rotation.

use crate::model::family::FamilyId;
use crate::model::validation::{normalize_required, ModelValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable task identifier.
pub type TaskId = Uuid;

/// Default frequency when none is given.
pub const DEFAULT_FREQUENCY_DAYS: u32 = 1;

/// Recurring household task owned by one family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub task_uuid: TaskId,
    pub family_uuid: FamilyId,
    pub title: String,
    pub description: Option<String>,
    /// Only rotation-enabled tasks are picked up by a rotation run.
    pub rotation_enabled: bool,
    /// Advisory only; every run rotates regardless of this value.
    pub frequency_days: u32,
}

impl Task {
    /// Creates a rotation-enabled daily task with a generated id.
    pub fn new(
        family_uuid: FamilyId,
        title: impl Into<String>,
    ) -> Result<Self, ModelValidationError> {
        Ok(Self {
            task_uuid: Uuid::new_v4(),
            family_uuid,
            title: normalize_required("title", title.into())?,
            description: None,
            rotation_enabled: true,
            frequency_days: DEFAULT_FREQUENCY_DAYS,
        })
    }

    /// Checks field invariants before persistence.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.title.trim().is_empty() {
            return Err(ModelValidationError::BlankField("title"));
        }
        if self.frequency_days < 1 {
            return Err(ModelValidationError::InvalidFrequencyDays(
                self.frequency_days,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Task, DEFAULT_FREQUENCY_DAYS};
    use crate::model::validation::ModelValidationError;
    use uuid::Uuid;

    #[test]
    fn new_task_defaults_to_daily_rotation() {
        let task = Task::new(Uuid::new_v4(), "Dishes").unwrap();
        assert!(task.rotation_enabled);
        assert_eq!(task.frequency_days, DEFAULT_FREQUENCY_DAYS);
        assert!(task.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_frequency() {
        let mut task = Task::new(Uuid::new_v4(), "Trash").unwrap();
        task.frequency_days = 0;
        assert_eq!(
            task.validate(),
            Err(ModelValidationError::InvalidFrequencyDays(0))
        );
    }
}
