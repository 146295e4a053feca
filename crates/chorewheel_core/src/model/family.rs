//! Family and member domain model.
//!
//! # Responsibility
//! - Define the household group that owns rotation tasks.
//! - Define the member shape consumed by the rotation engine.
//!
//! # Invariants
//! - A family's member list is totally ordered: `birth_date ASC`, then
//!   `member_uuid ASC` as tie-break.
//! - `family_uuid = None` means the member has left their family.

use crate::model::validation::{normalize_required, ModelValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable family identifier.
pub type FamilyId = Uuid;

/// Stable member identifier.
pub type MemberId = Uuid;

/// Household group that owns tasks and members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Family {
    pub family_uuid: FamilyId,
    pub name: String,
}

impl Family {
    /// Creates a family with a generated id.
    ///
    /// # Errors
    /// - `BlankField("name")` when `name` is empty after trim.
    pub fn new(name: impl Into<String>) -> Result<Self, ModelValidationError> {
        Ok(Self {
            family_uuid: Uuid::new_v4(),
            name: normalize_required("name", name.into())?,
        })
    }
}

/// One person who can receive rotation assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub member_uuid: MemberId,
    pub display_name: String,
    pub birth_date: NaiveDate,
    /// Current family, if any.
    pub family_uuid: Option<FamilyId>,
}

impl Member {
    /// Creates a member with a generated id.
    pub fn new(
        display_name: impl Into<String>,
        birth_date: NaiveDate,
        family_uuid: Option<FamilyId>,
    ) -> Result<Self, ModelValidationError> {
        Self::with_id(Uuid::new_v4(), display_name, birth_date, family_uuid)
    }

    /// Creates a member with a caller-provided stable id.
    pub fn with_id(
        member_uuid: MemberId,
        display_name: impl Into<String>,
        birth_date: NaiveDate,
        family_uuid: Option<FamilyId>,
    ) -> Result<Self, ModelValidationError> {
        Ok(Self {
            member_uuid,
            display_name: normalize_required("display_name", display_name.into())?,
            birth_date,
            family_uuid,
        })
    }
}
