//! Domain model for families, rotation tasks and assignment history.
//!
//! # Responsibility
//! - Define canonical data structures used by the rotation engine and the
//!   persistence layer.
//!
//! # Invariants
//! - Every domain object is identified by a stable UUID.
//! - Calendar dates (`birth_date`, `scheduled_date`) carry no time zone.

pub mod assignment;
pub mod family;
pub mod task;
pub mod validation;
