//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the three narrow collaborator contracts a rotation run depends
//!   on: `TaskSource`, `MembershipProvider`, `AssignmentHistoryStore`.
//! - Isolate SQLite query details from rotation orchestration.
//!
//! # Invariants
//! - Repository constructors reject connections that are not fully migrated.
//! - Read paths reject invalid persisted state instead of masking it.

mod codec;
pub mod assignment_repo;
pub mod error;
pub mod family_repo;
mod schema;
pub mod task_repo;
