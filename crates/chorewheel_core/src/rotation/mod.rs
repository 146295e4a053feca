//! Rotation decision logic.
//!
//! # Responsibility
//! - Decide who receives a task next from the ordered member list and the
//!   task's latest assignment.
//!
//! # Invariants
//! - Decisions are pure: no I/O, no clock, no shared state.

pub mod engine;
