//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls and rotation decisions into use-case APIs.
//! - Keep callers (CLI, schedulers) decoupled from storage details.

pub mod rotation_service;
