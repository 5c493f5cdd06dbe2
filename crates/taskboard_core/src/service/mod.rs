//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into use-case level APIs.
//! - Keep callers decoupled from field-map plumbing and storage details.
//!
//! # Invariants
//! - Service APIs never bypass store validation or relationship contracts.

pub mod project_service;
pub mod task_service;
pub mod user_service;
