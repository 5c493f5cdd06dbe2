//! Declarative entity model: scalar values, field rules, schemas, records.
//!
//! # Responsibility
//! - Define the canonical data structures shared by every entity kind.
//! - Keep validation declarative: one rule checker instead of per-model code.
//!
//! # Invariants
//! - Schemas are immutable after registration with a store.
//! - Record validation collects every violation in one pass.
//!
//! # See also
//! - docs/architecture/data-model.md

pub mod field;
pub mod record;
pub mod rule;
pub mod schema;
pub mod value;
