//! Referential relationships between entity kinds.
//!
//! # Responsibility
//! - Declare one-to-many and many-to-many edges and their delete policies.
//! - Validate declarations against registered schemas up front.
//!
//! # Invariants
//! - Both endpoint schemas must exist before a relation registers.
//! - Delete-policy enforcement is a first-class, testable algorithm in the
//!   store, not implicit framework behavior.
//!
//! # See also
//! - docs/architecture/data-model.md

pub mod registry;
