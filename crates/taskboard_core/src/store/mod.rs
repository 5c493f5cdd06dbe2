//! In-memory entity store: tables, indexes, locking, change events.
//!
//! # Responsibility
//! - Own every entity table and join set behind bounded-wait locks.
//! - Enforce schema validation and relationship constraints on every write.
//!
//! # Invariants
//! - Writes validate inside the lock scope (validate-then-write is one
//!   mutual-exclusion scope, released on every exit path).
//! - Locks are acquired in a fixed global order: tables alphabetically,
//!   then join sets alphabetically.
//! - Change events are delivered after locks are released and observer
//!   failures never reach the mutating caller.
//!
//! # See also
//! - docs/architecture/data-model.md

pub mod entity_store;
pub mod events;
mod table;

pub use entity_store::{EntityStore, StoreConfig, StoreError, StoreResult};
pub use events::{AuditLogObserver, ChangeEvent, ChangeObserver, ChangeOp};
