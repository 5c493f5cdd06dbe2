//! Stored record shape shared by every entity kind.
//!
//! # Responsibility
//! - Carry one row: surrogate id, entity name, fields, timestamps.
//!
//! # Invariants
//! - `id` is assigned once by the owning store and never reused, so
//!   historical references stay unambiguous after deletes.
//! - `created_at`/`updated_at` are epoch milliseconds maintained by the
//!   store, never by callers.
//!
//! # See also
//! - docs/architecture/data-model.md

use crate::model::value::{FieldMap, FieldValue};
use serde::{Deserialize, Serialize};

/// Store-assigned surrogate identifier, monotonic per entity kind.
pub type RecordId = i64;

/// One stored row of an entity table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Surrogate identity, immutable after creation.
    pub id: RecordId,
    /// Owning entity kind.
    pub entity: String,
    /// Validated, normalized field values.
    pub fields: FieldMap,
    /// Creation time in epoch milliseconds.
    pub created_at: i64,
    /// Last mutation time in epoch milliseconds.
    pub updated_at: i64,
}

impl Record {
    /// Returns one field value, if the field exists.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Returns a field's text payload, if present and textual.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(FieldValue::as_text)
    }

    /// Returns a field's integer payload, if present and numeric.
    pub fn int(&self, name: &str) -> Option<i64> {
        self.fields.get(name).and_then(FieldValue::as_int)
    }

    /// Returns whether a field is present and null.
    pub fn is_null(&self, name: &str) -> bool {
        self.fields.get(name).is_some_and(FieldValue::is_null)
    }
}
