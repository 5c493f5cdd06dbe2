//! Scalar value model shared by every entity kind.
//!
//! # Responsibility
//! - Define the storable scalar kinds and their runtime values.
//! - Keep one canonical wire shape for embedding applications.
//!
//! # Invariants
//! - `Date` values are epoch milliseconds, like every timestamp in core.
//! - `Choice` values are stored as text and constrained by schema rules.
//!
//! # See also
//! - docs/architecture/data-model.md

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Field-name to value mapping used for candidate input and stored records.
pub type FieldMap = BTreeMap<String, FieldValue>;

/// Declared scalar kind of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Free-form text.
    Text,
    /// Signed 64-bit integer (also used for foreign keys).
    Integer,
    /// Point in time as epoch milliseconds.
    Date,
    /// Text constrained to a fixed literal set.
    Choice,
}

impl FieldKind {
    /// Returns whether a non-null runtime value is storable under this kind.
    pub fn accepts(self, value: &FieldValue) -> bool {
        match self {
            Self::Text | Self::Choice => matches!(value, FieldValue::Text(_)),
            Self::Integer | Self::Date => matches!(value, FieldValue::Int(_)),
        }
    }

    /// Human-readable kind name for violation messages.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Date => "date (epoch ms)",
            Self::Choice => "choice",
        }
    }
}

/// Runtime value of one field.
///
/// Serialized untagged, so the wire shape is plain `null`/number/string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Absent value for nullable fields.
    Null,
    /// Integer and date payloads.
    Int(i64),
    /// Text and choice payloads.
    Text(String),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the text payload, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Returns the integer payload, if any.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
