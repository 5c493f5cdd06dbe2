//! Entity schemas: named, ordered field collections with record validation.
//!
//! # Responsibility
//! - Validate schema declarations once, at registration time.
//! - Validate candidate records exhaustively, collecting every violation.
//!
//! # Invariants
//! - Field names are unique within a schema and never shadow record
//!   bookkeeping columns (`id`, `created_at`, `updated_at`).
//! - Defaults and normalization are applied before any rule runs.
//! - Validation reports ALL failing fields in one pass, in declaration
//!   order, so callers can render a complete form-error report.
//!
//! # See also
//! - docs/architecture/validation.md

use crate::model::field::FieldSpec;
use crate::model::rule::RuleViolation;
use crate::model::value::{FieldMap, FieldValue};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Field names reserved for record bookkeeping.
const RESERVED_FIELD_NAMES: &[&str] = &["id", "created_at", "updated_at"];

/// Declaration-time schema error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Entity name is empty or whitespace.
    EmptyEntityName,
    /// Schema declares no fields.
    NoFields { entity: String },
    /// Two fields share one name.
    DuplicateField { entity: String, field: String },
    /// Field name collides with record bookkeeping columns.
    ReservedFieldName { entity: String, field: String },
    /// Declared default does not fit the field kind/nullability.
    InvalidDefault {
        entity: String,
        field: String,
        message: String,
    },
    /// Entity name already registered with the store.
    DuplicateEntity { entity: String },
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyEntityName => write!(f, "entity name cannot be empty"),
            Self::NoFields { entity } => write!(f, "entity `{entity}` declares no fields"),
            Self::DuplicateField { entity, field } => {
                write!(f, "entity `{entity}` declares field `{field}` twice")
            }
            Self::ReservedFieldName { entity, field } => {
                write!(f, "entity `{entity}` uses reserved field name `{field}`")
            }
            Self::InvalidDefault {
                entity,
                field,
                message,
            } => write!(
                f,
                "entity `{entity}` has invalid default for `{field}`: {message}"
            ),
            Self::DuplicateEntity { entity } => {
                write!(f, "entity `{entity}` is already registered")
            }
        }
    }
}

impl Error for SchemaError {}

/// One failed field in a record validation report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    /// Field the violation is about.
    pub field: String,
    /// Stable rule name (`required`, `invalid_type`, `unknown_field`,
    /// or the violated rule's own name).
    pub rule: &'static str,
    /// Human-readable failure description.
    pub message: String,
}

impl Display for FieldViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: rule `{}`: {}", self.field, self.rule, self.message)
    }
}

impl Error for FieldViolation {}

impl FieldViolation {
    fn from_rule(field: &str, violation: RuleViolation) -> Self {
        Self {
            field: field.to_string(),
            rule: violation.rule,
            message: violation.message,
        }
    }
}

/// Named, ordered collection of field specifications for one entity kind.
#[derive(Debug, Clone)]
pub struct EntitySchema {
    entity: String,
    fields: Vec<FieldSpec>,
}

impl EntitySchema {
    /// Builds a schema, rejecting invalid declarations up front.
    pub fn new(
        entity: impl Into<String>,
        fields: Vec<FieldSpec>,
    ) -> Result<Self, SchemaError> {
        let entity = entity.into().trim().to_string();
        if entity.is_empty() {
            return Err(SchemaError::EmptyEntityName);
        }
        if fields.is_empty() {
            return Err(SchemaError::NoFields { entity });
        }

        let mut seen = BTreeSet::new();
        for spec in &fields {
            if RESERVED_FIELD_NAMES.contains(&spec.name()) {
                return Err(SchemaError::ReservedFieldName {
                    entity,
                    field: spec.name().to_string(),
                });
            }
            if !seen.insert(spec.name().to_string()) {
                return Err(SchemaError::DuplicateField {
                    entity,
                    field: spec.name().to_string(),
                });
            }
            if let Some(default) = spec.default() {
                if default.is_null() {
                    if !spec.is_nullable() {
                        return Err(SchemaError::InvalidDefault {
                            entity,
                            field: spec.name().to_string(),
                            message: "null default on a non-nullable field".to_string(),
                        });
                    }
                } else if !spec.kind().accepts(default) {
                    return Err(SchemaError::InvalidDefault {
                        entity,
                        field: spec.name().to_string(),
                        message: format!(
                            "default `{default}` is not a {} value",
                            spec.kind().describe()
                        ),
                    });
                }
            }
        }

        Ok(Self { entity, fields })
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Looks up one field spec by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.name() == name)
    }

    /// Validates a full candidate record for creation.
    ///
    /// Applies defaults for omitted fields, normalizes declared text
    /// transforms, then checks nullability, kind, and rules per field,
    /// collecting every violation instead of stopping at the first.
    /// Returns the normalized field map on success.
    pub fn validate_record(
        &self,
        input: &FieldMap,
        now_ms: i64,
    ) -> Result<FieldMap, Vec<FieldViolation>> {
        self.validate_inner(input, None, now_ms)
    }

    /// Validates a partial update merged over an existing record's fields.
    ///
    /// Date-anchored rules only run for fields present in `patch`;
    /// everything else is re-validated against the merged map.
    pub fn validate_update(
        &self,
        existing: &FieldMap,
        patch: &FieldMap,
        now_ms: i64,
    ) -> Result<FieldMap, Vec<FieldViolation>> {
        let mut merged = existing.clone();
        for (name, value) in patch {
            merged.insert(name.clone(), value.clone());
        }
        let changed: BTreeSet<String> = patch.keys().cloned().collect();
        self.validate_inner(&merged, Some(&changed), now_ms)
    }

    fn validate_inner(
        &self,
        input: &FieldMap,
        changed: Option<&BTreeSet<String>>,
        now_ms: i64,
    ) -> Result<FieldMap, Vec<FieldViolation>> {
        let mut violations = Vec::new();

        for name in input.keys() {
            if self.field(name).is_none() {
                violations.push(FieldViolation {
                    field: name.clone(),
                    rule: "unknown_field",
                    message: format!("entity `{}` has no field `{name}`", self.entity),
                });
            }
        }

        let mut normalized = FieldMap::new();
        for spec in &self.fields {
            let candidate = match input.get(spec.name()) {
                Some(value) => value.clone(),
                None => spec.default().cloned().unwrap_or(FieldValue::Null),
            };
            let candidate = spec.normalize_value(candidate);

            if candidate.is_null() {
                if spec.is_nullable() {
                    normalized.insert(spec.name().to_string(), FieldValue::Null);
                } else {
                    violations.push(FieldViolation {
                        field: spec.name().to_string(),
                        rule: "required",
                        message: format!("field `{}` is required", spec.name()),
                    });
                }
                continue;
            }

            if !spec.kind().accepts(&candidate) {
                violations.push(FieldViolation {
                    field: spec.name().to_string(),
                    rule: "invalid_type",
                    message: format!(
                        "field `{}` expects a {} value, got `{candidate}`",
                        spec.name(),
                        spec.kind().describe()
                    ),
                });
                continue;
            }

            let mut failed = false;
            for rule in spec.rules() {
                if rule.is_anchored()
                    && changed.is_some_and(|set| !set.contains(spec.name()))
                {
                    continue;
                }
                if let Err(violation) = rule.check(&candidate, now_ms) {
                    violations.push(FieldViolation::from_rule(spec.name(), violation));
                    failed = true;
                    break;
                }
            }
            if !failed {
                normalized.insert(spec.name().to_string(), candidate);
            }
        }

        if violations.is_empty() {
            Ok(normalized)
        } else {
            Err(violations)
        }
    }
}
