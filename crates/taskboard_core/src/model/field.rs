//! Field specifications: the declarative unit an entity schema is made of.
//!
//! # Responsibility
//! - Describe one field: kind, nullability, default, normalization, rules.
//! - Stay immutable once the owning schema is registered.
//!
//! # Invariants
//! - `unique` implies `indexed`.
//! - Normalization runs before validation and before uniqueness checks.
//!
//! # See also
//! - docs/architecture/data-model.md

use crate::model::rule::Rule;
use crate::model::value::{FieldKind, FieldValue};

/// Pre-validation text transform applied in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalize {
    /// Strip leading/trailing whitespace.
    Trim,
    /// Lowercase (ASCII-insensitive lookups, e.g. e-mail and tag names).
    Lowercase,
}

impl Normalize {
    fn apply(self, text: &str) -> String {
        match self {
            Self::Trim => text.trim().to_string(),
            Self::Lowercase => text.to_lowercase(),
        }
    }
}

/// Declarative definition of one entity field.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    name: String,
    kind: FieldKind,
    nullable: bool,
    unique: bool,
    indexed: bool,
    default: Option<FieldValue>,
    normalize: Vec<Normalize>,
    rules: Vec<Rule>,
}

impl FieldSpec {
    fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable: false,
            unique: false,
            indexed: false,
            default: None,
            normalize: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// A required free-form text field.
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    /// A required integer field (also used for foreign keys).
    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    /// A required epoch-millisecond date field.
    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Date)
    }

    /// A required choice field constrained to a fixed literal set.
    pub fn choice<I, S>(name: impl Into<String>, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut spec = Self::new(name, FieldKind::Choice);
        spec.rules.push(Rule::one_of(allowed));
        spec
    }

    /// Allows null/absent values.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Enforces store-wide uniqueness (and maintains a secondary index).
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self.indexed = true;
        self
    }

    /// Maintains a secondary index for fast equality lookup.
    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    /// Value applied when the field is omitted on create.
    pub fn default_value(mut self, value: impl Into<FieldValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Appends a pre-validation text transform.
    pub fn normalize(mut self, step: Normalize) -> Self {
        self.normalize.push(step);
        self
    }

    /// Appends a validation rule. Rules are checked in declaration order.
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn is_indexed(&self) -> bool {
        self.indexed
    }

    pub fn default(&self) -> Option<&FieldValue> {
        self.default.as_ref()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Applies the declared normalization chain to a candidate value.
    ///
    /// Non-text values pass through untouched; kind mismatches are reported
    /// later by schema validation rather than here.
    pub fn normalize_value(&self, value: FieldValue) -> FieldValue {
        match value {
            FieldValue::Text(text) => {
                let normalized = self
                    .normalize
                    .iter()
                    .fold(text, |acc, step| step.apply(&acc));
                FieldValue::Text(normalized)
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldSpec, Normalize};
    use crate::model::value::FieldValue;

    #[test]
    fn unique_implies_indexed() {
        let spec = FieldSpec::text("email").unique();
        assert!(spec.is_unique());
        assert!(spec.is_indexed());
    }

    #[test]
    fn normalization_applies_in_declaration_order() {
        let spec = FieldSpec::text("name")
            .normalize(Normalize::Trim)
            .normalize(Normalize::Lowercase);
        assert_eq!(
            spec.normalize_value(FieldValue::from("  Ada Lovelace ")),
            FieldValue::from("ada lovelace")
        );
    }
}
