//! Single-field validation rules and their checker.
//!
//! # Responsibility
//! - Represent every supported per-field constraint as one declarative union.
//! - Check one scalar against one rule as a pure function.
//!
//! # Invariants
//! - Checking has no side effects; "now" is an explicit argument.
//! - Null handling happens above rules: a rule never sees `FieldValue::Null`
//!   on a nullable field, and required-ness is reported before any rule runs.
//! - Uniqueness is a store concern, never a rule.
//!
//! # See also
//! - docs/architecture/validation.md

use crate::model::value::FieldValue;
use regex::Regex;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

/// Custom predicate signature for `Rule::Predicate`.
pub type Predicate = Arc<dyn Fn(&FieldValue) -> bool + Send + Sync>;

/// One declarative constraint on a single field value.
#[derive(Clone)]
pub enum Rule {
    /// Character-count bounds on text.
    Length { min: usize, max: usize },
    /// Regex match on text. `label` names the pattern in violation reports.
    Matches { label: &'static str, pattern: Regex },
    /// Membership in a fixed literal set.
    OneOf { allowed: Vec<String> },
    /// Inclusive numeric bounds.
    IntRange { min: i64, max: i64 },
    /// Date strictly after "now". Applies to values as they are written.
    FutureDate,
    /// Date at or before "now". Applies to values as they are written.
    PastOrPresentDate,
    /// Custom predicate with a human-readable failure message.
    Predicate {
        name: &'static str,
        message: String,
        check: Predicate,
    },
}

impl Rule {
    /// Convenience constructor cloning a (usually lazily compiled) regex.
    pub fn matches(label: &'static str, pattern: &Regex) -> Self {
        Self::Matches {
            label,
            pattern: pattern.clone(),
        }
    }

    /// Convenience constructor for fixed literal sets.
    pub fn one_of<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::OneOf {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    /// Stable rule name used in violation reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Length { .. } => "length",
            Self::Matches { label, .. } => label,
            Self::OneOf { .. } => "one_of",
            Self::IntRange { .. } => "int_range",
            Self::FutureDate => "future_date",
            Self::PastOrPresentDate => "past_or_present_date",
            Self::Predicate { name, .. } => name,
        }
    }

    /// Whether this rule compares against "now" and therefore only applies
    /// to values as they are written, not on re-validation of old fields.
    pub fn is_anchored(&self) -> bool {
        matches!(self, Self::FutureDate | Self::PastOrPresentDate)
    }

    /// Checks one non-null value against this rule.
    pub fn check(&self, value: &FieldValue, now_ms: i64) -> Result<(), RuleViolation> {
        match self {
            Self::Length { min, max } => {
                let text = expect_text(self, value)?;
                let chars = text.chars().count();
                if chars < *min || chars > *max {
                    return Err(self.violation(format!(
                        "length {chars} is outside {min}..={max} characters"
                    )));
                }
                Ok(())
            }
            Self::Matches { pattern, .. } => {
                let text = expect_text(self, value)?;
                if !pattern.is_match(text) {
                    return Err(self.violation(format!("value `{text}` does not match pattern")));
                }
                Ok(())
            }
            Self::OneOf { allowed } => {
                let text = expect_text(self, value)?;
                if !allowed.iter().any(|candidate| candidate == text) {
                    return Err(self.violation(format!(
                        "value `{text}` is not one of [{}]",
                        allowed.join(", ")
                    )));
                }
                Ok(())
            }
            Self::IntRange { min, max } => {
                let number = expect_int(self, value)?;
                if number < *min || number > *max {
                    return Err(
                        self.violation(format!("value {number} is outside {min}..={max}"))
                    );
                }
                Ok(())
            }
            Self::FutureDate => {
                let date = expect_int(self, value)?;
                if date <= now_ms {
                    return Err(self.violation(format!(
                        "date {date} is not after current time {now_ms}"
                    )));
                }
                Ok(())
            }
            Self::PastOrPresentDate => {
                let date = expect_int(self, value)?;
                if date > now_ms {
                    return Err(self.violation(format!(
                        "date {date} is after current time {now_ms}"
                    )));
                }
                Ok(())
            }
            Self::Predicate { message, check, .. } => {
                if !check(value) {
                    return Err(self.violation(message.clone()));
                }
                Ok(())
            }
        }
    }

    fn violation(&self, message: String) -> RuleViolation {
        RuleViolation {
            rule: self.name(),
            message,
        }
    }
}

impl Debug for Rule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Length { min, max } => write!(f, "Length {{ min: {min}, max: {max} }}"),
            Self::Matches { label, pattern } => {
                write!(f, "Matches {{ label: {label}, pattern: {pattern} }}")
            }
            Self::OneOf { allowed } => write!(f, "OneOf {{ allowed: {allowed:?} }}"),
            Self::IntRange { min, max } => write!(f, "IntRange {{ min: {min}, max: {max} }}"),
            Self::FutureDate => write!(f, "FutureDate"),
            Self::PastOrPresentDate => write!(f, "PastOrPresentDate"),
            Self::Predicate { name, .. } => write!(f, "Predicate {{ name: {name} }}"),
        }
    }
}

/// Failure report from one rule check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleViolation {
    /// Stable rule name (`length`, `one_of`, a pattern label, ...).
    pub rule: &'static str,
    /// Human-readable failure description.
    pub message: String,
}

impl Display for RuleViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "rule `{}` violated: {}", self.rule, self.message)
    }
}

impl Error for RuleViolation {}

fn expect_text<'v>(rule: &Rule, value: &'v FieldValue) -> Result<&'v str, RuleViolation> {
    value.as_text().ok_or_else(|| RuleViolation {
        rule: rule.name(),
        message: format!("expected a text value, got `{value}`"),
    })
}

fn expect_int(rule: &Rule, value: &FieldValue) -> Result<i64, RuleViolation> {
    value.as_int().ok_or_else(|| RuleViolation {
        rule: rule.name(),
        message: format!("expected an integer value, got `{value}`"),
    })
}
