//! Concrete TaskBoard entity kinds and their relationships.
//!
//! # Responsibility
//! - Declare the user/task/project/tag schemas and relations in one place.
//! - Install them into a store at startup, before the store is shared.
//!
//! # Invariants
//! - Entity and join names are stable; persisted references depend on them.
//! - Status/priority literal sets and their Rust enums stay in sync.
//!
//! # See also
//! - docs/architecture/data-model.md

use crate::model::field::{FieldSpec, Normalize};
use crate::model::rule::Rule;
use crate::model::schema::{EntitySchema, SchemaError};
use crate::relation::registry::{OnDelete, Relation, RelationError};
use crate::store::entity_store::EntityStore;
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Entity kind names.
pub const USER: &str = "user";
pub const TASK: &str = "task";
pub const PROJECT: &str = "project";
pub const TAG: &str = "tag";

/// Join set name for the task N—N tag relation.
pub const TASK_TAGS: &str = "task_tags";

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("valid username regex"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));
static HEX_COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9a-f]{6}$").expect("valid hex color regex"));

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == value)
    }

    /// Whether the task no longer counts toward open work.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Task priority level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|priority| priority.as_str() == value)
    }
}

impl Display for TaskPriority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Project lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Active,
    Completed,
    Archived,
}

impl ProjectStatus {
    pub const ALL: [Self; 3] = [Self::Active, Self::Completed, Self::Archived];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Archived => "archived",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == value)
    }
}

impl Display for ProjectStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Domain installation error.
#[derive(Debug)]
pub enum InstallError {
    Schema(SchemaError),
    Relation(RelationError),
}

impl Display for InstallError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Schema(err) => write!(f, "{err}"),
            Self::Relation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for InstallError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Schema(err) => Some(err),
            Self::Relation(err) => Some(err),
        }
    }
}

impl From<SchemaError> for InstallError {
    fn from(value: SchemaError) -> Self {
        Self::Schema(value)
    }
}

impl From<RelationError> for InstallError {
    fn from(value: RelationError) -> Self {
        Self::Relation(value)
    }
}

/// Registers the four entity kinds and their relations with a store.
///
/// Must run during the construction phase, before the store is shared.
pub fn install(store: &mut EntityStore) -> Result<(), InstallError> {
    store.register_entity(user_schema()?)?;
    store.register_entity(project_schema()?)?;
    store.register_entity(task_schema()?)?;
    store.register_entity(tag_schema()?)?;

    store.register_relation(Relation::one_to_many(
        "user_tasks",
        USER,
        TASK,
        "user_id",
        OnDelete::Cascade,
    ))?;
    store.register_relation(Relation::one_to_many(
        "project_tasks",
        PROJECT,
        TASK,
        "project_id",
        OnDelete::SetNull,
    ))?;
    store.register_relation(Relation::many_to_many(
        "task_tags",
        TASK,
        TAG,
        TASK_TAGS,
    ))?;

    info!("event=domain_install module=domain status=ok entities=4 relations=3");
    Ok(())
}

fn user_schema() -> Result<EntitySchema, SchemaError> {
    EntitySchema::new(
        USER,
        vec![
            FieldSpec::text("username")
                .unique()
                .normalize(Normalize::Trim)
                .rule(Rule::Length { min: 3, max: 32 })
                .rule(Rule::matches("username", &USERNAME_RE)),
            FieldSpec::text("email")
                .unique()
                .normalize(Normalize::Trim)
                .normalize(Normalize::Lowercase)
                .rule(Rule::matches("email", &EMAIL_RE)),
            FieldSpec::text("password").rule(Rule::Length { min: 8, max: 128 }),
            FieldSpec::text("first_name").rule(Rule::Length { min: 1, max: 60 }),
            FieldSpec::text("last_name").rule(Rule::Length { min: 1, max: 60 }),
        ],
    )
}

fn task_schema() -> Result<EntitySchema, SchemaError> {
    EntitySchema::new(
        TASK,
        vec![
            FieldSpec::text("title").rule(Rule::Length { min: 1, max: 200 }),
            FieldSpec::text("description")
                .nullable()
                .rule(Rule::Length { min: 0, max: 2000 }),
            FieldSpec::choice("status", TaskStatus::ALL.map(TaskStatus::as_str))
                .default_value(TaskStatus::Pending.as_str()),
            FieldSpec::choice("priority", TaskPriority::ALL.map(TaskPriority::as_str))
                .default_value(TaskPriority::Medium.as_str()),
            FieldSpec::date("due_date").nullable().rule(Rule::FutureDate),
            FieldSpec::integer("user_id").indexed(),
            FieldSpec::integer("project_id").nullable().indexed(),
        ],
    )
}

fn project_schema() -> Result<EntitySchema, SchemaError> {
    EntitySchema::new(
        PROJECT,
        vec![
            FieldSpec::text("name")
                .unique()
                .normalize(Normalize::Trim)
                .rule(Rule::Length { min: 1, max: 100 }),
            FieldSpec::text("description")
                .nullable()
                .rule(Rule::Length { min: 0, max: 2000 }),
            FieldSpec::choice("status", ProjectStatus::ALL.map(ProjectStatus::as_str))
                .default_value(ProjectStatus::Active.as_str()),
        ],
    )
}

fn tag_schema() -> Result<EntitySchema, SchemaError> {
    EntitySchema::new(
        TAG,
        vec![
            FieldSpec::text("name")
                .unique()
                .normalize(Normalize::Trim)
                .normalize(Normalize::Lowercase)
                .rule(Rule::Length { min: 1, max: 40 }),
            FieldSpec::text("color")
                .normalize(Normalize::Lowercase)
                .default_value("#808080")
                .rule(Rule::matches("hex_color", &HEX_COLOR_RE)),
        ],
    )
}
