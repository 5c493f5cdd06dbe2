//! Relation declarations and their registration-time checks.
//!
//! # Responsibility
//! - Keep every declared relation in one queryable registry.
//! - Reject invalid declarations (unknown endpoints, mistyped foreign keys,
//!   `SetNull` on non-nullable fields) before the store ever runs.
//!
//! # Invariants
//! - Relation and join names are unique registry-wide.
//! - A one-to-many foreign key is an `Integer` field on the child schema.
//!
//! # See also
//! - docs/architecture/data-model.md

use crate::model::schema::EntitySchema;
use crate::model::value::FieldKind;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Delete policy applied to child records when their parent is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDelete {
    /// Delete children recursively, depth-first.
    Cascade,
    /// Refuse the parent delete while children exist.
    Restrict,
    /// Null the child's foreign key (field must be nullable).
    SetNull,
}

impl Display for OnDelete {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cascade => write!(f, "cascade"),
            Self::Restrict => write!(f, "restrict"),
            Self::SetNull => write!(f, "set_null"),
        }
    }
}

/// Shape of one relation edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationKind {
    /// `source` (one) owns `target` (many); the child holds `foreign_key`.
    OneToMany {
        foreign_key: String,
        on_delete: OnDelete,
    },
    /// Symmetric membership through an explicit join set.
    ManyToMany { join: String },
}

/// One declared relation between two entity kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    name: String,
    source: String,
    target: String,
    kind: RelationKind,
}

impl Relation {
    /// Declares parent 1—N child through `foreign_key` on the child.
    pub fn one_to_many(
        name: impl Into<String>,
        parent: impl Into<String>,
        child: impl Into<String>,
        foreign_key: impl Into<String>,
        on_delete: OnDelete,
    ) -> Self {
        Self {
            name: name.into(),
            source: parent.into(),
            target: child.into(),
            kind: RelationKind::OneToMany {
                foreign_key: foreign_key.into(),
                on_delete,
            },
        }
    }

    /// Declares left N—N right through an explicit join set.
    pub fn many_to_many(
        name: impl Into<String>,
        left: impl Into<String>,
        right: impl Into<String>,
        join: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            source: left.into(),
            target: right.into(),
            kind: RelationKind::ManyToMany { join: join.into() },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent for one-to-many, left side for many-to-many.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Child for one-to-many, right side for many-to-many.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn kind(&self) -> &RelationKind {
        &self.kind
    }
}

/// Registration-time relation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationError {
    /// Relation name is empty or already taken.
    DuplicateRelation { relation: String },
    /// Join name is already taken by another many-to-many relation.
    DuplicateJoin { join: String },
    /// An endpoint entity has no registered schema.
    UnknownEntity { relation: String, entity: String },
    /// The child schema has no such foreign-key field.
    UnknownForeignKey { relation: String, field: String },
    /// The foreign-key field is not an `Integer`.
    ForeignKeyNotInteger { relation: String, field: String },
    /// `SetNull` declared on a non-nullable foreign key.
    SetNullRequiresNullable { relation: String, field: String },
    /// Relation name is empty.
    EmptyRelationName,
}

impl Display for RelationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateRelation { relation } => {
                write!(f, "relation `{relation}` is already registered")
            }
            Self::DuplicateJoin { join } => {
                write!(f, "join `{join}` is already registered")
            }
            Self::UnknownEntity { relation, entity } => {
                write!(f, "relation `{relation}` references unknown entity `{entity}`")
            }
            Self::UnknownForeignKey { relation, field } => {
                write!(f, "relation `{relation}` references unknown foreign key `{field}`")
            }
            Self::ForeignKeyNotInteger { relation, field } => {
                write!(f, "relation `{relation}` foreign key `{field}` must be an integer field")
            }
            Self::SetNullRequiresNullable { relation, field } => write!(
                f,
                "relation `{relation}` declares set-null on non-nullable field `{field}`"
            ),
            Self::EmptyRelationName => write!(f, "relation name cannot be empty"),
        }
    }
}

impl Error for RelationError {}

/// Registry of every declared relation, keyed by relation name.
#[derive(Debug, Default)]
pub struct RelationRegistry {
    relations: BTreeMap<String, Relation>,
}

impl RelationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one relation after validating it against known schemas.
    pub fn register(
        &mut self,
        relation: Relation,
        schemas: &BTreeMap<String, Arc<EntitySchema>>,
    ) -> Result<(), RelationError> {
        if relation.name.trim().is_empty() {
            return Err(RelationError::EmptyRelationName);
        }
        if self.relations.contains_key(&relation.name) {
            return Err(RelationError::DuplicateRelation {
                relation: relation.name,
            });
        }
        if !schemas.contains_key(&relation.source) {
            return Err(RelationError::UnknownEntity {
                relation: relation.name,
                entity: relation.source,
            });
        }
        let Some(child) = schemas.get(&relation.target) else {
            return Err(RelationError::UnknownEntity {
                relation: relation.name,
                entity: relation.target,
            });
        };

        match &relation.kind {
            RelationKind::OneToMany {
                foreign_key,
                on_delete,
            } => {
                let Some(spec) = child.field(foreign_key) else {
                    return Err(RelationError::UnknownForeignKey {
                        relation: relation.name,
                        field: foreign_key.clone(),
                    });
                };
                if spec.kind() != FieldKind::Integer {
                    return Err(RelationError::ForeignKeyNotInteger {
                        relation: relation.name,
                        field: foreign_key.clone(),
                    });
                }
                if *on_delete == OnDelete::SetNull && !spec.is_nullable() {
                    return Err(RelationError::SetNullRequiresNullable {
                        relation: relation.name,
                        field: foreign_key.clone(),
                    });
                }
            }
            RelationKind::ManyToMany { join } => {
                if self.join(join).is_some() {
                    return Err(RelationError::DuplicateJoin { join: join.clone() });
                }
            }
        }

        self.relations.insert(relation.name.clone(), relation);
        Ok(())
    }

    /// Relations in registration-name order.
    pub fn relations(&self) -> impl Iterator<Item = &Relation> {
        self.relations.values()
    }

    /// One-to-many relations whose child is `entity` (its foreign keys).
    pub fn foreign_keys_of(&self, entity: &str) -> Vec<&Relation> {
        self.relations
            .values()
            .filter(|relation| {
                relation.target == entity
                    && matches!(relation.kind, RelationKind::OneToMany { .. })
            })
            .collect()
    }

    /// One-to-many relations whose parent is `entity` (its children).
    pub fn children_of(&self, entity: &str) -> Vec<&Relation> {
        self.relations
            .values()
            .filter(|relation| {
                relation.source == entity
                    && matches!(relation.kind, RelationKind::OneToMany { .. })
            })
            .collect()
    }

    /// Many-to-many relations touching `entity` on either side.
    pub fn joins_of(&self, entity: &str) -> Vec<&Relation> {
        self.relations
            .values()
            .filter(|relation| {
                matches!(relation.kind, RelationKind::ManyToMany { .. })
                    && (relation.source == entity || relation.target == entity)
            })
            .collect()
    }

    /// Resolves a many-to-many relation by its join name.
    pub fn join(&self, join_name: &str) -> Option<&Relation> {
        self.relations.values().find(|relation| {
            matches!(&relation.kind, RelationKind::ManyToMany { join } if join == join_name)
        })
    }
}
