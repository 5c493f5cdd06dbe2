//! Core data layer for TaskBoard.
//! This crate is the single source of truth for schemas, validation rules,
//! relationship integrity, and record storage semantics.

pub mod domain;
pub mod logging;
pub mod model;
pub mod relation;
pub mod service;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::field::{FieldSpec, Normalize};
pub use model::record::{Record, RecordId};
pub use model::rule::{Rule, RuleViolation};
pub use model::schema::{EntitySchema, FieldViolation, SchemaError};
pub use model::value::{FieldKind, FieldMap, FieldValue};
pub use relation::registry::{OnDelete, Relation, RelationError, RelationKind};
pub use service::project_service::{NewProject, ProjectService, ProjectServiceError, TaskProgress};
pub use service::task_service::{NewTask, TaskListPage, TaskService, TaskServiceError};
pub use service::user_service::{NewUser, UserService, UserServiceError};
pub use store::{
    AuditLogObserver, ChangeEvent, ChangeObserver, ChangeOp, EntityStore, StoreConfig,
    StoreError, StoreResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
