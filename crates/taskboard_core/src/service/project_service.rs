//! Project use-case service.
//!
//! # Responsibility
//! - Provide project lifecycle entry points and aggregate progress views.
//!
//! # Invariants
//! - A project with zero tasks reports a completion rate of 0.0, never a
//!   division error.
//! - Deleting a project clears `project_id` on its tasks (set-null policy);
//!   it never deletes tasks.

use crate::domain::{self, ProjectStatus, TaskStatus};
use crate::model::record::{Record, RecordId};
use crate::model::value::{FieldMap, FieldValue};
use crate::store::entity_store::{EntityStore, StoreError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Request model for creating one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
}

/// Service error for project use-cases.
#[derive(Debug)]
pub enum ProjectServiceError {
    /// Target project does not exist.
    ProjectNotFound(RecordId),
    /// Store-level failure.
    Store(StoreError),
}

impl Display for ProjectServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ProjectServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ProjectNotFound(_) => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for ProjectServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound { entity, id } if entity == domain::PROJECT => {
                Self::ProjectNotFound(id)
            }
            other => Self::Store(other),
        }
    }
}

/// Per-status task counts for one project.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskProgress {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub cancelled: usize,
    /// `completed / total * 100`; 0.0 when the project has no tasks.
    pub completion_rate: f64,
}

/// Project service facade over the shared entity store.
pub struct ProjectService {
    store: Arc<EntityStore>,
}

impl ProjectService {
    pub fn new(store: Arc<EntityStore>) -> Self {
        Self { store }
    }

    /// Creates one project. Status defaults to `active`.
    pub fn create_project(&self, request: NewProject) -> Result<Record, ProjectServiceError> {
        let fields = FieldMap::from([
            ("name".to_string(), FieldValue::from(request.name)),
            ("description".to_string(), FieldValue::from(request.description)),
        ]);
        Ok(self.store.create(domain::PROJECT, fields)?)
    }

    /// Gets one project by id.
    pub fn get_project(&self, id: RecordId) -> Result<Record, ProjectServiceError> {
        Ok(self.store.get(domain::PROJECT, id)?)
    }

    /// Transitions one project to a new status.
    pub fn set_status(
        &self,
        id: RecordId,
        status: ProjectStatus,
    ) -> Result<Record, ProjectServiceError> {
        let patch = FieldMap::from([(
            "status".to_string(),
            FieldValue::from(status.as_str()),
        )]);
        Ok(self.store.update(domain::PROJECT, id, patch)?)
    }

    /// Marks one project archived.
    pub fn archive(&self, id: RecordId) -> Result<Record, ProjectServiceError> {
        self.set_status(id, ProjectStatus::Archived)
    }

    /// Deletes one project, clearing `project_id` on its tasks.
    pub fn delete_project(&self, id: RecordId) -> Result<(), ProjectServiceError> {
        Ok(self.store.delete(domain::PROJECT, id)?)
    }

    /// Aggregates task counts and the completion rate for one project.
    pub fn progress(&self, id: RecordId) -> Result<TaskProgress, ProjectServiceError> {
        let _ = self.get_project(id)?;
        let tasks = self.store.find_by(domain::TASK, "project_id", id)?;

        let mut progress = TaskProgress {
            total: tasks.len(),
            pending: 0,
            in_progress: 0,
            completed: 0,
            cancelled: 0,
            completion_rate: 0.0,
        };
        for task in &tasks {
            match task.text("status").and_then(TaskStatus::parse) {
                Some(TaskStatus::Pending) => progress.pending += 1,
                Some(TaskStatus::InProgress) => progress.in_progress += 1,
                Some(TaskStatus::Completed) => progress.completed += 1,
                Some(TaskStatus::Cancelled) => progress.cancelled += 1,
                None => {}
            }
        }
        if progress.total > 0 {
            progress.completion_rate =
                progress.completed as f64 / progress.total as f64 * 100.0;
        }
        Ok(progress)
    }

    /// `completed / total * 100` for one project; 0.0 with no tasks.
    pub fn completion_rate(&self, id: RecordId) -> Result<f64, ProjectServiceError> {
        Ok(self.progress(id)?.completion_rate)
    }
}
