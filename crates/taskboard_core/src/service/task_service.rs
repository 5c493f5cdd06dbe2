//! Task use-case service.
//!
//! # Responsibility
//! - Provide task create/transition/list APIs and the overdue getter.
//! - Own tag management for tasks (create, attach, detach, list).
//!
//! # Invariants
//! - Creation relies on schema defaults: omitted status is `pending`,
//!   omitted priority is `medium`.
//! - Attaching a tag twice leaves exactly one membership pair.
//! - Listings are ordered by ascending record id with a clamped page size.

use crate::domain::{self, TaskPriority, TaskStatus};
use crate::model::record::{Record, RecordId};
use crate::model::value::{FieldMap, FieldValue};
use crate::store::entity_store::{EntityStore, StoreError};
use chrono::Utc;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

const TASKS_DEFAULT_LIMIT: u32 = 20;
const TASKS_LIMIT_MAX: u32 = 100;

/// Request model for creating one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    /// Owning user; the store rejects dangling ids.
    pub user_id: RecordId,
    /// Optional project assignment.
    pub project_id: Option<RecordId>,
    /// Optional due date in epoch milliseconds; must be in the future
    /// when set.
    pub due_date: Option<i64>,
    /// Defaults to `medium` when omitted.
    pub priority: Option<TaskPriority>,
}

/// Service error for task use-cases.
#[derive(Debug)]
pub enum TaskServiceError {
    /// Target task does not exist.
    TaskNotFound(RecordId),
    /// Store-level failure (validation, references, locks, ...).
    Store(StoreError),
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::TaskNotFound(_) => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for TaskServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound { entity, id } if entity == domain::TASK => {
                Self::TaskNotFound(id)
            }
            other => Self::Store(other),
        }
    }
}

/// One page of task records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListPage {
    /// Items in ascending id order.
    pub items: Vec<Record>,
    /// Effective limit after default/clamp normalization.
    pub applied_limit: u32,
}

/// Task service facade over the shared entity store.
pub struct TaskService {
    store: Arc<EntityStore>,
}

impl TaskService {
    pub fn new(store: Arc<EntityStore>) -> Self {
        Self { store }
    }

    /// Creates one task using the wall clock as the validation anchor.
    pub fn create_task(&self, request: NewTask) -> Result<Record, TaskServiceError> {
        self.create_task_at(request, Utc::now().timestamp_millis())
    }

    /// Creates one task with an explicit "now" for deterministic callers.
    ///
    /// Omitted status/priority come from schema defaults; a due date in
    /// the past fails validation with the `future_date` rule.
    pub fn create_task_at(
        &self,
        request: NewTask,
        now_ms: i64,
    ) -> Result<Record, TaskServiceError> {
        let mut fields = FieldMap::from([
            ("title".to_string(), FieldValue::from(request.title)),
            ("description".to_string(), FieldValue::from(request.description)),
            ("user_id".to_string(), FieldValue::from(request.user_id)),
            ("project_id".to_string(), FieldValue::from(request.project_id)),
            ("due_date".to_string(), FieldValue::from(request.due_date)),
        ]);
        if let Some(priority) = request.priority {
            fields.insert("priority".to_string(), FieldValue::from(priority.as_str()));
        }
        Ok(self.store.create_at(domain::TASK, fields, now_ms)?)
    }

    /// Gets one task by id.
    pub fn get_task(&self, id: RecordId) -> Result<Record, TaskServiceError> {
        Ok(self.store.get(domain::TASK, id)?)
    }

    /// Transitions one task to a new status.
    pub fn set_status(
        &self,
        id: RecordId,
        status: TaskStatus,
    ) -> Result<Record, TaskServiceError> {
        let patch = FieldMap::from([(
            "status".to_string(),
            FieldValue::from(status.as_str()),
        )]);
        Ok(self.store.update(domain::TASK, id, patch)?)
    }

    /// Marks one task completed.
    pub fn complete(&self, id: RecordId) -> Result<Record, TaskServiceError> {
        self.set_status(id, TaskStatus::Completed)
    }

    /// Assigns or clears the task's project.
    pub fn assign_project(
        &self,
        id: RecordId,
        project_id: Option<RecordId>,
    ) -> Result<Record, TaskServiceError> {
        let patch = FieldMap::from([(
            "project_id".to_string(),
            FieldValue::from(project_id),
        )]);
        Ok(self.store.update(domain::TASK, id, patch)?)
    }

    /// Replaces the due date. Passing a date requires it to be in the
    /// future relative to `now_ms`; `None` clears it.
    pub fn reschedule_at(
        &self,
        id: RecordId,
        due_date: Option<i64>,
        now_ms: i64,
    ) -> Result<Record, TaskServiceError> {
        let patch = FieldMap::from([(
            "due_date".to_string(),
            FieldValue::from(due_date),
        )]);
        Ok(self.store.update_at(domain::TASK, id, patch, now_ms)?)
    }

    /// Deletes one task. Tag memberships are purged with it.
    pub fn delete_task(&self, id: RecordId) -> Result<(), TaskServiceError> {
        Ok(self.store.delete(domain::TASK, id)?)
    }

    /// Whether a task counts as overdue at `now_ms`.
    ///
    /// Completed and cancelled tasks are never overdue; tasks without a
    /// due date are never overdue.
    pub fn is_overdue(record: &Record, now_ms: i64) -> bool {
        let terminal = record
            .text("status")
            .and_then(TaskStatus::parse)
            .is_some_and(TaskStatus::is_terminal);
        if terminal {
            return false;
        }
        record.int("due_date").is_some_and(|due| due < now_ms)
    }

    /// Every non-terminal task whose due date has passed, ascending by id.
    pub fn overdue_tasks(&self, now_ms: i64) -> Result<Vec<Record>, TaskServiceError> {
        let tasks = self.store.list(domain::TASK)?;
        Ok(tasks
            .into_iter()
            .filter(|task| Self::is_overdue(task, now_ms))
            .collect())
    }

    /// Tasks owned by one user, paginated.
    pub fn list_by_user(
        &self,
        user_id: RecordId,
        limit: Option<u32>,
        offset: u32,
    ) -> Result<TaskListPage, TaskServiceError> {
        let tasks = self.store.find_by(domain::TASK, "user_id", user_id)?;
        Ok(paginate(tasks, limit, offset))
    }

    /// Tasks assigned to one project, paginated.
    pub fn list_by_project(
        &self,
        project_id: RecordId,
        limit: Option<u32>,
        offset: u32,
    ) -> Result<TaskListPage, TaskServiceError> {
        let tasks = self.store.find_by(domain::TASK, "project_id", project_id)?;
        Ok(paginate(tasks, limit, offset))
    }

    /// Creates one tag. Names are trimmed and lowercased by the schema,
    /// and duplicates collide on the normalized name.
    pub fn create_tag(
        &self,
        name: impl Into<String>,
        color: Option<&str>,
    ) -> Result<Record, TaskServiceError> {
        let mut fields = FieldMap::from([(
            "name".to_string(),
            FieldValue::from(name.into()),
        )]);
        if let Some(color) = color {
            fields.insert("color".to_string(), FieldValue::from(color));
        }
        Ok(self.store.create(domain::TAG, fields)?)
    }

    /// Attaches a tag to a task. Idempotent: returns `false` when the
    /// membership already existed.
    pub fn add_tag(&self, task_id: RecordId, tag_id: RecordId) -> Result<bool, TaskServiceError> {
        Ok(self.store.link(domain::TASK_TAGS, task_id, tag_id)?)
    }

    /// Detaches a tag from a task. Returns whether a membership existed.
    pub fn remove_tag(
        &self,
        task_id: RecordId,
        tag_id: RecordId,
    ) -> Result<bool, TaskServiceError> {
        Ok(self.store.unlink(domain::TASK_TAGS, task_id, tag_id)?)
    }

    /// Tag records attached to one task, ascending by tag id.
    pub fn tags_of(&self, task_id: RecordId) -> Result<Vec<Record>, TaskServiceError> {
        let tag_ids = self.store.links_of(domain::TASK_TAGS, task_id)?;
        let mut tags = Vec::with_capacity(tag_ids.len());
        for tag_id in tag_ids {
            tags.push(self.store.get(domain::TAG, tag_id)?);
        }
        Ok(tags)
    }

    /// Task records carrying one tag, ascending by task id.
    pub fn tasks_with_tag(&self, tag_id: RecordId) -> Result<Vec<Record>, TaskServiceError> {
        let task_ids = self.store.backlinks_of(domain::TASK_TAGS, tag_id)?;
        let mut tasks = Vec::with_capacity(task_ids.len());
        for task_id in task_ids {
            tasks.push(self.store.get(domain::TASK, task_id)?);
        }
        Ok(tasks)
    }
}

fn paginate(items: Vec<Record>, limit: Option<u32>, offset: u32) -> TaskListPage {
    let applied_limit = limit
        .unwrap_or(TASKS_DEFAULT_LIMIT)
        .min(TASKS_LIMIT_MAX);
    let items = items
        .into_iter()
        .skip(offset as usize)
        .take(applied_limit as usize)
        .collect();
    TaskListPage {
        items,
        applied_limit,
    }
}
