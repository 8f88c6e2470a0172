//! Task records and their validated title.

use super::{ListId, TaskId, TodoDomainError, Urgency, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of characters in a task title.
pub const MAX_TASK_TITLE_CHARS: usize = 200;

/// Non-empty, trimmed task title of at most [`MAX_TASK_TITLE_CHARS`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskTitle(String);

impl TaskTitle {
    /// Creates a validated task title.
    ///
    /// # Errors
    ///
    /// Returns [`TodoDomainError::EmptyTaskTitle`] when the value is empty
    /// after trimming and [`TodoDomainError::TooLong`] when it exceeds
    /// [`MAX_TASK_TITLE_CHARS`].
    pub fn new(value: impl Into<String>) -> Result<Self, TodoDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TodoDomainError::EmptyTaskTitle);
        }
        if trimmed.chars().count() > MAX_TASK_TITLE_CHARS {
            return Err(TodoDomainError::TooLong {
                field: "title",
                max: MAX_TASK_TITLE_CHARS,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the title as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parameter object for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Owning user.
    pub owner: UserId,
    /// List the task belongs to.
    pub list_id: ListId,
    /// Parent task, if this is a subtask.
    pub parent_id: Option<TaskId>,
    /// Validated title.
    pub title: TaskTitle,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Urgency level.
    pub urgency: Urgency,
}

/// A to-do item, optionally nested under another task.
///
/// Completion is stored as the completion timestamp alone, so a task is
/// completed exactly when `completed_at` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    id: TaskId,
    owner: UserId,
    list_id: ListId,
    parent_id: Option<TaskId>,
    title: TaskTitle,
    description: Option<String>,
    urgency: Urgency,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted owner.
    pub owner: UserId,
    /// Persisted list.
    pub list_id: ListId,
    /// Persisted parent reference.
    pub parent_id: Option<TaskId>,
    /// Persisted title.
    pub title: TaskTitle,
    /// Persisted description.
    pub description: Option<String>,
    /// Persisted urgency.
    pub urgency: Urgency,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a new, incomplete task.
    #[must_use]
    pub fn new(data: NewTask, clock: &impl Clock) -> Self {
        Self {
            id: TaskId::new(),
            owner: data.owner,
            list_id: data.list_id,
            parent_id: data.parent_id,
            title: data.title,
            description: data.description,
            urgency: data.urgency,
            created_at: clock.utc(),
            completed_at: None,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            owner: data.owner,
            list_id: data.list_id,
            parent_id: data.parent_id,
            title: data.title,
            description: data.description,
            urgency: data.urgency,
            created_at: data.created_at,
            completed_at: data.completed_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn owner(&self) -> UserId {
        self.owner
    }

    /// Returns the list this task belongs to.
    #[must_use]
    pub const fn list_id(&self) -> ListId {
        self.list_id
    }

    /// Returns the parent task, or `None` for a top-level task.
    #[must_use]
    pub const fn parent_id(&self) -> Option<TaskId> {
        self.parent_id
    }

    /// Returns `true` when the task has no parent.
    #[must_use]
    pub const fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the urgency level.
    #[must_use]
    pub const fn urgency(&self) -> Urgency {
        self.urgency
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the completion timestamp when the task is completed.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns `true` when the task is completed.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Replaces the title.
    pub fn retitle(&mut self, title: TaskTitle) {
        self.title = title;
    }

    /// Replaces the description.
    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    /// Replaces the urgency level.
    pub const fn set_urgency(&mut self, urgency: Urgency) {
        self.urgency = urgency;
    }

    // Structural and completion changes go through the hierarchy engine so
    // that cascades and tree invariants are applied together.

    pub(crate) const fn complete(&mut self, at: DateTime<Utc>) {
        self.completed_at = Some(at);
    }

    pub(crate) const fn reopen(&mut self) {
        self.completed_at = None;
    }

    pub(crate) const fn set_parent(&mut self, parent_id: Option<TaskId>) {
        self.parent_id = parent_id;
    }

    pub(crate) const fn set_list(&mut self, list_id: ListId) {
        self.list_id = list_id;
    }
}
