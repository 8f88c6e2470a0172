//! Entity store port for users, lists, and tasks.

use crate::todo::domain::{ListId, Task, TaskId, TodoList, User, UserId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Result type for store operations.
pub type TodoStoreResult<T> = Result<T, TodoStoreError>;

/// The task rows of one or more lists as they were loaded.
///
/// A change set computed from a snapshot carries it so the store can refuse
/// the change once any of those lists has moved on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSnapshot {
    owner: UserId,
    list_ids: Vec<ListId>,
    tasks: Vec<Task>,
}

impl ListSnapshot {
    /// Records `tasks` as the full content of `list_ids` for `owner`.
    #[must_use]
    pub const fn new(owner: UserId, list_ids: Vec<ListId>, tasks: Vec<Task>) -> Self {
        Self {
            owner,
            list_ids,
            tasks,
        }
    }

    /// Returns the owner of the lists.
    #[must_use]
    pub const fn owner(&self) -> UserId {
        self.owner
    }

    /// Returns the lists covered by the snapshot.
    #[must_use]
    pub fn list_ids(&self) -> &[ListId] {
        &self.list_ids
    }

    /// Returns `true` when `current` holds exactly the loaded rows.
    #[must_use]
    pub fn matches(&self, current: &[Task]) -> bool {
        if current.len() != self.tasks.len() {
            return false;
        }
        let loaded: HashMap<TaskId, &Task> =
            self.tasks.iter().map(|task| (task.id(), task)).collect();
        current
            .iter()
            .all(|task| loaded.get(&task.id()).is_some_and(|seen| *seen == task))
    }
}

/// Task rows to insert, update, and delete as one atomic unit.
///
/// Deleting a task also deletes every task below it. A change set that
/// carries a [`ListSnapshot`] only commits while those lists are unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChangeSet {
    inserted: Vec<Task>,
    updated: Vec<Task>,
    deleted: Vec<TaskId>,
    expected: Option<ListSnapshot>,
}

impl TaskChangeSet {
    /// Creates an empty change set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a new task.
    #[must_use]
    pub fn insert(mut self, task: Task) -> Self {
        self.inserted.push(task);
        self
    }

    /// Adds replacements for existing tasks.
    #[must_use]
    pub fn update(mut self, tasks: impl IntoIterator<Item = Task>) -> Self {
        self.updated.extend(tasks);
        self
    }

    /// Adds tasks to delete.
    #[must_use]
    pub fn delete(mut self, ids: impl IntoIterator<Item = TaskId>) -> Self {
        self.deleted.extend(ids);
        self
    }

    /// Makes the change conditional on the lists still matching `snapshot`.
    #[must_use]
    pub fn expecting(mut self, snapshot: ListSnapshot) -> Self {
        self.expected = Some(snapshot);
        self
    }

    /// Returns the snapshot the change was computed from, if any.
    #[must_use]
    pub const fn expected(&self) -> Option<&ListSnapshot> {
        self.expected.as_ref()
    }

    /// Returns the tasks to insert.
    #[must_use]
    pub fn inserted(&self) -> &[Task] {
        &self.inserted
    }

    /// Returns the tasks to update.
    #[must_use]
    pub fn updated(&self) -> &[Task] {
        &self.updated
    }

    /// Returns the identifiers of tasks to delete.
    #[must_use]
    pub fn deleted(&self) -> &[TaskId] {
        &self.deleted
    }

    /// Returns `true` when the change set holds no changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }
}

/// Durable mapping from identifiers to users, lists, and tasks.
///
/// Owner-scoped lookups return `None` both when a record does not exist and
/// when it belongs to another user.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Stores a new user.
    ///
    /// # Errors
    ///
    /// Returns [`TodoStoreError::DuplicateUsername`] or
    /// [`TodoStoreError::DuplicateEmail`] when either is already taken.
    async fn store_user(&self, user: &User) -> TodoStoreResult<()>;

    /// Finds a user by identifier.
    async fn find_user(&self, id: UserId) -> TodoStoreResult<Option<User>>;

    /// Finds a user whose username or email equals `login`.
    async fn find_user_by_login(&self, login: &str) -> TodoStoreResult<Option<User>>;

    /// Deletes a user together with all of their lists and tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TodoStoreError::UserNotFound`] when the user does not exist.
    async fn delete_user(&self, id: UserId) -> TodoStoreResult<()>;

    /// Stores a new list.
    ///
    /// # Errors
    ///
    /// Returns [`TodoStoreError::ForeignKey`] when the owner does not exist.
    async fn store_list(&self, list: &TodoList) -> TodoStoreResult<()>;

    /// Persists the name and description of an existing list.
    ///
    /// # Errors
    ///
    /// Returns [`TodoStoreError::ListNotFound`] when the list does not exist.
    async fn update_list(&self, list: &TodoList) -> TodoStoreResult<()>;

    /// Finds a list owned by `owner`.
    async fn find_list(&self, owner: UserId, id: ListId) -> TodoStoreResult<Option<TodoList>>;

    /// Returns every list owned by `owner`, oldest first.
    async fn lists_for_owner(&self, owner: UserId) -> TodoStoreResult<Vec<TodoList>>;

    /// Deletes a list owned by `owner` together with all of its tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TodoStoreError::ListNotFound`] when no such list exists.
    async fn delete_list(&self, owner: UserId, id: ListId) -> TodoStoreResult<()>;

    /// Finds a task owned by `owner`.
    async fn find_task(&self, owner: UserId, id: TaskId) -> TodoStoreResult<Option<Task>>;

    /// Returns every task in the list, nested or not, oldest first.
    async fn tasks_in_list(&self, owner: UserId, list_id: ListId) -> TodoStoreResult<Vec<Task>>;

    /// Applies a change set atomically: either every change commits or none
    /// does.
    ///
    /// When the change set carries a [`ListSnapshot`], the current rows of
    /// those lists are compared with it inside the same atomic unit.
    ///
    /// # Errors
    ///
    /// Returns [`TodoStoreError::Stale`] when the snapshot no longer
    /// matches or a concurrent writer won, [`TodoStoreError::ForeignKey`]
    /// when a task references a missing owner, list, or parent,
    /// [`TodoStoreError::TaskNotFound`] when an updated task does not exist, [`TodoStoreError::DuplicateTask`]
    /// when an inserted task already exists, and
    /// [`TodoStoreError::Persistence`] for backend failures.
    async fn apply(&self, changes: &TaskChangeSet) -> TodoStoreResult<()>;
}

/// Errors returned by store implementations.
#[derive(Debug, Clone, Error)]
pub enum TodoStoreError {
    /// The username is already registered.
    #[error("duplicate username: {0}")]
    DuplicateUsername(String),

    /// The email address is already registered.
    #[error("duplicate email: {0}")]
    DuplicateEmail(String),

    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The user was not found.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// The list was not found.
    #[error("list not found: {0}")]
    ListNotFound(ListId),

    /// The task was not found.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// A record references a missing or foreign-owned record.
    #[error("foreign key violation: {0}")]
    ForeignKey(String),

    /// The rows a change was computed from were changed by another writer.
    #[error("tasks changed since they were loaded")]
    Stale,

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TodoStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
