//! Serializable views returned by the services.

use crate::todo::{
    domain::{ListId, Task, TaskId, TodoList, Urgency, User, UserId},
    hierarchy::{HierarchyError, HierarchyResult, TaskForest},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A task record, optionally with its subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskView {
    /// Task identifier.
    pub id: TaskId,
    /// Title.
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Completion flag.
    pub completed: bool,
    /// Urgency level.
    pub urgency: Urgency,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Completion timestamp, set exactly when `completed` is true.
    pub completed_at: Option<DateTime<Utc>>,
    /// Owning user.
    pub user_id: UserId,
    /// List the task belongs to.
    pub list_id: ListId,
    /// Parent task.
    pub parent_id: Option<TaskId>,
    /// Distance from the top-level ancestor.
    pub depth: usize,
    /// Child views, present only in subtree views.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TaskView>>,
}

impl TaskView {
    /// Builds a view of a single task without children.
    #[must_use]
    pub fn flat(task: &Task, depth: usize) -> Self {
        Self {
            id: task.id(),
            title: task.title().as_str().to_owned(),
            description: task.description().map(str::to_owned),
            completed: task.is_completed(),
            urgency: task.urgency(),
            created_at: task.created_at(),
            completed_at: task.completed_at(),
            user_id: task.owner(),
            list_id: task.list_id(),
            parent_id: task.parent_id(),
            depth,
            children: None,
        }
    }

    /// Builds the view of `id` with its whole subtree.
    ///
    /// # Errors
    ///
    /// Returns a hierarchy error when `id` is not loaded or its parent chain
    /// is broken.
    pub fn tree(forest: &TaskForest, id: TaskId) -> HierarchyResult<Self> {
        let depth = forest.depth(id)?;
        Self::subtree_at(forest, id, depth)
    }

    /// Builds subtree views for every top-level task in `forest`.
    ///
    /// # Errors
    ///
    /// Returns a hierarchy error when the forest is inconsistent.
    pub fn roots(forest: &TaskForest) -> HierarchyResult<Vec<Self>> {
        forest
            .roots()
            .map(|root| Self::subtree_at(forest, root.id(), 0))
            .collect()
    }

    fn subtree_at(forest: &TaskForest, id: TaskId, depth: usize) -> HierarchyResult<Self> {
        let task = forest
            .get(id)
            .ok_or(HierarchyError::UnknownTask(id))?;
        let children = forest
            .child_ids(id)
            .iter()
            .map(|child| Self::subtree_at(forest, *child, depth + 1))
            .collect::<HierarchyResult<Vec<_>>>()?;
        let mut view = Self::flat(task, depth);
        view.children = Some(children);
        Ok(view)
    }
}

/// A list record with its task count and, on request, its task trees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListView {
    /// List identifier.
    pub id: ListId,
    /// List name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Owning user.
    pub user_id: UserId,
    /// Number of tasks in the list at any depth.
    pub task_count: usize,
    /// Top-level task trees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<TaskView>>,
}

impl ListView {
    /// Builds a summary view of `list`.
    #[must_use]
    pub fn summary(list: &TodoList, task_count: usize) -> Self {
        Self {
            id: list.id(),
            name: list.name().as_str().to_owned(),
            description: list.description().map(str::to_owned),
            created_at: list.created_at(),
            user_id: list.owner(),
            task_count,
            tasks: None,
        }
    }

    /// Attaches the list's top-level task trees.
    #[must_use]
    pub fn with_tasks(mut self, tasks: Vec<TaskView>) -> Self {
        self.tasks = Some(tasks);
        self
    }
}

/// A task subtree together with summary figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskTreeView {
    /// The task and its descendants.
    pub tree: TaskView,
    /// Depth of the task.
    pub depth: usize,
    /// Number of descendants, excluding the task.
    pub total_descendants: usize,
}

/// A parent task with its direct children, each expanded to a subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubtasksView {
    /// The parent task, without children.
    pub parent: TaskView,
    /// Subtrees of the direct children.
    pub subtasks: Vec<TaskView>,
}

/// A task and its descendants as a flat pre-order sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlattenedTasks {
    /// The task followed by its descendants.
    pub tasks: Vec<TaskView>,
    /// Number of tasks in `tasks`.
    pub total_count: usize,
    /// Number of completed tasks in `tasks`.
    pub completed_count: usize,
}

/// Public account details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    /// User identifier.
    pub id: UserId,
    /// Username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id(),
            username: user.username().as_str().to_owned(),
            email: user.email().as_str().to_owned(),
            created_at: user.created_at(),
        }
    }
}
