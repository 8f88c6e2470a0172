//! Error types for hierarchy operations.

use crate::todo::domain::{ListId, TaskId};
use thiserror::Error;

/// Result type for hierarchy operations.
pub type HierarchyResult<T> = Result<T, HierarchyError>;

/// Errors returned by the hierarchy engine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HierarchyError {
    /// The task is not part of the loaded forest.
    #[error("task {0} is not part of this hierarchy")]
    UnknownTask(TaskId),

    /// Re-parenting would make a task its own ancestor.
    #[error("moving task {task_id} under {new_parent_id} would create a cycle")]
    CycleDetected {
        /// Task being moved.
        task_id: TaskId,
        /// Requested parent.
        new_parent_id: TaskId,
    },

    /// The parent is already too deep to accept another level.
    #[error("task {parent_id} at depth {parent_depth} cannot take subtasks (maximum depth {max_depth})")]
    DepthLimitExceeded {
        /// Requested parent.
        parent_id: TaskId,
        /// Depth of the requested parent.
        parent_depth: usize,
        /// Configured maximum depth.
        max_depth: usize,
    },

    /// Re-parenting across lists is not allowed.
    #[error("task {task_id} in list {task_list} cannot move under a task in list {parent_list}")]
    CrossListReparent {
        /// Task being moved.
        task_id: TaskId,
        /// List of the task being moved.
        task_list: ListId,
        /// List of the requested parent.
        parent_list: ListId,
    },

    /// Only top-level tasks may move between lists.
    #[error("task {0} has a parent; only top-level tasks can move between lists")]
    NotTopLevel(TaskId),

    /// The stored parent chain is dangling or cyclic.
    #[error("parent chain of task {0} is broken")]
    BrokenParentChain(TaskId),
}

impl HierarchyError {
    /// Returns `true` for rule violations caused by the requested change, as
    /// opposed to inconsistencies in the stored data.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::CycleDetected { .. }
                | Self::DepthLimitExceeded { .. }
                | Self::CrossListReparent { .. }
                | Self::NotTopLevel(_)
        )
    }
}
