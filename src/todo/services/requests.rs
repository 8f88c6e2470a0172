//! Request payloads accepted by the services.

use crate::todo::domain::{ListId, TaskId};
use std::fmt;

/// Request payload for creating a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateListRequest {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
}

impl CreateListRequest {
    /// Creates a request with the list name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    /// Sets the list description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial update of a list; unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateListRequest {
    pub(crate) name: Option<String>,
    pub(crate) description: Option<Option<String>>,
}

impl UpdateListRequest {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Renames the list.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replaces the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(Some(description.into()));
        self
    }

    /// Removes the description.
    #[must_use]
    pub fn clear_description(mut self) -> Self {
        self.description = Some(None);
        self
    }
}

/// Where a new task is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
    /// Top level of a list.
    List(ListId),
    /// Under a parent task; the list is inherited from the parent. A list
    /// named alongside the parent must still be owned by the caller.
    Parent {
        parent_id: TaskId,
        list_id: Option<ListId>,
    },
}

/// Request payload for creating a task or subtask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    pub(crate) placement: Placement,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) urgency: Option<String>,
}

impl CreateTaskRequest {
    /// Creates a request for a top-level task in `list_id`.
    #[must_use]
    pub fn new(list_id: ListId, title: impl Into<String>) -> Self {
        Self {
            placement: Placement::List(list_id),
            title: title.into(),
            description: None,
            urgency: None,
        }
    }

    /// Creates a request for a subtask of `parent_id`.
    #[must_use]
    pub fn subtask_of(parent_id: TaskId, title: impl Into<String>) -> Self {
        Self {
            placement: Placement::Parent {
                parent_id,
                list_id: None,
            },
            title: title.into(),
            description: None,
            urgency: None,
        }
    }

    /// Nests the task under `parent_id`.
    ///
    /// The task joins the parent's list; the list given to
    /// [`CreateTaskRequest::new`] is only checked for ownership.
    #[must_use]
    pub fn with_parent(mut self, parent_id: TaskId) -> Self {
        let list_id = match self.placement {
            Placement::List(list_id) => Some(list_id),
            Placement::Parent { list_id, .. } => list_id,
        };
        self.placement = Placement::Parent { parent_id, list_id };
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the urgency by name; unknown names are rejected on creation.
    #[must_use]
    pub fn with_urgency(mut self, urgency: impl Into<String>) -> Self {
        self.urgency = Some(urgency.into());
        self
    }
}

/// Partial update of a task; unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    pub(crate) title: Option<String>,
    pub(crate) description: Option<Option<String>>,
    pub(crate) urgency: Option<String>,
    pub(crate) completed: Option<bool>,
}

impl UpdateTaskRequest {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Replaces the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(Some(description.into()));
        self
    }

    /// Removes the description.
    #[must_use]
    pub fn clear_description(mut self) -> Self {
        self.description = Some(None);
        self
    }

    /// Replaces the urgency by name. Unknown names are ignored.
    #[must_use]
    pub fn with_urgency(mut self, urgency: impl Into<String>) -> Self {
        self.urgency = Some(urgency.into());
        self
    }

    /// Completes or re-opens the task, cascading through the hierarchy.
    #[must_use]
    pub const fn with_completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }
}

/// Request payload for registering an account.
#[derive(Clone, PartialEq, Eq)]
pub struct RegisterUserRequest {
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) password: String,
}

impl RegisterUserRequest {
    /// Creates a registration request.
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for RegisterUserRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterUserRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}
