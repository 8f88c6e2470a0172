//! Service-level error types and their classification.

use crate::todo::{
    domain::{ListId, TaskId, TodoDomainError, UserId},
    hierarchy::HierarchyError,
    ports::{CredentialError, TodoStoreError},
};
use std::fmt;
use thiserror::Error;

/// Coarse failure categories exposed to the routing layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input was rejected before any mutation.
    Validation,
    /// The referenced record does not exist or is not owned by the caller.
    NotFound,
    /// The request violates a hierarchy rule or lost a race with a
    /// concurrent change.
    Conflict,
    /// Storage or consistency failure; nothing was changed.
    Internal,
}

/// Record kinds that can be reported as missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// A user account.
    User(UserId),
    /// A to-do list.
    List(ListId),
    /// A task.
    Task(TaskId),
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "user {id}"),
            Self::List(id) => write!(f, "list {id}"),
            Self::Task(id) => write!(f, "task {id}"),
        }
    }
}

/// Errors returned by [`super::TodoService`].
#[derive(Debug, Clone, Error)]
pub enum TodoServiceError {
    /// Input validation failed.
    #[error(transparent)]
    Validation(#[from] TodoDomainError),

    /// The record is missing or owned by someone else.
    #[error("{0} not found")]
    NotFound(Resource),

    /// A cycle, depth, cross-list, or top-level rule was violated.
    #[error(transparent)]
    Conflict(HierarchyError),

    /// The stored hierarchy is inconsistent.
    #[error("stored task hierarchy is inconsistent: {0}")]
    Integrity(HierarchyError),

    /// The store failed.
    #[error(transparent)]
    Store(TodoStoreError),
}

impl TodoServiceError {
    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) | Self::Store(TodoStoreError::Stale) => ErrorKind::Conflict,
            Self::Integrity(_) | Self::Store(_) => ErrorKind::Internal,
        }
    }
}

impl From<HierarchyError> for TodoServiceError {
    fn from(err: HierarchyError) -> Self {
        if err.is_conflict() {
            Self::Conflict(err)
        } else {
            Self::Integrity(err)
        }
    }
}

impl From<TodoStoreError> for TodoServiceError {
    fn from(err: TodoStoreError) -> Self {
        match err {
            TodoStoreError::UserNotFound(id) => Self::NotFound(Resource::User(id)),
            TodoStoreError::ListNotFound(id) => Self::NotFound(Resource::List(id)),
            TodoStoreError::TaskNotFound(id) => Self::NotFound(Resource::Task(id)),
            other => Self::Store(other),
        }
    }
}

/// Result type for [`super::TodoService`] operations.
pub type TodoServiceResult<T> = Result<T, TodoServiceError>;

/// Errors returned by [`super::AccountService`].
#[derive(Debug, Clone, Error)]
pub enum AccountError {
    /// Registration input was invalid.
    #[error(transparent)]
    Validation(#[from] TodoDomainError),

    /// The username is already registered.
    #[error("username '{0}' is already taken")]
    UsernameTaken(String),

    /// The email address is already registered.
    #[error("email '{0}' is already registered")]
    EmailTaken(String),

    /// No account matches the login and password.
    #[error("invalid login or password")]
    InvalidCredentials,

    /// The account does not exist.
    #[error("user {0} not found")]
    UserNotFound(UserId),

    /// Hashing or verifying the credential failed.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// The store failed.
    #[error(transparent)]
    Store(TodoStoreError),
}

impl AccountError {
    /// Classifies the error. Failed authentication is reported as
    /// [`ErrorKind::NotFound`] so callers cannot tell a wrong password from
    /// an unknown login.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::UsernameTaken(_) | Self::EmailTaken(_) => ErrorKind::Conflict,
            Self::InvalidCredentials | Self::UserNotFound(_) => ErrorKind::NotFound,
            Self::Credential(_) | Self::Store(_) => ErrorKind::Internal,
        }
    }
}

impl From<TodoStoreError> for AccountError {
    fn from(err: TodoStoreError) -> Self {
        match err {
            TodoStoreError::DuplicateUsername(username) => Self::UsernameTaken(username),
            TodoStoreError::DuplicateEmail(email) => Self::EmailTaken(email),
            TodoStoreError::UserNotFound(id) => Self::UserNotFound(id),
            other => Self::Store(other),
        }
    }
}

/// Result type for [`super::AccountService`] operations.
pub type AccountResult<T> = Result<T, AccountError>;
