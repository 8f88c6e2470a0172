//! Error types for todo domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing or parsing domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TodoDomainError {
    /// The list name is empty after trimming.
    #[error("list name must not be empty")]
    EmptyListName,

    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTaskTitle,

    /// The urgency value is not one of the supported levels.
    #[error("unknown urgency '{0}', expected low, medium, high, or urgent")]
    InvalidUrgency(String),

    /// The username is shorter than the minimum length.
    #[error("username '{0}' must be at least 3 characters")]
    InvalidUsername(String),

    /// The email address is malformed.
    #[error("invalid email address '{0}'")]
    InvalidEmail(String),

    /// A text field is longer than its stored column allows.
    #[error("{field} must be at most {max} characters")]
    TooLong {
        /// Name of the field.
        field: &'static str,
        /// Maximum number of characters.
        max: usize,
    },

    /// The password is shorter than the minimum length.
    #[error("password must be at least 6 characters")]
    WeakPassword,
}
