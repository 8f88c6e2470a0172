//! To-do list records.

use super::{ListId, TodoDomainError, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of characters in a list name.
pub const MAX_LIST_NAME_CHARS: usize = 100;

/// Non-empty, trimmed list name of at most [`MAX_LIST_NAME_CHARS`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListName(String);

impl ListName {
    /// Creates a validated list name.
    ///
    /// # Errors
    ///
    /// Returns [`TodoDomainError::EmptyListName`] when the value is empty
    /// after trimming and [`TodoDomainError::TooLong`] when it exceeds
    /// [`MAX_LIST_NAME_CHARS`].
    pub fn new(value: impl Into<String>) -> Result<Self, TodoDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TodoDomainError::EmptyListName);
        }
        if trimmed.chars().count() > MAX_LIST_NAME_CHARS {
            return Err(TodoDomainError::TooLong {
                field: "name",
                max: MAX_LIST_NAME_CHARS,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parameter object for creating a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodoList {
    /// Owning user.
    pub owner: UserId,
    /// Validated name.
    pub name: ListName,
    /// Optional free-form description.
    pub description: Option<String>,
}

/// A user's collection of tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoList {
    id: ListId,
    owner: UserId,
    name: ListName,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedListData {
    /// Persisted list identifier.
    pub id: ListId,
    /// Persisted owner.
    pub owner: UserId,
    /// Persisted name.
    pub name: ListName,
    /// Persisted description.
    pub description: Option<String>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl TodoList {
    /// Creates a new list.
    #[must_use]
    pub fn new(data: NewTodoList, clock: &impl Clock) -> Self {
        Self {
            id: ListId::new(),
            owner: data.owner,
            name: data.name,
            description: data.description,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs a list from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedListData) -> Self {
        Self {
            id: data.id,
            owner: data.owner,
            name: data.name,
            description: data.description,
            created_at: data.created_at,
        }
    }

    /// Returns the list identifier.
    #[must_use]
    pub const fn id(&self) -> ListId {
        self.id
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn owner(&self) -> UserId {
        self.owner
    }

    /// Returns the list name.
    #[must_use]
    pub const fn name(&self) -> &ListName {
        &self.name
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Replaces the list name.
    pub fn rename(&mut self, name: ListName) {
        self.name = name;
    }

    /// Replaces the description.
    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }
}
