//! Domain model for users, lists, and hierarchical tasks.
//!
//! The domain keeps validation and record invariants inside value types while
//! leaving tree-shaped rules to [`crate::todo::hierarchy`] and persistence to
//! the store adapters.

mod error;
mod ids;
mod list;
mod task;
mod urgency;
mod user;

pub use error::TodoDomainError;
pub use ids::{ListId, TaskId, UserId};
pub use list::{ListName, MAX_LIST_NAME_CHARS, NewTodoList, PersistedListData, TodoList};
pub use task::{MAX_TASK_TITLE_CHARS, NewTask, PersistedTaskData, Task, TaskTitle};
pub use urgency::Urgency;
pub use user::{
    CredentialHash, EmailAddress, MAX_EMAIL_CHARS, MAX_USERNAME_CHARS, PersistedUserData, User,
    Username,
};
