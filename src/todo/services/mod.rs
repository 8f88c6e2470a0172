//! Application services for accounts, lists, and tasks.

mod accounts;
mod bulk;
mod error;
mod lists;
mod requests;
mod tasks;
mod todo;
mod view;

pub use accounts::{AccountService, MIN_PASSWORD_LENGTH};
pub use error::{
    AccountError, AccountResult, ErrorKind, Resource, TodoServiceError, TodoServiceResult,
};
use requests::Placement;
pub use requests::{
    CreateListRequest, CreateTaskRequest, RegisterUserRequest, UpdateListRequest,
    UpdateTaskRequest,
};
pub use todo::TodoService;
pub use view::{FlattenedTasks, ListView, SubtasksView, TaskTreeView, TaskView, UserView};
