//! Shared wiring for the in-memory integration tests.

use std::sync::Arc;

use canopy::todo::{
    adapters::{
        hashing::Argon2CredentialHasher,
        memory::{InMemorySessionRegistry, InMemoryTodoStore},
    },
    domain::{ListId, TaskId},
    ports::{CallerResolver, SessionToken, UserIdentity},
    services::{AccountService, CreateListRequest, CreateTaskRequest, RegisterUserRequest, TodoService},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Account service over the in-memory store.
pub type TestAccounts = AccountService<InMemoryTodoStore, Argon2CredentialHasher, DefaultClock>;

/// List and task service over the in-memory store.
pub type TestTodos = TodoService<InMemoryTodoStore, DefaultClock>;

/// Both services sharing one store, plus a session registry.
pub struct App {
    pub accounts: TestAccounts,
    pub todos: TestTodos,
    pub sessions: InMemorySessionRegistry,
}

impl App {
    /// Wires the services over a fresh store.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(InMemoryTodoStore::new());
        let clock = Arc::new(DefaultClock);
        Self {
            accounts: AccountService::new(
                Arc::clone(&store),
                Arc::new(Argon2CredentialHasher::new()),
                Arc::clone(&clock),
            ),
            todos: TodoService::new(store, clock),
            sessions: InMemorySessionRegistry::new(),
        }
    }

    /// Registers `username`, signs in, and returns the open session.
    ///
    /// # Errors
    ///
    /// Returns an error when registration, sign-in, or session setup fails.
    pub async fn sign_up(&self, username: &str) -> Result<SessionToken, eyre::Report> {
        let password = format!("{username}-secret");
        self.accounts
            .register(RegisterUserRequest::new(
                username,
                format!("{username}@example.com"),
                password.as_str(),
            ))
            .await?;
        let identity = self.accounts.authenticate(username, &password).await?;
        self.sessions
            .open(identity)
            .map_err(|err| eyre::eyre!("open session: {err}"))
    }

    /// Resolves a session token to its caller.
    ///
    /// # Errors
    ///
    /// Returns an error when the session is not open.
    pub async fn caller(&self, token: &SessionToken) -> Result<UserIdentity, eyre::Report> {
        self.sessions
            .resolve_caller(token)
            .await
            .map_err(|err| eyre::eyre!("resolve caller: {err}"))
    }

    /// Creates a list named `name` for `caller`.
    ///
    /// # Errors
    ///
    /// Returns an error when the list cannot be created.
    pub async fn list(&self, caller: &UserIdentity, name: &str) -> Result<ListId, eyre::Report> {
        Ok(self
            .todos
            .create_list(caller, CreateListRequest::new(name))
            .await?
            .id)
    }

    /// Creates a top-level task in `list_id`.
    ///
    /// # Errors
    ///
    /// Returns an error when the task cannot be created.
    pub async fn task(
        &self,
        caller: &UserIdentity,
        list_id: ListId,
        title: &str,
    ) -> Result<TaskId, eyre::Report> {
        Ok(self
            .todos
            .create_task(caller, CreateTaskRequest::new(list_id, title))
            .await?
            .id)
    }

    /// Creates a subtask of `parent_id`.
    ///
    /// # Errors
    ///
    /// Returns an error when the subtask cannot be created.
    pub async fn subtask(
        &self,
        caller: &UserIdentity,
        parent_id: TaskId,
        title: &str,
    ) -> Result<TaskId, eyre::Report> {
        Ok(self
            .todos
            .create_task(caller, CreateTaskRequest::subtask_of(parent_id, title))
            .await?
            .id)
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Provides freshly wired services for each test.
#[fixture]
pub fn app() -> App {
    App::new()
}
