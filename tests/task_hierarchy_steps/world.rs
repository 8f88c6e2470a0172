//! Shared world state for task hierarchy BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use canopy::todo::{
    adapters::memory::InMemoryTodoStore,
    domain::{ListId, TaskId},
    ports::UserIdentity,
    services::{TodoService, TodoServiceError},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Service type used by the BDD world.
pub type TestTodoService = TodoService<InMemoryTodoStore, DefaultClock>;

/// Scenario world for task hierarchy behaviour tests.
pub struct HierarchyWorld {
    pub store: Arc<InMemoryTodoStore>,
    pub service: TestTodoService,
    pub caller: Option<UserIdentity>,
    pub list_id: Option<ListId>,
    pub tasks: HashMap<String, TaskId>,
    pub deepest: Option<TaskId>,
    pub last_error: Option<TodoServiceError>,
    pub last_changed: Option<usize>,
}

impl HierarchyWorld {
    /// Creates a world with an empty store.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(InMemoryTodoStore::new());
        let service = TodoService::new(Arc::clone(&store), Arc::new(DefaultClock));
        Self {
            store,
            service,
            caller: None,
            list_id: None,
            tasks: HashMap::new(),
            deepest: None,
            last_error: None,
            last_changed: None,
        }
    }

    /// Returns the signed-in caller.
    ///
    /// # Errors
    ///
    /// Returns an error when no user has signed in yet.
    pub fn caller(&self) -> Result<UserIdentity, eyre::Report> {
        self.caller
            .clone()
            .ok_or_else(|| eyre::eyre!("missing signed-in user in scenario world"))
    }

    /// Returns the scenario list.
    ///
    /// # Errors
    ///
    /// Returns an error when no list has been created yet.
    pub fn list_id(&self) -> Result<ListId, eyre::Report> {
        self.list_id
            .ok_or_else(|| eyre::eyre!("missing list in scenario world"))
    }

    /// Looks up a task created earlier in the scenario by title.
    ///
    /// # Errors
    ///
    /// Returns an error when no task with that title was created.
    pub fn task(&self, title: &str) -> Result<TaskId, eyre::Report> {
        self.tasks
            .get(title)
            .copied()
            .ok_or_else(|| eyre::eyre!("no task titled '{title}' in scenario world"))
    }
}

impl Default for HierarchyWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> HierarchyWorld {
    HierarchyWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
