//! The list/task service and the helpers shared by its operations.

use super::{Resource, TodoServiceError, TodoServiceResult};
use crate::todo::{
    domain::{ListId, Task, TaskId, TodoList, UserId},
    hierarchy::{DepthLimit, TaskForest},
    ports::{ListSnapshot, TaskChangeSet, TodoStore, TodoStoreError},
};
use mockable::Clock;
use std::sync::Arc;
use tracing::debug;

/// How many times a task mutation is recomputed after losing a race with
/// another writer.
const MAX_COMMIT_ATTEMPTS: usize = 3;

/// Orchestrates the entity store and the hierarchy engine for list and
/// task use-cases.
///
/// Every operation takes the resolved caller identity. Lookups are scoped to
/// the caller, so records owned by someone else are reported as missing.
/// Each mutation reaches the store as a single atomic change that only
/// commits while the lists it was computed from are unchanged.
#[derive(Clone)]
pub struct TodoService<S, C>
where
    S: TodoStore,
    C: Clock + Send + Sync,
{
    pub(super) store: Arc<S>,
    pub(super) clock: Arc<C>,
    pub(super) limit: DepthLimit,
}

impl<S, C> TodoService<S, C>
where
    S: TodoStore,
    C: Clock + Send + Sync,
{
    /// Creates a service using [`DepthLimit::DEFAULT`].
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self {
            store,
            clock,
            limit: DepthLimit::DEFAULT,
        }
    }

    /// Replaces the maximum nesting depth.
    #[must_use]
    pub const fn with_depth_limit(mut self, limit: DepthLimit) -> Self {
        self.limit = limit;
        self
    }

    /// Returns the maximum nesting depth.
    #[must_use]
    pub const fn depth_limit(&self) -> DepthLimit {
        self.limit
    }

    pub(super) async fn owned_list(&self, owner: UserId, id: ListId) -> TodoServiceResult<TodoList> {
        self.store
            .find_list(owner, id)
            .await?
            .ok_or(TodoServiceError::NotFound(Resource::List(id)))
    }

    pub(super) async fn owned_task(&self, owner: UserId, id: TaskId) -> TodoServiceResult<Task> {
        self.store
            .find_task(owner, id)
            .await?
            .ok_or(TodoServiceError::NotFound(Resource::Task(id)))
    }

    /// Loads every task of the given lists into one forest.
    pub(super) async fn load_forest(
        &self,
        owner: UserId,
        list_ids: &[ListId],
    ) -> TodoServiceResult<TaskForest> {
        Ok(TaskForest::from_tasks(self.load_tasks(owner, list_ids).await?))
    }

    async fn load_tasks(&self, owner: UserId, list_ids: &[ListId]) -> TodoServiceResult<Vec<Task>> {
        let mut tasks = Vec::new();
        for list_id in list_ids {
            tasks.extend(self.store.tasks_in_list(owner, *list_id).await?);
        }
        Ok(tasks)
    }

    /// Runs `change` against a freshly loaded forest of `list_ids` and
    /// commits its result guarded by the loaded rows.
    ///
    /// `change` returns its outcome and any inserts or deletes; tasks it
    /// edits in the forest are added as updates. When another writer touched
    /// the lists first, the forest is reloaded and `change` runs again, up to
    /// [`MAX_COMMIT_ATTEMPTS`] times.
    pub(super) async fn mutate<T, F>(
        &self,
        owner: UserId,
        list_ids: &[ListId],
        mut change: F,
    ) -> TodoServiceResult<(TaskForest, T)>
    where
        F: FnMut(&mut TaskForest) -> TodoServiceResult<(T, TaskChangeSet)> + Send,
        T: Send,
    {
        let mut attempt = 1;
        loop {
            let tasks = self.load_tasks(owner, list_ids).await?;
            let snapshot = ListSnapshot::new(owner, list_ids.to_vec(), tasks.clone());
            let mut forest = TaskForest::from_tasks(tasks);
            let (outcome, planned) = change(&mut forest)?;
            let changes = planned.update(forest.changed_tasks()).expecting(snapshot);
            match self.commit(changes).await {
                Ok(()) => return Ok((forest, outcome)),
                Err(TodoServiceError::Store(TodoStoreError::Stale))
                    if attempt < MAX_COMMIT_ATTEMPTS =>
                {
                    debug!(attempt, "tasks changed concurrently; recomputing");
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    pub(super) async fn commit(&self, changes: TaskChangeSet) -> TodoServiceResult<()> {
        if changes.is_empty() {
            return Ok(());
        }
        self.store.apply(&changes).await?;
        Ok(())
    }
}

/// Fails with [`TodoServiceError::NotFound`] unless `id` is in `forest`.
pub(super) fn ensure_loaded(forest: &TaskForest, id: TaskId) -> TodoServiceResult<()> {
    if forest.get(id).is_none() {
        return Err(TodoServiceError::NotFound(Resource::Task(id)));
    }
    Ok(())
}
