//! Bulk completion over a whole list.

use super::{TodoService, TodoServiceResult};
use crate::todo::{
    domain::ListId,
    ports::{TaskChangeSet, TodoStore, UserIdentity},
};
use mockable::Clock;
use tracing::info;

impl<S, C> TodoService<S, C>
where
    S: TodoStore,
    C: Clock + Send + Sync,
{
    /// Completes every open top-level task in the list, cascading down each
    /// tree. Returns how many tasks changed.
    ///
    /// # Errors
    ///
    /// Returns [`super::TodoServiceError::NotFound`] when the caller owns no
    /// such list; nothing is changed on any error.
    pub async fn complete_all(
        &self,
        caller: &UserIdentity,
        list_id: ListId,
    ) -> TodoServiceResult<usize> {
        let owner = caller.user_id();
        self.owned_list(owner, list_id).await?;
        let (forest, targeted) = self
            .mutate(owner, &[list_id], |forest| {
                let targeted = forest.complete_top_level(self.clock.utc())?;
                Ok((targeted, TaskChangeSet::new()))
            })
            .await?;
        let changed = forest.changed_tasks().len();
        info!(list_id = %list_id, targeted, changed, "completed all tasks");
        Ok(changed)
    }

    /// Re-opens every completed task in the list at any depth, without
    /// cascading. Returns how many tasks changed.
    ///
    /// # Errors
    ///
    /// Returns [`super::TodoServiceError::NotFound`] when the caller owns no
    /// such list; nothing is changed on any error.
    pub async fn uncheck_all(
        &self,
        caller: &UserIdentity,
        list_id: ListId,
    ) -> TodoServiceResult<usize> {
        let owner = caller.user_id();
        self.owned_list(owner, list_id).await?;
        let (forest, ()) = self
            .mutate(owner, &[list_id], |forest| {
                forest.reopen_all()?;
                Ok(((), TaskChangeSet::new()))
            })
            .await?;
        let changed = forest.changed_tasks().len();
        info!(list_id = %list_id, changed, "unchecked all tasks");
        Ok(changed)
    }
}
