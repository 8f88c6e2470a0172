//! List use-cases.

use super::{
    CreateListRequest, ListView, TaskView, TodoService, TodoServiceResult, UpdateListRequest,
};
use crate::todo::{
    domain::{ListId, ListName, NewTodoList, TodoList},
    ports::{TodoStore, UserIdentity},
};
use mockable::Clock;
use tracing::info;

impl<S, C> TodoService<S, C>
where
    S: TodoStore,
    C: Clock + Send + Sync,
{
    /// Creates a list owned by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`super::TodoServiceError::Validation`] when the name is
    /// empty after trimming, or a store error.
    pub async fn create_list(
        &self,
        caller: &UserIdentity,
        request: CreateListRequest,
    ) -> TodoServiceResult<ListView> {
        let name = ListName::new(request.name)?;
        let list = TodoList::new(
            NewTodoList {
                owner: caller.user_id(),
                name,
                description: request.description,
            },
            &*self.clock,
        );
        self.store.store_list(&list).await?;
        info!(list_id = %list.id(), user_id = %caller.user_id(), "created list");
        Ok(ListView::summary(&list, 0))
    }

    /// Returns summaries of the caller's lists, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a store error when loading fails.
    pub async fn lists(&self, caller: &UserIdentity) -> TodoServiceResult<Vec<ListView>> {
        let owner = caller.user_id();
        let lists = self.store.lists_for_owner(owner).await?;
        let mut views = Vec::with_capacity(lists.len());
        for list in &lists {
            let task_count = self.store.tasks_in_list(owner, list.id()).await?.len();
            views.push(ListView::summary(list, task_count));
        }
        Ok(views)
    }

    /// Returns a list together with its top-level task trees.
    ///
    /// # Errors
    ///
    /// Returns [`super::TodoServiceError::NotFound`] when the caller owns no
    /// such list.
    pub async fn get_list(&self, caller: &UserIdentity, id: ListId) -> TodoServiceResult<ListView> {
        let owner = caller.user_id();
        let list = self.owned_list(owner, id).await?;
        let forest = self.load_forest(owner, &[id]).await?;
        let trees = TaskView::roots(&forest)?;
        Ok(ListView::summary(&list, forest.len()).with_tasks(trees))
    }

    /// Returns the top-level task trees of a list.
    ///
    /// # Errors
    ///
    /// Returns [`super::TodoServiceError::NotFound`] when the caller owns no
    /// such list.
    pub async fn list_tasks(
        &self,
        caller: &UserIdentity,
        list_id: ListId,
    ) -> TodoServiceResult<Vec<TaskView>> {
        let owner = caller.user_id();
        self.owned_list(owner, list_id).await?;
        let forest = self.load_forest(owner, &[list_id]).await?;
        Ok(TaskView::roots(&forest)?)
    }

    /// Renames a list, or replaces or clears its description.
    ///
    /// # Errors
    ///
    /// Returns [`super::TodoServiceError::Validation`] for an empty name and
    /// [`super::TodoServiceError::NotFound`] when the caller owns no such
    /// list.
    pub async fn update_list(
        &self,
        caller: &UserIdentity,
        id: ListId,
        request: UpdateListRequest,
    ) -> TodoServiceResult<ListView> {
        let owner = caller.user_id();
        let mut list = self.owned_list(owner, id).await?;
        if let Some(name) = request.name.map(ListName::new).transpose()? {
            list.rename(name);
        }
        if let Some(description) = request.description {
            list.set_description(description);
        }
        self.store.update_list(&list).await?;
        let task_count = self.store.tasks_in_list(owner, id).await?.len();
        info!(list_id = %id, "updated list");
        Ok(ListView::summary(&list, task_count))
    }

    /// Deletes a list and every task in it.
    ///
    /// # Errors
    ///
    /// Returns [`super::TodoServiceError::NotFound`] when the caller owns no
    /// such list.
    pub async fn delete_list(&self, caller: &UserIdentity, id: ListId) -> TodoServiceResult<()> {
        self.store.delete_list(caller.user_id(), id).await?;
        info!(list_id = %id, user_id = %caller.user_id(), "deleted list");
        Ok(())
    }
}
