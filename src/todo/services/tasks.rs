//! Task use-cases: creation, queries, edits, deletion, and moves.

use super::todo::ensure_loaded;
use super::{
    CreateTaskRequest, FlattenedTasks, Placement, Resource, SubtasksView, TaskTreeView, TaskView,
    TodoService, TodoServiceError, TodoServiceResult, UpdateTaskRequest,
};
use crate::todo::{
    domain::{ListId, NewTask, Task, TaskId, TaskTitle, Urgency, UserId},
    hierarchy::{HierarchyError, TaskForest},
    ports::{TaskChangeSet, TodoStore, UserIdentity},
};
use mockable::Clock;
use tracing::{debug, info, warn};

impl<S, C> TodoService<S, C>
where
    S: TodoStore,
    C: Clock + Send + Sync,
{
    /// Creates a task at the top of a list or under a parent task.
    ///
    /// A subtask always joins its parent's list.
    ///
    /// # Errors
    ///
    /// Returns [`TodoServiceError::Validation`] for an empty title or an
    /// unknown urgency, [`TodoServiceError::NotFound`] when the list or
    /// parent is not the caller's, and [`TodoServiceError::Conflict`] when
    /// the subtask would reach the depth limit.
    pub async fn create_task(
        &self,
        caller: &UserIdentity,
        request: CreateTaskRequest,
    ) -> TodoServiceResult<TaskView> {
        let title = TaskTitle::new(request.title)?;
        let urgency = request
            .urgency
            .as_deref()
            .map(Urgency::try_from)
            .transpose()?
            .unwrap_or_default();
        let owner = caller.user_id();

        let description = request.description;
        let (task, depth) = match request.placement {
            Placement::List(list_id) => {
                self.owned_list(owner, list_id).await?;
                let task = self.new_task(owner, list_id, None, title, description, urgency);
                self.commit(TaskChangeSet::new().insert(task.clone())).await?;
                (task, 0)
            }
            Placement::Parent {
                parent_id,
                list_id: requested_list,
            } => {
                if let Some(requested) = requested_list {
                    self.owned_list(owner, requested).await?;
                }
                let parent = self.owned_task(owner, parent_id).await?;
                let list_id = parent.list_id();
                let (_, created) = self
                    .mutate(owner, &[list_id], |forest| {
                        ensure_loaded(forest, parent_id)?;
                        let depth = forest.ensure_can_adopt(parent_id, self.limit).inspect_err(
                            |err| warn!(parent_id = %parent_id, error = %err, "rejected subtask"),
                        )?;
                        let task = self.new_task(
                            owner,
                            list_id,
                            Some(parent_id),
                            title.clone(),
                            description.clone(),
                            urgency,
                        );
                        Ok(((task.clone(), depth), TaskChangeSet::new().insert(task)))
                    })
                    .await?;
                created
            }
        };

        info!(task_id = %task.id(), list_id = %task.list_id(), depth, "created task");
        Ok(TaskView::flat(&task, depth))
    }

    /// Returns a task with its whole subtree.
    ///
    /// # Errors
    ///
    /// Returns [`TodoServiceError::NotFound`] when the caller owns no such
    /// task.
    pub async fn get_task(&self, caller: &UserIdentity, id: TaskId) -> TodoServiceResult<TaskView> {
        let forest = self.forest_of(caller, id).await?;
        Ok(TaskView::tree(&forest, id)?)
    }

    /// Returns a task and the subtrees of its direct children.
    ///
    /// # Errors
    ///
    /// Returns [`TodoServiceError::NotFound`] when the caller owns no such
    /// task.
    pub async fn subtasks(
        &self,
        caller: &UserIdentity,
        id: TaskId,
    ) -> TodoServiceResult<SubtasksView> {
        let forest = self.forest_of(caller, id).await?;
        let mut tree = TaskView::tree(&forest, id)?;
        let subtasks = tree.children.take().unwrap_or_default();
        Ok(SubtasksView {
            parent: tree,
            subtasks,
        })
    }

    /// Returns a task's subtree with its depth and descendant count.
    ///
    /// # Errors
    ///
    /// Returns [`TodoServiceError::NotFound`] when the caller owns no such
    /// task.
    pub async fn task_tree(
        &self,
        caller: &UserIdentity,
        id: TaskId,
    ) -> TodoServiceResult<TaskTreeView> {
        let forest = self.forest_of(caller, id).await?;
        let tree = TaskView::tree(&forest, id)?;
        Ok(TaskTreeView {
            depth: tree.depth,
            total_descendants: forest.descendants(id)?.len(),
            tree,
        })
    }

    /// Returns a task followed by all of its descendants in pre-order.
    ///
    /// # Errors
    ///
    /// Returns [`TodoServiceError::NotFound`] when the caller owns no such
    /// task.
    pub async fn flatten_task(
        &self,
        caller: &UserIdentity,
        id: TaskId,
    ) -> TodoServiceResult<FlattenedTasks> {
        let forest = self.forest_of(caller, id).await?;
        let tasks = forest
            .subtree(id)?
            .into_iter()
            .map(|member| flat_view(&forest, member))
            .collect::<TodoServiceResult<Vec<_>>>()?;
        let completed_count = tasks.iter().filter(|task| task.completed).count();
        Ok(FlattenedTasks {
            total_count: tasks.len(),
            completed_count,
            tasks,
        })
    }

    /// Applies a partial update to a task.
    ///
    /// An unknown urgency is ignored and a cleared description is removed.
    /// Completing cascades down the subtree; re-opening walks up through
    /// completed ancestors.
    ///
    /// # Errors
    ///
    /// Returns [`TodoServiceError::NotFound`] when the caller owns no such
    /// task and [`TodoServiceError::Validation`] for an empty title.
    pub async fn update_task(
        &self,
        caller: &UserIdentity,
        id: TaskId,
        request: UpdateTaskRequest,
    ) -> TodoServiceResult<TaskView> {
        let task = self.owned_task(caller.user_id(), id).await?;
        let new_title = request.title.map(TaskTitle::new).transpose()?;
        let new_urgency = request.urgency.and_then(|raw| {
            Urgency::try_from(raw.as_str())
                .inspect_err(|err| debug!(task_id = %id, error = %err, "ignoring urgency"))
                .ok()
        });
        let new_description = request.description;
        let completed = request.completed;

        let (forest, ()) = self
            .mutate(task.owner(), &[task.list_id()], |forest| {
                ensure_loaded(forest, id)?;
                if new_title.is_some() || new_description.is_some() || new_urgency.is_some() {
                    forest.edit(id, |edited| {
                        if let Some(title) = new_title.clone() {
                            edited.retitle(title);
                        }
                        if let Some(description) = new_description.clone() {
                            edited.set_description(description);
                        }
                        if let Some(urgency) = new_urgency {
                            edited.set_urgency(urgency);
                        }
                    })?;
                }
                match completed {
                    Some(true) => forest.mark_completed(id, true, self.clock.utc())?,
                    Some(false) => forest.mark_incomplete(id, true)?,
                    None => {}
                }
                Ok(((), TaskChangeSet::new()))
            })
            .await?;

        info!(task_id = %id, changed = forest.changed_tasks().len(), "updated task");
        flat_view(&forest, id)
    }

    /// Deletes a task and its whole subtree. Returns how many tasks were
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns [`TodoServiceError::NotFound`] when the caller owns no such
    /// task.
    pub async fn delete_task(&self, caller: &UserIdentity, id: TaskId) -> TodoServiceResult<usize> {
        let task = self.owned_task(caller.user_id(), id).await?;
        let (_, removed) = self
            .mutate(task.owner(), &[task.list_id()], |forest| {
                ensure_loaded(forest, id)?;
                let subtree = forest.subtree(id)?;
                Ok((subtree.len(), TaskChangeSet::new().delete(subtree)))
            })
            .await?;
        info!(task_id = %id, removed, "deleted task");
        Ok(removed)
    }

    /// Moves a task under `new_parent` in the same list, or to the top level
    /// when `None`. Returns the moved subtree.
    ///
    /// # Errors
    ///
    /// Returns [`TodoServiceError::NotFound`] when either task is not the
    /// caller's and [`TodoServiceError::Conflict`] when the move would form
    /// a cycle, exceed the depth limit, or cross lists. Nothing changes on
    /// error.
    pub async fn move_task(
        &self,
        caller: &UserIdentity,
        id: TaskId,
        new_parent: Option<TaskId>,
    ) -> TodoServiceResult<TaskView> {
        let owner = caller.user_id();
        let task = self.owned_task(owner, id).await?;
        let mut lists = vec![task.list_id()];
        if let Some(parent_id) = new_parent {
            let parent = self.owned_task(owner, parent_id).await?;
            if parent.list_id() != task.list_id() {
                lists.push(parent.list_id());
            }
        }

        let (forest, ()) = self
            .mutate(owner, &lists, |forest| {
                ensure_loaded(forest, id)?;
                if let Some(parent_id) = new_parent {
                    ensure_loaded(forest, parent_id)?;
                }
                forest
                    .reparent(id, new_parent, self.limit)
                    .inspect_err(|err| warn!(task_id = %id, error = %err, "rejected task move"))?;
                Ok(((), TaskChangeSet::new()))
            })
            .await?;
        info!(task_id = %id, parent_id = ?new_parent, "moved task");
        Ok(TaskView::tree(&forest, id)?)
    }

    /// Moves a top-level task and its descendants to another of the
    /// caller's lists. Returns the moved subtree.
    ///
    /// # Errors
    ///
    /// Returns [`TodoServiceError::NotFound`] when the task or list is not
    /// the caller's and [`TodoServiceError::Conflict`] when the task has a
    /// parent.
    pub async fn move_task_to_list(
        &self,
        caller: &UserIdentity,
        id: TaskId,
        list_id: ListId,
    ) -> TodoServiceResult<TaskView> {
        let owner = caller.user_id();
        let task = self.owned_task(owner, id).await?;
        if !task.is_top_level() {
            let err = HierarchyError::NotTopLevel(id);
            warn!(task_id = %id, error = %err, "rejected list move");
            return Err(TodoServiceError::Conflict(err));
        }
        self.owned_list(owner, list_id).await?;

        let (forest, moved) = self
            .mutate(owner, &[task.list_id()], |forest| {
                ensure_loaded(forest, id)?;
                let moved = forest
                    .move_subtree_to_list(id, list_id)
                    .inspect_err(|err| warn!(task_id = %id, error = %err, "rejected list move"))?;
                Ok((moved.len(), TaskChangeSet::new()))
            })
            .await?;
        info!(task_id = %id, list_id = %list_id, moved, "moved task to list");
        Ok(TaskView::tree(&forest, id)?)
    }

    /// Loads the forest of the list holding the caller's task `id`.
    async fn forest_of(&self, caller: &UserIdentity, id: TaskId) -> TodoServiceResult<TaskForest> {
        let owner = caller.user_id();
        let task = self.owned_task(owner, id).await?;
        let forest = self.load_forest(owner, &[task.list_id()]).await?;
        ensure_loaded(&forest, id)?;
        Ok(forest)
    }

    fn new_task(
        &self,
        owner: UserId,
        list_id: ListId,
        parent_id: Option<TaskId>,
        title: TaskTitle,
        description: Option<String>,
        urgency: Urgency,
    ) -> Task {
        Task::new(
            NewTask {
                owner,
                list_id,
                parent_id,
                title,
                description,
                urgency,
            },
            &*self.clock,
        )
    }
}

fn flat_view(forest: &TaskForest, id: TaskId) -> TodoServiceResult<TaskView> {
    let task = forest
        .get(id)
        .ok_or(TodoServiceError::NotFound(Resource::Task(id)))?;
    Ok(TaskView::flat(task, forest.depth(id)?))
}
