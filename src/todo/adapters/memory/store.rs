//! In-memory entity store.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::todo::{
    domain::{ListId, Task, TaskId, TodoList, User, UserId},
    ports::{ListSnapshot, TaskChangeSet, TodoStore, TodoStoreError, TodoStoreResult},
};

/// Thread-safe in-memory store.
///
/// Writes are staged on a copy of the current state, checked against the
/// uniqueness and foreign-key rules, and swapped in only when every check
/// passes, so a failed write leaves no trace.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTodoStore {
    state: Arc<RwLock<InMemoryTodoState>>,
}

#[derive(Debug, Clone, Default)]
struct InMemoryTodoState {
    users: HashMap<UserId, User>,
    lists: HashMap<ListId, TodoList>,
    tasks: HashMap<TaskId, Task>,
}

impl InMemoryTodoStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, f: impl FnOnce(&InMemoryTodoState) -> T) -> TodoStoreResult<T> {
        let state = self.state.read().map_err(|err| {
            TodoStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(f(&state))
    }

    fn write<T>(
        &self,
        f: impl FnOnce(&mut InMemoryTodoState) -> TodoStoreResult<T>,
    ) -> TodoStoreResult<T> {
        let mut state = self.state.write().map_err(|err| {
            TodoStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let mut staged = state.clone();
        let outcome = f(&mut staged)?;
        *state = staged;
        Ok(outcome)
    }
}

impl InMemoryTodoState {
    fn owned_list(&self, owner: UserId, id: ListId) -> Option<&TodoList> {
        self.lists.get(&id).filter(|list| list.owner() == owner)
    }

    /// Removes tasks whose list or parent no longer exists, repeating until
    /// nothing else goes.
    fn cascade_orphans(&mut self) {
        loop {
            let orphans: Vec<TaskId> = self
                .tasks
                .values()
                .filter(|task| {
                    !self.lists.contains_key(&task.list_id())
                        || task
                            .parent_id()
                            .is_some_and(|parent| !self.tasks.contains_key(&parent))
                })
                .map(Task::id)
                .collect();
            if orphans.is_empty() {
                return;
            }
            for id in orphans {
                self.tasks.remove(&id);
            }
        }
    }

    fn ensure_unchanged(&self, snapshot: &ListSnapshot) -> TodoStoreResult<()> {
        let current: Vec<Task> = self
            .tasks
            .values()
            .filter(|task| {
                task.owner() == snapshot.owner() && snapshot.list_ids().contains(&task.list_id())
            })
            .cloned()
            .collect();
        if snapshot.matches(&current) {
            Ok(())
        } else {
            Err(TodoStoreError::Stale)
        }
    }

    fn check_task_references(&self, task: &Task) -> TodoStoreResult<()> {
        if !self.users.contains_key(&task.owner()) {
            return Err(TodoStoreError::ForeignKey(format!(
                "task {} references missing user {}",
                task.id(),
                task.owner()
            )));
        }
        if self.owned_list(task.owner(), task.list_id()).is_none() {
            return Err(TodoStoreError::ForeignKey(format!(
                "task {} references missing list {}",
                task.id(),
                task.list_id()
            )));
        }
        if let Some(parent_id) = task.parent_id() {
            let parent_owned = self
                .tasks
                .get(&parent_id)
                .is_some_and(|parent| parent.owner() == task.owner());
            if !parent_owned {
                return Err(TodoStoreError::ForeignKey(format!(
                    "task {} references missing parent {parent_id}",
                    task.id()
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl TodoStore for InMemoryTodoStore {
    async fn store_user(&self, user: &User) -> TodoStoreResult<()> {
        self.write(|state| {
            if state
                .users
                .values()
                .any(|existing| existing.username() == user.username())
            {
                return Err(TodoStoreError::DuplicateUsername(
                    user.username().as_str().to_owned(),
                ));
            }
            if state
                .users
                .values()
                .any(|existing| existing.email() == user.email())
            {
                return Err(TodoStoreError::DuplicateEmail(user.email().as_str().to_owned()));
            }
            state.users.insert(user.id(), user.clone());
            Ok(())
        })
    }

    async fn find_user(&self, id: UserId) -> TodoStoreResult<Option<User>> {
        self.read(|state| state.users.get(&id).cloned())
    }

    async fn find_user_by_login(&self, login: &str) -> TodoStoreResult<Option<User>> {
        self.read(|state| {
            state
                .users
                .values()
                .find(|user| user.username().as_str() == login || user.email().as_str() == login)
                .cloned()
        })
    }

    async fn delete_user(&self, id: UserId) -> TodoStoreResult<()> {
        self.write(|state| {
            state
                .users
                .remove(&id)
                .ok_or(TodoStoreError::UserNotFound(id))?;
            state.lists.retain(|_, list| list.owner() != id);
            state.tasks.retain(|_, task| task.owner() != id);
            state.cascade_orphans();
            Ok(())
        })
    }

    async fn store_list(&self, list: &TodoList) -> TodoStoreResult<()> {
        self.write(|state| {
            if !state.users.contains_key(&list.owner()) {
                return Err(TodoStoreError::ForeignKey(format!(
                    "list {} references missing user {}",
                    list.id(),
                    list.owner()
                )));
            }
            state.lists.insert(list.id(), list.clone());
            Ok(())
        })
    }

    async fn update_list(&self, list: &TodoList) -> TodoStoreResult<()> {
        self.write(|state| {
            let existing = state
                .lists
                .get_mut(&list.id())
                .ok_or(TodoStoreError::ListNotFound(list.id()))?;
            *existing = list.clone();
            Ok(())
        })
    }

    async fn find_list(&self, owner: UserId, id: ListId) -> TodoStoreResult<Option<TodoList>> {
        self.read(|state| state.owned_list(owner, id).cloned())
    }

    async fn lists_for_owner(&self, owner: UserId) -> TodoStoreResult<Vec<TodoList>> {
        let mut lists = self.read(|state| {
            state
                .lists
                .values()
                .filter(|list| list.owner() == owner)
                .cloned()
                .collect::<Vec<_>>()
        })?;
        lists.sort_by_key(|list| (list.created_at(), list.id()));
        Ok(lists)
    }

    async fn delete_list(&self, owner: UserId, id: ListId) -> TodoStoreResult<()> {
        self.write(|state| {
            if state.owned_list(owner, id).is_none() {
                return Err(TodoStoreError::ListNotFound(id));
            }
            state.lists.remove(&id);
            state.cascade_orphans();
            Ok(())
        })
    }

    async fn find_task(&self, owner: UserId, id: TaskId) -> TodoStoreResult<Option<Task>> {
        self.read(|state| {
            state
                .tasks
                .get(&id)
                .filter(|task| task.owner() == owner)
                .cloned()
        })
    }

    async fn tasks_in_list(&self, owner: UserId, list_id: ListId) -> TodoStoreResult<Vec<Task>> {
        let mut tasks = self.read(|state| {
            state
                .tasks
                .values()
                .filter(|task| task.owner() == owner && task.list_id() == list_id)
                .cloned()
                .collect::<Vec<_>>()
        })?;
        tasks.sort_by_key(|task| (task.created_at(), task.id()));
        Ok(tasks)
    }

    async fn apply(&self, changes: &TaskChangeSet) -> TodoStoreResult<()> {
        self.write(|state| {
            if let Some(snapshot) = changes.expected() {
                state.ensure_unchanged(snapshot)?;
            }
            for task in changes.inserted() {
                if state.tasks.contains_key(&task.id()) {
                    return Err(TodoStoreError::DuplicateTask(task.id()));
                }
                state.tasks.insert(task.id(), task.clone());
            }
            for task in changes.updated() {
                let existing = state
                    .tasks
                    .get_mut(&task.id())
                    .ok_or(TodoStoreError::TaskNotFound(task.id()))?;
                *existing = task.clone();
            }
            for task in changes.inserted().iter().chain(changes.updated()) {
                state.check_task_references(task)?;
            }

            let deleted: HashSet<TaskId> = changes.deleted().iter().copied().collect();
            state.tasks.retain(|id, _| !deleted.contains(id));
            state.cascade_orphans();
            Ok(())
        })
    }
}
