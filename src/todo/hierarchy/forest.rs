//! Arena-backed task forest and the hierarchy algorithms over it.

use super::{DepthLimit, HierarchyError, HierarchyResult};
use crate::todo::domain::{ListId, Task, TaskId};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

/// Tasks keyed by identifier, with children derived from `parent_id`.
///
/// Children are ordered by creation time, then identifier. Every mutation
/// records the touched task so callers can persist exactly the changed rows
/// via [`TaskForest::changed_tasks`].
#[derive(Debug, Clone, Default)]
pub struct TaskForest {
    tasks: HashMap<TaskId, Task>,
    children: HashMap<TaskId, Vec<TaskId>>,
    roots: Vec<TaskId>,
    changed: Vec<TaskId>,
    changed_index: HashSet<TaskId>,
}

impl TaskForest {
    /// Builds a forest from stored tasks.
    ///
    /// Tasks whose parent is not part of the input are reachable by
    /// identifier but are not listed as roots.
    #[must_use]
    pub fn from_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let mut ordered: Vec<Task> = tasks.into_iter().collect();
        ordered.sort_by(|left, right| {
            left.created_at()
                .cmp(&right.created_at())
                .then_with(|| left.id().cmp(&right.id()))
        });

        let mut forest = Self::default();
        for task in ordered {
            if forest.tasks.contains_key(&task.id()) {
                continue;
            }
            forest.link(task.id(), task.parent_id());
            forest.tasks.insert(task.id(), task);
        }
        forest
    }

    /// Returns the number of tasks in the forest.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` when the forest holds no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Returns the task with the given identifier.
    #[must_use]
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    /// Returns the top-level tasks in child order.
    pub fn roots(&self) -> impl Iterator<Item = &Task> + '_ {
        self.roots.iter().filter_map(|id| self.tasks.get(id))
    }

    /// Returns the identifiers of the direct children of `id`.
    #[must_use]
    pub fn child_ids(&self, id: TaskId) -> &[TaskId] {
        self.children
            .get(&id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns the direct children of `id` in child order.
    pub fn children(&self, id: TaskId) -> impl Iterator<Item = &Task> + '_ {
        self.child_ids(id)
            .iter()
            .filter_map(|child| self.tasks.get(child))
    }

    /// Returns the ancestors of `id`, nearest first.
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError::UnknownTask`] when `id` is not loaded and
    /// [`HierarchyError::BrokenParentChain`] when the stored chain references
    /// a missing task or loops.
    pub fn ancestors(&self, id: TaskId) -> HierarchyResult<Vec<TaskId>> {
        let mut current = self.require(id)?;
        let mut chain = Vec::new();
        while let Some(parent_id) = current.parent_id() {
            if parent_id == id || chain.contains(&parent_id) {
                return Err(HierarchyError::BrokenParentChain(id));
            }
            chain.push(parent_id);
            current = self
                .tasks
                .get(&parent_id)
                .ok_or(HierarchyError::BrokenParentChain(id))?;
        }
        Ok(chain)
    }

    /// Returns the depth of `id`: 0 for a top-level task, otherwise one more
    /// than its parent. Always walks the stored parent chain.
    ///
    /// # Errors
    ///
    /// See [`TaskForest::ancestors`].
    pub fn depth(&self, id: TaskId) -> HierarchyResult<usize> {
        Ok(self.ancestors(id)?.len())
    }

    /// Returns `true` when `ancestor` appears in the parent chain of `task`.
    ///
    /// # Errors
    ///
    /// See [`TaskForest::ancestors`].
    pub fn is_ancestor_of(&self, ancestor: TaskId, task: TaskId) -> HierarchyResult<bool> {
        Ok(self.ancestors(task)?.contains(&ancestor))
    }

    /// Returns every descendant of `id` in pre-order, excluding `id`.
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError::UnknownTask`] when `id` is not loaded.
    pub fn descendants(&self, id: TaskId) -> HierarchyResult<Vec<TaskId>> {
        self.require(id)?;
        let mut seen = HashSet::from([id]);
        let mut ordered = Vec::new();
        let mut pending: Vec<TaskId> = self.child_ids(id).iter().rev().copied().collect();
        while let Some(current) = pending.pop() {
            if !seen.insert(current) {
                continue;
            }
            ordered.push(current);
            pending.extend(self.child_ids(current).iter().rev().copied());
        }
        Ok(ordered)
    }

    /// Returns `id` followed by all of its descendants in pre-order.
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError::UnknownTask`] when `id` is not loaded.
    pub fn subtree(&self, id: TaskId) -> HierarchyResult<Vec<TaskId>> {
        let mut members = vec![id];
        members.extend(self.descendants(id)?);
        Ok(members)
    }

    /// Checks that a new subtask may be created under `parent_id` and returns
    /// the depth the subtask would have.
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError::DepthLimitExceeded`] when the subtask would
    /// reach the maximum depth, or a chain error from
    /// [`TaskForest::depth`].
    pub fn ensure_can_adopt(&self, parent_id: TaskId, limit: DepthLimit) -> HierarchyResult<usize> {
        let parent_depth = self.depth(parent_id)?;
        if !limit.admits_child_of(parent_depth) {
            return Err(HierarchyError::DepthLimitExceeded {
                parent_id,
                parent_depth,
                max_depth: limit.max_depth(),
            });
        }
        Ok(parent_depth + 1)
    }

    /// Marks `id` completed at `at`.
    ///
    /// With `cascade`, every child that is not already completed is marked
    /// completed too, recursively; completed children and their subtrees are
    /// left as they are.
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError::UnknownTask`] when `id` is not loaded.
    pub fn mark_completed(
        &mut self,
        id: TaskId,
        cascade: bool,
        at: DateTime<Utc>,
    ) -> HierarchyResult<()> {
        self.require(id)?;
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            self.modify(current, |task| task.complete(at))?;
            if cascade {
                let open_children: Vec<TaskId> = self
                    .children(current)
                    .filter(|child| !child.is_completed())
                    .map(Task::id)
                    .collect();
                pending.extend(open_children.into_iter().rev());
            }
        }
        Ok(())
    }

    /// Marks `id` incomplete.
    ///
    /// With `cascade`, walks up the parent chain re-opening each completed
    /// ancestor and stops at the first ancestor that is not completed.
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError::UnknownTask`] when `id` is not loaded and
    /// [`HierarchyError::BrokenParentChain`] when a stored parent is missing.
    pub fn mark_incomplete(&mut self, id: TaskId, cascade: bool) -> HierarchyResult<()> {
        self.modify(id, Task::reopen)?;
        if !cascade {
            return Ok(());
        }

        let mut cursor = self.require(id)?.parent_id();
        while let Some(parent_id) = cursor {
            let parent = self
                .tasks
                .get(&parent_id)
                .ok_or(HierarchyError::BrokenParentChain(id))?;
            if !parent.is_completed() {
                break;
            }
            cursor = parent.parent_id();
            self.modify(parent_id, Task::reopen)?;
        }
        Ok(())
    }

    /// Moves `id` under `new_parent`, or to the top level when `None`.
    ///
    /// A new parent must be loaded, must not be `id` or one of its
    /// descendants, must sit above the depth limit, and must belong to the
    /// same list.
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError::CycleDetected`],
    /// [`HierarchyError::DepthLimitExceeded`], or
    /// [`HierarchyError::CrossListReparent`] for rule violations, and
    /// [`HierarchyError::UnknownTask`] when either task is not loaded. The
    /// forest is unchanged on error.
    pub fn reparent(
        &mut self,
        id: TaskId,
        new_parent: Option<TaskId>,
        limit: DepthLimit,
    ) -> HierarchyResult<()> {
        let task = self.require(id)?;
        let old_parent = task.parent_id();
        let task_list = task.list_id();

        if let Some(parent_id) = new_parent {
            let parent_list = self.require(parent_id)?.list_id();
            if parent_id == id || self.is_ancestor_of(id, parent_id)? {
                return Err(HierarchyError::CycleDetected {
                    task_id: id,
                    new_parent_id: parent_id,
                });
            }
            let parent_depth = self.depth(parent_id)?;
            if !limit.admits_reparent_under(parent_depth) {
                return Err(HierarchyError::DepthLimitExceeded {
                    parent_id,
                    parent_depth,
                    max_depth: limit.max_depth(),
                });
            }
            if parent_list != task_list {
                return Err(HierarchyError::CrossListReparent {
                    task_id: id,
                    task_list,
                    parent_list,
                });
            }
        }

        self.modify(id, |task| task.set_parent(new_parent))?;
        self.unlink(id, old_parent);
        self.link(id, new_parent);
        Ok(())
    }

    /// Moves a top-level task and all of its descendants to `list_id`.
    ///
    /// Returns the moved tasks in pre-order. Depth is not re-checked.
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError::NotTopLevel`] when `id` has a parent.
    pub fn move_subtree_to_list(
        &mut self,
        id: TaskId,
        list_id: ListId,
    ) -> HierarchyResult<Vec<TaskId>> {
        if !self.require(id)?.is_top_level() {
            return Err(HierarchyError::NotTopLevel(id));
        }
        let subtree = self.subtree(id)?;
        for member in &subtree {
            self.modify(*member, |task| task.set_list(list_id))?;
        }
        Ok(subtree)
    }

    /// Completes every top-level task that is not completed yet, cascading
    /// down each one. Returns how many top-level tasks were targeted.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`TaskForest::mark_completed`].
    pub fn complete_top_level(&mut self, at: DateTime<Utc>) -> HierarchyResult<usize> {
        let open_roots: Vec<TaskId> = self
            .roots()
            .filter(|task| !task.is_completed())
            .map(Task::id)
            .collect();
        for root in &open_roots {
            self.mark_completed(*root, true, at)?;
        }
        Ok(open_roots.len())
    }

    /// Re-opens every completed task in the forest, nested or not, without
    /// any cascade. Returns how many tasks changed.
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError::UnknownTask`] only if the arena is
    /// inconsistent.
    pub fn reopen_all(&mut self) -> HierarchyResult<usize> {
        let completed: Vec<TaskId> = self
            .tasks
            .values()
            .filter(|task| task.is_completed())
            .map(Task::id)
            .collect();
        for id in &completed {
            self.modify(*id, Task::reopen)?;
        }
        Ok(completed.len())
    }

    /// Applies a non-structural edit (title, description, urgency) to `id`.
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError::UnknownTask`] when `id` is not loaded.
    pub fn edit(&mut self, id: TaskId, change: impl FnOnce(&mut Task)) -> HierarchyResult<()> {
        self.modify(id, change)
    }

    /// Returns copies of every task changed so far, in first-change order.
    #[must_use]
    pub fn changed_tasks(&self) -> Vec<Task> {
        self.changed
            .iter()
            .filter_map(|id| self.tasks.get(id))
            .cloned()
            .collect()
    }

    fn require(&self, id: TaskId) -> HierarchyResult<&Task> {
        self.tasks.get(&id).ok_or(HierarchyError::UnknownTask(id))
    }

    fn modify(&mut self, id: TaskId, change: impl FnOnce(&mut Task)) -> HierarchyResult<()> {
        let task = self
            .tasks
            .get_mut(&id)
            .ok_or(HierarchyError::UnknownTask(id))?;
        change(task);
        if self.changed_index.insert(id) {
            self.changed.push(id);
        }
        Ok(())
    }

    fn link(&mut self, id: TaskId, parent_id: Option<TaskId>) {
        match parent_id {
            Some(parent) => self.children.entry(parent).or_default().push(id),
            None => self.roots.push(id),
        }
    }

    fn unlink(&mut self, id: TaskId, parent_id: Option<TaskId>) {
        let siblings = match parent_id {
            Some(parent) => self.children.get_mut(&parent),
            None => Some(&mut self.roots),
        };
        if let Some(ids) = siblings {
            ids.retain(|sibling| *sibling != id);
        }
    }
}
