//! Task hierarchy engine.
//!
//! The engine works on an arena of tasks keyed by identifier, with a
//! parent-to-children index derived from the stored `parent_id` pointers. It
//! enforces the tree invariants (no cycles, bounded depth, single-list
//! membership) and implements the depth, ancestor, descendant, and completion
//! cascade algorithms. It performs no I/O: services load a [`TaskForest`]
//! from the store, apply operations, and persist
//! [`TaskForest::changed_tasks`] atomically.

mod error;
mod forest;
mod limit;

pub use error::{HierarchyError, HierarchyResult};
pub use forest::TaskForest;
pub use limit::DepthLimit;
