//! Maximum nesting depth for task hierarchies.

use std::fmt;

/// Maximum depth of a task hierarchy, where top-level tasks sit at depth 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthLimit(usize);

impl DepthLimit {
    /// Default maximum depth.
    pub const DEFAULT: Self = Self(5);

    /// Creates a depth limit, or `None` when `max_depth` is zero.
    #[must_use]
    pub const fn new(max_depth: usize) -> Option<Self> {
        if max_depth == 0 {
            return None;
        }
        Some(Self(max_depth))
    }

    /// Returns the maximum depth.
    #[must_use]
    pub const fn max_depth(self) -> usize {
        self.0
    }

    /// Returns `true` when a new subtask may be created under a parent at
    /// `parent_depth`; the subtask's own depth must stay below the maximum.
    #[must_use]
    pub const fn admits_child_of(self, parent_depth: usize) -> bool {
        parent_depth.saturating_add(1) < self.0
    }

    /// Returns `true` when an existing task may be moved under a parent at
    /// `parent_depth`.
    ///
    /// Only the parent's depth is checked; the height of the moved subtree is
    /// not.
    #[must_use]
    pub const fn admits_reparent_under(self, parent_depth: usize) -> bool {
        parent_depth < self.0
    }
}

impl Default for DepthLimit {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for DepthLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
