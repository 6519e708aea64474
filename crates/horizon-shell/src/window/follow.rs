//! Follow-move relations between windows.
//!
//! A follower is repositioned whenever its parent moves. Relations are kept
//! one level deep: a window that starts following hands its own followers
//! over to its new parent, and a window asked to follow a follower follows
//! that follower's parent instead. The graph therefore has no chains and
//! no cycles, and each window follows at most one parent.

use std::collections::HashMap;

use crate::window::registry::WindowKey;

/// Parent → followers adjacency.
#[derive(Debug, Clone, Default)]
pub struct FollowGraph {
    edges: HashMap<WindowKey, Vec<WindowKey>>,
}

impl FollowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// The window `child` follows, if any.
    pub fn parent_of(&self, child: &str) -> Option<&WindowKey> {
        self.edges
            .iter()
            .find(|(_, followers)| followers.iter().any(|f| f == child))
            .map(|(parent, _)| parent)
    }

    /// The window that followers of `key` actually attach to.
    pub fn root_of(&self, key: &str) -> WindowKey {
        self.parent_of(key).cloned().unwrap_or_else(|| key.to_string())
    }

    /// Windows following `parent`.
    pub fn followers(&self, parent: &str) -> &[WindowKey] {
        self.edges.get(parent).map_or(&[], Vec::as_slice)
    }

    pub fn has_followers(&self, parent: &str) -> bool {
        !self.followers(parent).is_empty()
    }

    /// Make `child` follow `parent` (or `parent`'s own parent).
    ///
    /// Returns the window actually followed, or `None` when the relation
    /// would be a self-edge.
    pub fn add(&mut self, parent: &str, child: &str) -> Option<WindowKey> {
        let root = self.root_of(parent);
        if root == child {
            return None;
        }

        self.detach(child);
        let handed_over = self.edges.remove(child).unwrap_or_default();

        let followers = self.edges.entry(root.clone()).or_default();
        for key in std::iter::once(child.to_string()).chain(handed_over) {
            if key != root && !followers.contains(&key) {
                followers.push(key);
            }
        }
        Some(root)
    }

    /// Drop every relation involving `key`, as parent or as follower.
    pub fn remove_window(&mut self, key: &str) {
        self.edges.remove(key);
        self.detach(key);
    }

    /// Number of windows with at least one follower.
    pub fn relation_count(&self) -> usize {
        self.edges.len()
    }

    pub fn clear(&mut self) {
        self.edges.clear();
    }

    fn detach(&mut self, child: &str) {
        self.edges.retain(|_, followers| {
            followers.retain(|f| f != child);
            !followers.is_empty()
        });
    }
}
