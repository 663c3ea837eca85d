// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Root-to-render-root paths.
//!
//! A [`NodePath`] records the chain of nodes from the scene root down to the
//! render root chosen for one dirty region. The renderer walks it with the
//! cursor API ([`current`](NodePath::current) / [`advance`](NodePath::advance)):
//! at each group along the path it descends into the recorded child instead
//! of painting the whole child list, and paints normally from the final node
//! on.
//!
//! Paths are designed for reuse: [`clear`](NodePath::clear) empties the path
//! without releasing storage, and [`reset`](NodePath::reset) rewinds the
//! cursor for a second walk.

use alloc::vec::Vec;

use crate::node::NodeId;

/// A reusable chain of nodes from the scene root to a render root.
///
/// An empty path means nothing needs painting for the region.
#[derive(Clone, Debug, Default)]
pub struct NodePath {
    nodes: Vec<NodeId>,
    position: usize,
}

impl NodePath {
    /// Creates an empty path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of nodes on the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns whether the path is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the node at the given position, root first.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[must_use]
    pub fn get(&self, index: usize) -> NodeId {
        self.nodes[index]
    }

    /// Returns the nodes on the path, root first.
    #[must_use]
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Returns the node under the cursor, or `None` when the walk is done.
    #[must_use]
    pub fn current(&self) -> Option<NodeId> {
        self.nodes.get(self.position).copied()
    }

    /// Returns whether nodes remain after the cursor.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.position + 1 < self.nodes.len()
    }

    /// Moves the cursor to the next node on the path.
    pub fn advance(&mut self) {
        self.position += 1;
    }

    /// Rewinds the cursor to the root for another walk.
    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Empties the path, retaining storage, and rewinds the cursor.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.position = 0;
    }

    pub(crate) fn push(&mut self, id: NodeId) {
        self.nodes.push(id);
    }

    pub(crate) fn pop(&mut self) {
        self.nodes.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{NodeKind, NodeStore};

    #[test]
    fn cursor_walks_root_first() {
        let mut store = NodeStore::new();
        let a = store.create_node(NodeKind::Group { opaque_insets: None });
        let b = store.create_node(NodeKind::Group { opaque_insets: None });
        let c = store.create_node(NodeKind::Path);

        let mut path = NodePath::new();
        path.push(a);
        path.push(b);
        path.push(c);

        assert_eq!(path.len(), 3);
        assert_eq!(path.current(), Some(a));
        assert!(path.has_next());
        path.advance();
        assert_eq!(path.current(), Some(b));
        path.advance();
        assert_eq!(path.current(), Some(c));
        assert!(!path.has_next());
        path.advance();
        assert_eq!(path.current(), None);

        path.reset();
        assert_eq!(path.current(), Some(a));

        path.clear();
        assert!(path.is_empty());
        assert_eq!(path.current(), None);
    }

    #[test]
    #[should_panic(expected = "index out of bounds")]
    fn out_of_range_access_panics() {
        let path = NodePath::new();
        let _ = path.get(0);
    }
}
