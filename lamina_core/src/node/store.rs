// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage with allocation, topology, and property
//! management.
//!
//! Every property setter runs the precise opaque-region invalidation rule for
//! that property (see [`opaque`](super::opaque)) and marks the node dirty,
//! propagating a `child_dirty` bit up the ancestor chain.

use alloc::vec::Vec;

use kurbo::{Affine, Rect};

use super::id::{INVALID, NodeId};
use super::kind::{BlendMode, EffectRef, NodeKind, passes_src_over};
use super::traverse::Children;

/// Repaint state of a single node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DirtyFlag {
    /// The node's pixels are up to date.
    #[default]
    Clean,
    /// The node must be repainted.
    Dirty,
}

/// Struct-of-arrays storage for all nodes of a scene tree.
///
/// Nodes are addressed by [`NodeId`] handles. Internally, each node occupies
/// a slot in parallel arrays. Destroyed nodes are recycled via a free list,
/// and generation counters prevent stale handle access.
///
/// The store carries everything the repaint passes need: topology, visual
/// properties, parent-space bounds, the cached opaque region with its
/// validity flag, per-frame culling bits, and dirty flags.
#[derive(Debug)]
pub struct NodeStore {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Local properties (set by callers) --
    pub(crate) kind: Vec<NodeKind>,
    pub(crate) transform: Vec<Affine>,
    pub(crate) opacity: Vec<f32>,
    pub(crate) blend_mode: Vec<Option<BlendMode>>,
    pub(crate) effect: Vec<Option<EffectRef>>,
    pub(crate) clip: Vec<u32>,
    pub(crate) visible: Vec<bool>,

    // -- Bounds (maintained by the owner's layout/sync pass) --
    pub(crate) content_bounds: Vec<Rect>,
    pub(crate) transformed_bounds: Vec<Rect>,

    // -- Opaque-region cache --
    pub(crate) opaque_region: Vec<Option<Rect>>,
    pub(crate) opaque_region_invalid: Vec<bool>,
    /// Back-link: which node this node currently clips (`INVALID` if none),
    /// so invalidating a clip propagates to the clipped node.
    pub(crate) clip_target: Vec<u32>,

    // -- Per-frame repaint state --
    pub(crate) culling_bits: Vec<u32>,
    pub(crate) dirty: Vec<DirtyFlag>,
    pub(crate) child_dirty: Vec<bool>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Instrumentation --
    pub(crate) opaque_recomputes: u64,
}

impl Default for NodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeStore {
    /// Creates an empty node store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            kind: Vec::new(),
            transform: Vec::new(),
            opacity: Vec::new(),
            blend_mode: Vec::new(),
            effect: Vec::new(),
            clip: Vec::new(),
            visible: Vec::new(),
            content_bounds: Vec::new(),
            transformed_bounds: Vec::new(),
            opaque_region: Vec::new(),
            opaque_region_invalid: Vec::new(),
            clip_target: Vec::new(),
            culling_bits: Vec::new(),
            dirty: Vec::new(),
            child_dirty: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            opaque_recomputes: 0,
        }
    }

    // -- Allocation API --

    /// Creates a new node of the given kind and returns its handle.
    ///
    /// The node starts detached, visible, with an identity transform, full
    /// opacity, inherited blending, no effect, no clip, zero bounds, and a
    /// `Dirty` flag (it has never been painted).
    pub fn create_node(&mut self, kind: NodeKind) -> NodeId {
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot.
            let i = idx as usize;
            self.generation[i] += 1;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.kind[i] = kind;
            self.transform[i] = Affine::IDENTITY;
            self.opacity[i] = 1.0;
            self.blend_mode[i] = None;
            self.effect[i] = None;
            self.clip[i] = INVALID;
            self.visible[i] = true;
            self.content_bounds[i] = Rect::ZERO;
            self.transformed_bounds[i] = Rect::ZERO;
            self.opaque_region[i] = None;
            self.opaque_region_invalid[i] = true;
            self.clip_target[i] = INVALID;
            self.culling_bits[i] = 0;
            self.dirty[i] = DirtyFlag::Dirty;
            self.child_dirty[i] = false;
            idx
        } else {
            // Allocate a new slot.
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.kind.push(kind);
            self.transform.push(Affine::IDENTITY);
            self.opacity.push(1.0);
            self.blend_mode.push(None);
            self.effect.push(None);
            self.clip.push(INVALID);
            self.visible.push(true);
            self.content_bounds.push(Rect::ZERO);
            self.transformed_bounds.push(Rect::ZERO);
            self.opaque_region.push(None);
            self.opaque_region_invalid.push(true);
            self.clip_target.push(INVALID);
            self.culling_bits.push(0);
            self.dirty.push(DirtyFlag::Dirty);
            self.child_dirty.push(false);
            self.generation.push(0);
            idx
        };

        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Destroys a node and its entire subtree, freeing the slots for reuse.
    ///
    /// Clip links are severed in both directions: nodes clipped by a
    /// destroyed node lose their clip (and have their opaque region
    /// invalidated), and clip nodes referenced by the destroyed subtree are
    /// released for reuse as clips elsewhere.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn destroy_node(&mut self, id: NodeId) {
        self.validate(id);
        let idx = id.idx;
        if self.parent[idx as usize] != INVALID {
            let p = self.parent[idx as usize];
            self.unlink_from_parent(idx);
            self.mark_dirty_at(p);
        }
        self.destroy_subtree(idx);
    }

    fn destroy_subtree(&mut self, idx: u32) {
        let i = idx as usize;
        let mut child = self.first_child[i];
        while child != INVALID {
            let next = self.next_sibling[child as usize];
            self.destroy_subtree(child);
            child = next;
        }
        self.first_child[i] = INVALID;

        // Sever clip links in both directions.
        let clip = self.clip[i];
        if clip != INVALID {
            self.clip_target[clip as usize] = INVALID;
            self.clip[i] = INVALID;
        }
        let target = self.clip_target[i];
        if target != INVALID {
            self.clip[target as usize] = INVALID;
            self.clip_target[i] = INVALID;
            self.invalidate_opaque_region_at(target);
            self.mark_dirty_at(target);
        }

        // Bump generation so old handles immediately fail validation.
        self.generation[i] += 1;
        self.free_list.push(idx);
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    /// Returns the number of live nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    // -- Topology API --

    /// Adds `child` as the last child of `parent` (topmost in paint order).
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, if `parent` is not a group, or if
    /// `child` already has a parent.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.validate(parent);
        self.validate(child);
        let p = parent.idx;
        let c = child.idx;
        assert!(
            matches!(self.kind[p as usize], NodeKind::Group { .. }),
            "only groups can have children"
        );
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );

        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            let last = self.last_child(p);
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }

        self.mark_dirty_at(c);
        self.mark_dirty_at(p);
    }

    /// Removes `child` from its current parent. The subtree stays alive and
    /// can be re-attached elsewhere.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node has no parent.
    pub fn remove_from_parent(&mut self, child: NodeId) {
        self.validate(child);
        let c = child.idx;
        assert!(self.parent[c as usize] != INVALID, "node has no parent");

        let p = self.parent[c as usize];
        self.unlink_from_parent(c);
        self.mark_dirty_at(p);
    }

    /// Inserts `child` before `sibling` in the sibling list (painting just
    /// below it).
    ///
    /// # Panics
    ///
    /// Panics if handles are stale, `child` already has a parent, or
    /// `sibling` has no parent.
    pub fn insert_before(&mut self, child: NodeId, sibling: NodeId) {
        self.validate(child);
        self.validate(sibling);
        let c = child.idx;
        let s = sibling.idx;
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );
        let p = self.parent[s as usize];
        assert!(p != INVALID, "sibling has no parent");

        self.parent[c as usize] = p;
        self.next_sibling[c as usize] = s;
        let before = self.prev_sibling[s as usize];
        self.prev_sibling[c as usize] = before;
        self.prev_sibling[s as usize] = c;
        if before == INVALID {
            self.first_child[p as usize] = c;
        } else {
            self.next_sibling[before as usize] = c;
        }

        self.mark_dirty_at(c);
        self.mark_dirty_at(p);
    }

    /// Returns the parent of `id`, if attached.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| self.make_id(p))
    }

    /// Returns an iterator over the direct children of `id`, bottom-most
    /// first.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    pub(crate) fn unlink_from_parent(&mut self, idx: u32) {
        let i = idx as usize;
        let p = self.parent[i] as usize;
        let prev = self.prev_sibling[i];
        let next = self.next_sibling[i];
        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            self.first_child[p] = next;
        }
        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }
        self.parent[i] = INVALID;
        self.prev_sibling[i] = INVALID;
        self.next_sibling[i] = INVALID;
    }

    pub(crate) fn last_child(&self, idx: u32) -> u32 {
        let mut last = self.first_child[idx as usize];
        if last == INVALID {
            return INVALID;
        }
        while self.next_sibling[last as usize] != INVALID {
            last = self.next_sibling[last as usize];
        }
        last
    }

    // -- Property setters --

    /// Sets the node's local-to-parent transform.
    ///
    /// Every write invalidates the opaque region; transforms are not
    /// compared for equality.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_transform(&mut self, id: NodeId, transform: Affine) {
        self.validate(id);
        self.transform[id.idx as usize] = transform;
        self.mark_dirty_at(id.idx);
        self.invalidate_opaque_region_at(id.idx);
    }

    /// Sets the node's opacity in `[0.0, 1.0]`.
    ///
    /// Only transitions across the fully-opaque or fully-transparent
    /// boundary can change whether an opaque region exists, so intermediate
    /// changes (say `0.5` to `0.6`) keep the cache valid.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the value is out of range.
    pub fn set_opacity(&mut self, id: NodeId, opacity: f32) {
        self.validate(id);
        assert!(
            (0.0..=1.0).contains(&opacity),
            "opacity must be in [0.0, 1.0]"
        );
        let i = id.idx as usize;
        let old = self.opacity[i];
        if old == opacity {
            return;
        }
        self.opacity[i] = opacity;
        self.mark_dirty_at(id.idx);
        let crosses_boundary = (old < 1.0 && (opacity == 1.0 || opacity == 0.0))
            || (opacity < 1.0 && (old == 1.0 || old == 0.0));
        if crosses_boundary {
            self.invalidate_opaque_region_at(id.idx);
        }
    }

    /// Sets the node's blend mode (`None` inherits source-over).
    ///
    /// The opaque region is invalidated only when the change can flip the
    /// source-over compatibility that opaque coverage depends on; swapping
    /// between two non-source-over modes keeps the cache valid.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_blend_mode(&mut self, id: NodeId, mode: Option<BlendMode>) {
        self.validate(id);
        let i = id.idx as usize;
        let old = self.blend_mode[i];
        if old == mode {
            return;
        }
        self.blend_mode[i] = mode;
        self.mark_dirty_at(id.idx);
        if passes_src_over(old) || passes_src_over(mode) {
            self.invalidate_opaque_region_at(id.idx);
        }
    }

    /// Attaches, replaces, or removes (`None`) the node's effect.
    ///
    /// Effects are treated conservatively: every reassignment invalidates
    /// the opaque region, even a reset to the same effect.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_effect(&mut self, id: NodeId, effect: Option<EffectRef>) {
        self.validate(id);
        self.effect[id.idx as usize] = effect;
        self.mark_dirty_at(id.idx);
        self.invalidate_opaque_region_at(id.idx);
    }

    /// Sets or clears the node's clip.
    ///
    /// The clip is a non-owning reference to another node whose shape masks
    /// this node; the clip's coordinate space is this node's local space.
    /// Assigning the clip the node already has is a no-op; any other
    /// assignment invalidates the opaque region.
    ///
    /// # Panics
    ///
    /// Panics if a handle is stale, if the node would clip itself (directly
    /// or through a chain of clips), or if the clip node already masks a
    /// different node.
    pub fn set_clip(&mut self, id: NodeId, clip: Option<NodeId>) {
        self.validate(id);
        if let Some(c) = clip {
            self.validate(c);
            assert!(c != id, "node cannot clip itself");
            // Clips can themselves be clipped; the chain must not loop back
            // to this node or opaque-region resolution would never terminate.
            let mut cur = self.clip[c.idx as usize];
            while cur != INVALID {
                assert!(cur != id.idx, "clip chain forms a cycle");
                cur = self.clip[cur as usize];
            }
        }
        let i = id.idx as usize;
        let new = clip.map_or(INVALID, |c| c.idx);
        if self.clip[i] == new {
            return;
        }
        let old = self.clip[i];
        if old != INVALID {
            self.clip_target[old as usize] = INVALID;
        }
        if new != INVALID {
            assert!(
                self.clip_target[new as usize] == INVALID,
                "node is already in use as a clip"
            );
            self.clip_target[new as usize] = id.idx;
        }
        self.clip[i] = new;
        self.mark_dirty_at(id.idx);
        self.invalidate_opaque_region_at(id.idx);
    }

    /// Shows or hides the node and its subtree.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        self.validate(id);
        let i = id.idx as usize;
        if self.visible[i] == visible {
            return;
        }
        self.visible[i] = visible;
        self.mark_dirty_at(id.idx);
    }

    /// Replaces the node's drawn geometry.
    ///
    /// The variant must match the node's existing kind; a node cannot change
    /// kind after creation.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the variant differs from the node's
    /// kind.
    pub fn set_geometry(&mut self, id: NodeId, kind: NodeKind) {
        self.validate(id);
        let i = id.idx as usize;
        assert!(
            core::mem::discriminant(&self.kind[i]) == core::mem::discriminant(&kind),
            "node kind cannot change"
        );
        self.kind[i] = kind;
        self.mark_dirty_at(id.idx);
        self.invalidate_opaque_region_at(id.idx);
    }

    /// Sets the node's complete bounds in local coordinates (content plus
    /// any outsets from strokes or effects).
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_content_bounds(&mut self, id: NodeId, bounds: Rect) {
        self.validate(id);
        self.content_bounds[id.idx as usize] = bounds;
        self.mark_dirty_at(id.idx);
    }

    /// Sets the node's complete bounds in its parent's coordinate space.
    ///
    /// Maintained by the owner's layout pass; culling and the render-root
    /// search classify these bounds.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_transformed_bounds(&mut self, id: NodeId, bounds: Rect) {
        self.validate(id);
        self.transformed_bounds[id.idx as usize] = bounds;
        self.mark_dirty_at(id.idx);
    }

    // -- Property getters --

    /// Returns the node's kind and geometry.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        self.validate(id);
        &self.kind[id.idx as usize]
    }

    /// Returns the node's local-to-parent transform.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn transform(&self, id: NodeId) -> Affine {
        self.validate(id);
        self.transform[id.idx as usize]
    }

    /// Returns the node's opacity.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn opacity(&self, id: NodeId) -> f32 {
        self.validate(id);
        self.opacity[id.idx as usize]
    }

    /// Returns the node's blend mode.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn blend_mode(&self, id: NodeId) -> Option<BlendMode> {
        self.validate(id);
        self.blend_mode[id.idx as usize]
    }

    /// Returns the node's effect reference.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn effect(&self, id: NodeId) -> Option<EffectRef> {
        self.validate(id);
        self.effect[id.idx as usize]
    }

    /// Returns the node's clip, if any.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn clip(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        let c = self.clip[id.idx as usize];
        (c != INVALID).then(|| self.make_id(c))
    }

    /// Returns whether the node is visible.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn visible(&self, id: NodeId) -> bool {
        self.validate(id);
        self.visible[id.idx as usize]
    }

    /// Returns the node's complete bounds in local coordinates.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn content_bounds(&self, id: NodeId) -> Rect {
        self.validate(id);
        self.content_bounds[id.idx as usize]
    }

    /// Returns the node's complete bounds in its parent's coordinate space.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn transformed_bounds(&self, id: NodeId) -> Rect {
        self.validate(id);
        self.transformed_bounds[id.idx as usize]
    }

    // -- Dirty flags --

    /// Marks the node dirty (its pixels must be repainted) and propagates a
    /// `child_dirty` bit to its ancestors.
    ///
    /// Property setters call this automatically; callers only need it for
    /// out-of-band content changes (e.g. new pixels in an image).
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn mark_dirty(&mut self, id: NodeId) {
        self.validate(id);
        self.mark_dirty_at(id.idx);
    }

    /// Returns the node's dirty flag.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn dirty_flag(&self, id: NodeId) -> DirtyFlag {
        self.validate(id);
        self.dirty[id.idx as usize]
    }

    /// Returns whether any descendant of the node is dirty.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn is_child_dirty(&self, id: NodeId) -> bool {
        self.validate(id);
        self.child_dirty[id.idx as usize]
    }

    /// Returns whether the node and its entire subtree are clean.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn is_clean(&self, id: NodeId) -> bool {
        self.validate(id);
        self.is_clean_at(id.idx)
    }

    /// Clears the dirty flags of the node and its entire subtree, typically
    /// after the renderer has painted it.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn clear_dirty_tree(&mut self, id: NodeId) {
        self.validate(id);
        self.clear_dirty_tree_at(id.idx);
    }

    pub(crate) fn mark_dirty_at(&mut self, idx: u32) {
        self.dirty[idx as usize] = DirtyFlag::Dirty;
        let mut p = self.parent[idx as usize];
        while p != INVALID && !self.child_dirty[p as usize] {
            self.child_dirty[p as usize] = true;
            p = self.parent[p as usize];
        }
    }

    pub(crate) fn clear_dirty_tree_at(&mut self, idx: u32) {
        let i = idx as usize;
        self.dirty[i] = DirtyFlag::Clean;
        if self.child_dirty[i] {
            self.child_dirty[i] = false;
            let mut child = self.first_child[i];
            while child != INVALID {
                self.clear_dirty_tree_at(child);
                child = self.next_sibling[child as usize];
            }
        }
    }

    pub(crate) fn is_clean_at(&self, idx: u32) -> bool {
        self.dirty[idx as usize] == DirtyFlag::Clean && !self.child_dirty[idx as usize]
    }

    // -- Handle plumbing --

    /// Panics if the handle does not refer to a live node.
    pub(crate) fn validate(&self, id: NodeId) {
        assert!(self.is_alive(id), "stale node handle: {id:?}");
    }

    pub(crate) fn make_id(&self, idx: u32) -> NodeId {
        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    fn rect_node(store: &mut NodeStore) -> NodeId {
        store.create_node(NodeKind::Rectangle {
            bounds: Rect::new(0.0, 0.0, 100.0, 100.0),
            corner_radius: 0.0,
        })
    }

    #[test]
    fn create_and_defaults() {
        let mut store = NodeStore::new();
        let n = rect_node(&mut store);
        assert!(store.is_alive(n));
        assert_eq!(store.transform(n), Affine::IDENTITY);
        assert_eq!(store.opacity(n), 1.0);
        assert_eq!(store.blend_mode(n), None);
        assert_eq!(store.effect(n), None);
        assert_eq!(store.clip(n), None);
        assert!(store.visible(n));
        assert_eq!(store.dirty_flag(n), DirtyFlag::Dirty);
        assert_eq!(store.node_count(), 1);
    }

    #[test]
    fn destroyed_handle_is_stale() {
        let mut store = NodeStore::new();
        let n = rect_node(&mut store);
        store.destroy_node(n);
        assert!(!store.is_alive(n));
        assert_eq!(store.node_count(), 0);
    }

    #[test]
    #[should_panic(expected = "stale node handle")]
    fn stale_handle_panics() {
        let mut store = NodeStore::new();
        let n = rect_node(&mut store);
        store.destroy_node(n);
        let _ = store.transform(n);
    }

    #[test]
    fn slot_reuse_bumps_generation() {
        let mut store = NodeStore::new();
        let a = rect_node(&mut store);
        store.destroy_node(a);
        let b = rect_node(&mut store);
        assert_eq!(a.index(), b.index());
        assert_ne!(a.generation(), b.generation());
        assert!(!store.is_alive(a));
        assert!(store.is_alive(b));
    }

    #[test]
    fn children_iterate_in_paint_order() {
        let mut store = NodeStore::new();
        let g = store.create_node(NodeKind::Group { opaque_insets: None });
        let a = rect_node(&mut store);
        let b = rect_node(&mut store);
        let c = rect_node(&mut store);
        store.add_child(g, a);
        store.add_child(g, c);
        store.insert_before(b, c);
        let kids: alloc::vec::Vec<NodeId> = store.children(g).collect();
        assert_eq!(kids, alloc::vec![a, b, c]);
        assert_eq!(store.parent(b), Some(g));
    }

    #[test]
    #[should_panic(expected = "only groups can have children")]
    fn leaves_cannot_have_children() {
        let mut store = NodeStore::new();
        let r = rect_node(&mut store);
        let c = rect_node(&mut store);
        store.add_child(r, c);
    }

    #[test]
    fn destroying_a_group_destroys_the_subtree() {
        let mut store = NodeStore::new();
        let g = store.create_node(NodeKind::Group { opaque_insets: None });
        let inner = store.create_node(NodeKind::Group { opaque_insets: None });
        let leaf = rect_node(&mut store);
        store.add_child(g, inner);
        store.add_child(inner, leaf);
        store.destroy_node(g);
        assert!(!store.is_alive(g));
        assert!(!store.is_alive(inner));
        assert!(!store.is_alive(leaf));
        assert_eq!(store.node_count(), 0);
    }

    #[test]
    fn dirty_propagates_to_ancestors() {
        let mut store = NodeStore::new();
        let root = store.create_node(NodeKind::Group { opaque_insets: None });
        let mid = store.create_node(NodeKind::Group { opaque_insets: None });
        let leaf = rect_node(&mut store);
        store.add_child(root, mid);
        store.add_child(mid, leaf);
        store.clear_dirty_tree(root);
        assert!(store.is_clean(root));

        store.set_opacity(leaf, 0.5);
        assert_eq!(store.dirty_flag(leaf), DirtyFlag::Dirty);
        assert!(store.is_child_dirty(mid));
        assert!(store.is_child_dirty(root));
        assert_eq!(store.dirty_flag(root), DirtyFlag::Clean);

        store.clear_dirty_tree(root);
        assert!(store.is_clean(root));
        assert!(store.is_clean(leaf));
    }

    #[test]
    fn unchanged_property_writes_stay_clean() {
        let mut store = NodeStore::new();
        let n = rect_node(&mut store);
        store.clear_dirty_tree(n);
        store.set_opacity(n, 1.0);
        store.set_visible(n, true);
        store.set_blend_mode(n, None);
        assert!(store.is_clean(n));
    }

    #[test]
    fn clip_links_are_severed_on_destroy() {
        let mut store = NodeStore::new();
        let n = rect_node(&mut store);
        let mask = store.create_node(NodeKind::Circle {
            center: Point::new(50.0, 50.0),
            radius: 40.0,
        });
        store.set_clip(n, Some(mask));
        assert_eq!(store.clip(n), Some(mask));
        store.destroy_node(mask);
        assert_eq!(store.clip(n), None);
        assert!(store.is_alive(n));
    }

    #[test]
    #[should_panic(expected = "already in use as a clip")]
    fn a_clip_masks_only_one_node() {
        let mut store = NodeStore::new();
        let a = rect_node(&mut store);
        let b = rect_node(&mut store);
        let mask = rect_node(&mut store);
        store.set_clip(a, Some(mask));
        store.set_clip(b, Some(mask));
    }

    #[test]
    #[should_panic(expected = "clip chain forms a cycle")]
    fn mutual_clips_are_rejected() {
        let mut store = NodeStore::new();
        let a = rect_node(&mut store);
        let b = rect_node(&mut store);
        store.set_clip(a, Some(b));
        store.set_clip(b, Some(a));
    }

    #[test]
    #[should_panic(expected = "clip chain forms a cycle")]
    fn longer_clip_cycles_are_rejected() {
        let mut store = NodeStore::new();
        let a = rect_node(&mut store);
        let b = rect_node(&mut store);
        let c = rect_node(&mut store);
        store.set_clip(a, Some(b));
        store.set_clip(b, Some(c));
        store.set_clip(c, Some(a));
    }
}
