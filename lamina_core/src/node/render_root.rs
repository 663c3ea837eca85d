// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render-root selection.
//!
//! For each dirty region the renderer wants the *shallowest* node whose
//! subtree, repainted in place over the existing framebuffer, reproduces
//! correct pixels for the whole region — everything outside that subtree is
//! left untouched. [`NodeStore::get_render_root`] finds it in two phases:
//!
//! 1. **Occluder search**: descend front-to-back looking for a node whose
//!    opaque region fully contains the dirty rect in device space.
//!    Everything painted behind such a node within the rect is provably
//!    overdrawn. The search only ever follows the topmost child that
//!    intersects the rect; descending past an intersecting-but-not-covering
//!    child would let the repaint erase that child's pixels.
//! 2. **Dirty narrowing**: when no occluder exists, walk down through groups
//!    where exactly one child both intersects the rect and carries dirt,
//!    provided no sibling overlaps that child's contribution. The repaint
//!    then touches only that child's subtree.
//!
//! When the chosen occluder's subtree (and every group passed through) is
//! clean, the region's dirt is entirely hidden behind it and nothing needs
//! painting at all.

use kurbo::{Affine, Rect};

use alloc::vec::Vec;

use crate::geometry::{mapped_rect_contains, rect_intersection, rects_intersect};
use crate::path::NodePath;
use crate::region::MAX_DIRTY_REGIONS;

use super::cull::CULL_INSIDE;
use super::id::{INVALID, NodeId};
use super::kind::{NodeKind, passes_src_over};
use super::store::{DirtyFlag, NodeStore};

/// Outcome of the occluder search phase of [`NodeStore::get_render_root`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RenderRootResult {
    /// No node's opaque region covers the dirty rect; painting starts at
    /// the tree root (possibly narrowed to a single dirty subtree).
    NoRenderRoot,
    /// An occluding render root was found and its subtree needs painting.
    HasRenderRoot,
    /// An occluding render root was found and everything it would repaint
    /// is already clean — the region's dirt is hidden behind it.
    HasRenderRootAndIsClean,
}

impl NodeStore {
    /// Computes the render root for `dirty_region` and fills `path` with the
    /// chain from `root` down to it.
    ///
    /// `culling_index` selects which slot of the per-node culling bits to
    /// consult (`-1` to ignore them and classify geometrically). `view_tx`
    /// maps the root's parent space to the view and `projection` maps the
    /// view to device space, exactly as passed to
    /// [`mark_cull_regions`](Self::mark_cull_regions).
    ///
    /// On [`HasRenderRoot`](RenderRootResult::HasRenderRoot) the path runs
    /// from `root` to the occluder. On
    /// [`HasRenderRootAndIsClean`](RenderRootResult::HasRenderRootAndIsClean)
    /// the path is left empty: nothing needs painting. On
    /// [`NoRenderRoot`](RenderRootResult::NoRenderRoot) the path starts at
    /// `root`, narrowed to a sole dirty subtree where possible.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or `culling_index` is outside
    /// `-1..15`.
    pub fn get_render_root(
        &mut self,
        path: &mut NodePath,
        root: NodeId,
        dirty_region: Rect,
        culling_index: i32,
        view_tx: Affine,
        projection: Affine,
    ) -> RenderRootResult {
        self.validate(root);
        assert!(
            (-1..MAX_DIRTY_REGIONS as i32).contains(&culling_index),
            "culling index out of range"
        );
        path.clear();
        let result = self.occluder_search(
            root.idx,
            path,
            &dirty_region,
            culling_index,
            true,
            view_tx,
            projection,
        );
        match result {
            RenderRootResult::NoRenderRoot => {
                path.clear();
                self.narrow_to_dirty(
                    root.idx,
                    path,
                    &dirty_region,
                    culling_index,
                    true,
                    view_tx,
                    projection,
                );
            }
            RenderRootResult::HasRenderRootAndIsClean => path.clear(),
            RenderRootResult::HasRenderRoot => {}
        }
        result
    }

    /// Looks for the deepest node whose opaque region covers `d`, appending
    /// the chain to `path`. Leaves `path` unchanged when returning
    /// [`RenderRootResult::NoRenderRoot`].
    fn occluder_search(
        &mut self,
        idx: u32,
        path: &mut NodePath,
        d: &Rect,
        ci: i32,
        bits_valid: bool,
        tx: Affine,
        projection: Affine,
    ) -> RenderRootResult {
        let i = idx as usize;
        if !self.visible[i] {
            return RenderRootResult::NoRenderRoot;
        }
        if ci >= 0 && bits_valid && self.cull_class_at(idx, ci) == 0 {
            return RenderRootResult::NoRenderRoot;
        }
        path.push(self.make_id(idx));

        if matches!(self.kind[i], NodeKind::Group { .. }) && !self.composites_atomically(idx) {
            // When this group classified INSIDE during culling, its children
            // were never marked; fall back to geometric tests below it.
            let child_bits_valid =
                bits_valid && (ci < 0 || self.cull_class_at(idx, ci) != CULL_INSIDE);
            let child_tx = tx * self.transform[i];
            if let Some(front) =
                self.topmost_intersecting_child(idx, d, ci, child_bits_valid, child_tx, projection)
            {
                let deeper = self.occluder_search(
                    front,
                    path,
                    d,
                    ci,
                    child_bits_valid,
                    child_tx,
                    projection,
                );
                match deeper {
                    RenderRootResult::NoRenderRoot => {}
                    RenderRootResult::HasRenderRoot => return RenderRootResult::HasRenderRoot,
                    RenderRootResult::HasRenderRootAndIsClean => {
                        // Dirt on this group itself still forces a repaint
                        // from the occluder.
                        return if self.dirty[i] == DirtyFlag::Clean {
                            RenderRootResult::HasRenderRootAndIsClean
                        } else {
                            RenderRootResult::HasRenderRoot
                        };
                    }
                }
            }
        }

        // No deeper occluder; try this node's own opaque region.
        self.refresh_opaque_region(idx);
        if let Some(region) = self.opaque_region[i] {
            if mapped_rect_contains(projection * tx, &region, d) {
                return if self.is_clean_at(idx) {
                    RenderRootResult::HasRenderRootAndIsClean
                } else {
                    RenderRootResult::HasRenderRoot
                };
            }
        }
        path.pop();
        RenderRootResult::NoRenderRoot
    }

    /// Walks front-to-back and returns the topmost visible child whose
    /// bounds intersect `d`, using culling bits when they are valid for
    /// this level.
    fn topmost_intersecting_child(
        &self,
        idx: u32,
        d: &Rect,
        ci: i32,
        bits_valid: bool,
        child_tx: Affine,
        projection: Affine,
    ) -> Option<u32> {
        let mut child = self.last_child(idx);
        while child != INVALID {
            let c = child as usize;
            if self.visible[c] {
                let intersects = if ci >= 0 && bits_valid {
                    self.cull_class_at(child, ci) != 0
                } else {
                    let device =
                        (projection * child_tx).transform_rect_bbox(self.transformed_bounds[c]);
                    rects_intersect(&device, d)
                };
                if intersects {
                    return Some(child);
                }
            }
            child = self.prev_sibling[c];
        }
        None
    }

    /// Pushes `idx` and descends while exactly one child needs repainting
    /// for `d` and no sibling overlaps its contribution.
    fn narrow_to_dirty(
        &mut self,
        root_idx: u32,
        path: &mut NodePath,
        d: &Rect,
        ci: i32,
        mut bits_valid: bool,
        mut tx: Affine,
        projection: Affine,
    ) {
        let mut idx = root_idx;
        loop {
            path.push(self.make_id(idx));
            let i = idx as usize;
            if !matches!(self.kind[i], NodeKind::Group { .. })
                || self.composites_atomically(idx)
                || self.dirty[i] != DirtyFlag::Clean
            {
                return;
            }
            let child_bits_valid =
                bits_valid && (ci < 0 || self.cull_class_at(idx, ci) != CULL_INSIDE);
            let child_tx = tx * self.transform[i];

            // Collect visible children intersecting the region; bail out of
            // narrowing as soon as a second dirty one appears.
            let mut sole_dirty: Option<usize> = None;
            let mut kids: Vec<(u32, Rect)> = Vec::new();
            let mut child = self.first_child[i];
            while child != INVALID {
                let c = child as usize;
                if self.visible[c] {
                    let device =
                        (projection * child_tx).transform_rect_bbox(self.transformed_bounds[c]);
                    let intersects = if ci >= 0 && child_bits_valid {
                        self.cull_class_at(child, ci) != 0
                    } else {
                        rects_intersect(&device, d)
                    };
                    if intersects {
                        if self.dirty[c] != DirtyFlag::Clean || self.child_dirty[c] {
                            if sole_dirty.is_some() {
                                return;
                            }
                            sole_dirty = Some(kids.len());
                        }
                        kids.push((child, device));
                    }
                }
                child = self.next_sibling[c];
            }
            let Some(di) = sole_dirty else { return };
            let Some(contribution) = rect_intersection(&kids[di].1, d) else {
                return;
            };
            for (j, (_, device)) in kids.iter().enumerate() {
                if j != di && rects_intersect(device, &contribution) {
                    return;
                }
            }
            tx = child_tx;
            bits_valid = child_bits_valid;
            idx = kids[di].0;
        }
    }

    /// A node composites atomically when its subtree is flattened through an
    /// effect, reduced opacity, or a non-source-over blend; the occluder
    /// search must not descend through it.
    fn composites_atomically(&self, idx: u32) -> bool {
        let i = idx as usize;
        self.effect[i].is_some() || self.opacity[i] < 1.0 || !passes_src_over(self.blend_mode[i])
    }

    fn cull_class_at(&self, idx: u32, ci: i32) -> u32 {
        (self.culling_bits[idx as usize] >> (2 * ci)) & 0b11
    }
}
