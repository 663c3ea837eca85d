// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-region culling.
//!
//! [`NodeStore::mark_cull_regions`] walks the tree once per frame and tags
//! every visited node with a two-bit classification per dirty region,
//! packed into a `u32` (region `r` occupies bits `2r` and `2r + 1`). The
//! bits are transient: they are only meaningful between the culling pass
//! and the render-root searches of the same frame.
//!
//! Classification is of the node's device-space bounds *against* each
//! region: `OUTSIDE` when they do not overlap, `INSIDE` when the bounds
//! fully contain the region, `INTERSECTS` otherwise. Group recursion
//! short-circuits when every region classifies the same way — an
//! all-`OUTSIDE` group's subtree cannot need painting (any dirty flags
//! below it are cleared), and an all-`INSIDE` group covers every region so
//! its children keep their default zero bits and are classified
//! geometrically if a later pass needs them.

use kurbo::Affine;

use crate::geometry::{rect_contains_rect, rects_intersect};
use crate::region::DirtyRegionContainer;

use super::id::{INVALID, NodeId};
use super::kind::NodeKind;
use super::store::{DirtyFlag, NodeStore};

/// Two-bit culling classification: no overlap with the region.
pub const CULL_OUTSIDE: u32 = 0b00;
/// Two-bit culling classification: partial overlap with the region.
pub const CULL_INTERSECTS: u32 = 0b01;
/// Two-bit culling classification: the node's bounds fully contain the
/// region.
pub const CULL_INSIDE: u32 = 0b10;

impl NodeStore {
    /// Classifies `root` and its subtree against every region in `regions`.
    ///
    /// `view_tx` maps the root's parent space to the view; `projection`
    /// maps the view to device space. Bounds are mapped conservatively
    /// (bounding box of the transformed corners).
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn mark_cull_regions(
        &mut self,
        root: NodeId,
        regions: &DirtyRegionContainer,
        view_tx: Affine,
        projection: Affine,
    ) {
        self.validate(root);
        self.mark_cull_regions_at(root.idx, regions, view_tx, projection);
    }

    /// Returns the node's two-bit classification for the given region slot.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the slot is out of range.
    #[must_use]
    pub fn culling_class(&self, id: NodeId, region_index: usize) -> u32 {
        self.validate(id);
        assert!(
            region_index < crate::region::MAX_DIRTY_REGIONS,
            "region index out of range"
        );
        (self.culling_bits[id.idx as usize] >> (2 * region_index)) & 0b11
    }

    /// Returns the node's packed culling bits for all region slots.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn culling_bits(&self, id: NodeId) -> u32 {
        self.validate(id);
        self.culling_bits[id.idx as usize]
    }

    fn mark_cull_regions_at(
        &mut self,
        idx: u32,
        regions: &DirtyRegionContainer,
        tx: Affine,
        projection: Affine,
    ) {
        let i = idx as usize;
        let device_bounds = (projection * tx).transform_rect_bbox(self.transformed_bounds[i]);

        let mut bits = 0_u32;
        let mut all_inside = !regions.is_empty();
        for (r, region) in regions.iter().enumerate() {
            let class = if !rects_intersect(&device_bounds, region) {
                CULL_OUTSIDE
            } else if rect_contains_rect(&device_bounds, region) {
                CULL_INSIDE
            } else {
                CULL_INTERSECTS
            };
            bits |= class << (2 * r);
            if class != CULL_INSIDE {
                all_inside = false;
            }
        }
        self.culling_bits[i] = bits;

        if bits == 0 {
            // Outside every dirty region: nothing below can need painting
            // this frame, so pending dirt is discarded.
            if self.dirty[i] != DirtyFlag::Clean || self.child_dirty[i] {
                self.clear_dirty_tree_at(idx);
            }
            return;
        }

        if matches!(self.kind[i], NodeKind::Group { .. }) {
            if all_inside {
                // The group covers every region whole; per-child marks add
                // nothing. Children keep their default zero bits.
                return;
            }
            let child_tx = tx * self.transform[i];
            let mut child = self.first_child[i];
            while child != INVALID {
                self.mark_cull_regions_at(child, regions, child_tx, projection);
                child = self.next_sibling[child as usize];
            }
        }
    }
}
