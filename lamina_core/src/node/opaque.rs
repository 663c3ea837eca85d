// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Opaque-region caching.
//!
//! A node's *opaque region* is an axis-aligned rectangle, expressed in the
//! node's **parent** coordinate space, that is guaranteed fully covered by
//! opaque pixels whenever the node paints. The render-root search uses these
//! regions to prove that everything behind a node within a dirty rectangle
//! is overdrawn and need not be repainted.
//!
//! Regions are cached per node and recomputed lazily on query. The property
//! setters in [`store`](super::store) invalidate the cache precisely: only
//! mutations that can actually change the region mark it invalid, so stable
//! frames reuse the cached rectangle without recomputation.

use core::f64::consts::FRAC_1_SQRT_2;

use kurbo::Rect;

use crate::geometry::{is_axis_aligned, rect_intersection, rect_is_empty};

use super::id::{INVALID, NodeId};
use super::kind::{NodeKind, passes_src_over};
use super::store::NodeStore;

impl NodeStore {
    /// Returns whether the node's kind can ever report an opaque region.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn supports_opaque_regions(&self, id: NodeId) -> bool {
        self.validate(id);
        self.kind[id.idx as usize].supports_opaque_regions()
    }

    /// Returns whether the node currently has an opaque region.
    ///
    /// True when the node composites source-over at full opacity, carries no
    /// opacity-reducing effect, its geometry yields a non-empty coverage
    /// rectangle, and its clip (if any) itself has an opaque region.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn has_opaque_region(&self, id: NodeId) -> bool {
        self.validate(id);
        self.has_opaque_region_at(id.idx)
    }

    pub(crate) fn has_opaque_region_at(&self, idx: u32) -> bool {
        let i = idx as usize;
        let clip = self.clip[i];
        if clip != INVALID
            && !(self.kind[clip as usize].supports_opaque_regions()
                && self.has_opaque_region_at(clip))
        {
            return false;
        }
        if let Some(e) = &self.effect[i] {
            if e.reduces_opaque_pixels {
                return false;
            }
        }
        self.opacity[i] == 1.0
            && passes_src_over(self.blend_mode[i])
            && self.kind_opaque_candidate(idx).is_some()
    }

    /// Returns the node's opaque region in its parent's coordinate space,
    /// recomputing the cached value only if it has been invalidated.
    ///
    /// The returned reference points directly at the cached slot: repeated
    /// queries without an intervening invalidation return the identical
    /// rectangle without recomputation.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn opaque_region(&mut self, id: NodeId) -> Option<&Rect> {
        self.validate(id);
        self.refresh_opaque_region(id.idx);
        self.opaque_region[id.idx as usize].as_ref()
    }

    /// Marks the node's cached opaque region invalid, forcing recomputation
    /// on the next query. If this node masks another node as its clip, the
    /// clipped node is invalidated too.
    ///
    /// Property setters invalidate automatically; callers only need this for
    /// out-of-band changes (e.g. an effect whose parameters changed in the
    /// external pipeline).
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn invalidate_opaque_region(&mut self, id: NodeId) {
        self.validate(id);
        self.invalidate_opaque_region_at(id.idx);
    }

    pub(crate) fn invalidate_opaque_region_at(&mut self, idx: u32) {
        let i = idx as usize;
        if self.opaque_region_invalid[i] {
            return;
        }
        self.opaque_region_invalid[i] = true;
        let target = self.clip_target[i];
        if target != INVALID {
            self.invalidate_opaque_region_at(target);
        }
    }

    /// Returns whether the node's cached opaque region is currently
    /// invalid (instrumentation for tests and diagnostics).
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn is_opaque_region_invalid(&self, id: NodeId) -> bool {
        self.validate(id);
        self.opaque_region_invalid[id.idx as usize]
    }

    /// Returns the cached opaque region without refreshing it
    /// (instrumentation for diagnostics; may be stale).
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn cached_opaque_region(&self, id: NodeId) -> Option<Rect> {
        self.validate(id);
        self.opaque_region[id.idx as usize]
    }

    /// Returns how many opaque-region recomputations this store has
    /// performed (instrumentation for tests and diagnostics).
    #[must_use]
    pub fn opaque_recompute_count(&self) -> u64 {
        self.opaque_recomputes
    }

    pub(crate) fn refresh_opaque_region(&mut self, idx: u32) {
        let i = idx as usize;
        if !self.opaque_region_invalid[i] {
            return;
        }
        self.opaque_region_invalid[i] = false;
        self.opaque_region[i] = self.compute_opaque_region(idx);
        self.opaque_recomputes += 1;
    }

    fn compute_opaque_region(&mut self, idx: u32) -> Option<Rect> {
        if !self.has_opaque_region_at(idx) {
            return None;
        }
        let mut local = self.kind_opaque_candidate(idx)?;
        let clip = self.clip[idx as usize];
        if clip != INVALID {
            self.refresh_opaque_region(clip);
            // The clip's parent space is this node's local space, so its
            // cached region intersects directly.
            let clip_region = self.opaque_region[clip as usize]?;
            local = rect_intersection(&local, &clip_region)?;
        }
        let tx = self.transform[idx as usize];
        if !is_axis_aligned(&tx) {
            // A rotated or sheared node cannot promise an axis-aligned
            // cover in parent space.
            return None;
        }
        let mapped = tx.transform_rect_bbox(local);
        if rect_is_empty(&mapped) { None } else { Some(mapped) }
    }

    /// The kind-specific coverage rectangle in local coordinates, before
    /// clipping and the node transform.
    pub(crate) fn kind_opaque_candidate(&self, idx: u32) -> Option<Rect> {
        let r = match self.kind[idx as usize] {
            NodeKind::Group { opaque_insets } => opaque_insets?,
            NodeKind::Rectangle {
                bounds,
                corner_radius,
            } => {
                // Rounded corners carve into the fill; insetting by half the
                // arc on each axis stays inside the painted area.
                let inset = corner_radius / 2.0;
                Rect::new(
                    bounds.x0 + inset,
                    bounds.y0 + inset,
                    bounds.x1 - inset,
                    bounds.y1 - inset,
                )
            }
            NodeKind::Circle { center, radius } => {
                // Largest inscribed axis-aligned square.
                let h = radius * FRAC_1_SQRT_2;
                Rect::new(center.x - h, center.y - h, center.x + h, center.y + h)
            }
            NodeKind::Ellipse {
                center,
                radius_x,
                radius_y,
            } => {
                let hx = radius_x * FRAC_1_SQRT_2;
                let hy = radius_y * FRAC_1_SQRT_2;
                Rect::new(center.x - hx, center.y - hy, center.x + hx, center.y + hy)
            }
            NodeKind::Image {
                viewport,
                has_content,
            } => {
                if !has_content || viewport.area() < 1.0 {
                    return None;
                }
                viewport
            }
            NodeKind::Path => return None,
        };
        if rect_is_empty(&r) { None } else { Some(r) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::id::EffectId;
    use crate::node::kind::{BlendMode, EffectRef};
    use kurbo::{Affine, Point};

    fn rect_node(store: &mut NodeStore, x0: f64, y0: f64, x1: f64, y1: f64) -> NodeId {
        store.create_node(NodeKind::Rectangle {
            bounds: Rect::new(x0, y0, x1, y1),
            corner_radius: 0.0,
        })
    }

    fn blur(reduces: bool) -> EffectRef {
        EffectRef {
            id: EffectId(7),
            reduces_opaque_pixels: reduces,
        }
    }

    #[test]
    fn rectangle_reports_its_bounds() {
        let mut store = NodeStore::new();
        let n = rect_node(&mut store, 0.0, 0.0, 100.0, 50.0);
        assert!(store.has_opaque_region(n));
        assert_eq!(
            store.opaque_region(n),
            Some(&Rect::new(0.0, 0.0, 100.0, 50.0))
        );
    }

    #[test]
    fn rounded_rectangle_is_inset_by_half_the_arc() {
        let mut store = NodeStore::new();
        let n = store.create_node(NodeKind::Rectangle {
            bounds: Rect::new(0.0, 0.0, 100.0, 100.0),
            corner_radius: 20.0,
        });
        assert_eq!(
            store.opaque_region(n),
            Some(&Rect::new(10.0, 10.0, 90.0, 90.0))
        );
    }

    #[test]
    fn circle_reports_inscribed_square() {
        let mut store = NodeStore::new();
        let n = store.create_node(NodeKind::Circle {
            center: Point::new(0.0, 0.0),
            radius: 10.0,
        });
        let r = store.opaque_region(n).copied().unwrap();
        let h = 10.0 * FRAC_1_SQRT_2;
        assert!((r.x0 - -h).abs() < 1e-12 && (r.x1 - h).abs() < 1e-12);
        assert!((r.y0 - -h).abs() < 1e-12 && (r.y1 - h).abs() < 1e-12);
    }

    #[test]
    fn image_requires_content_and_one_device_pixel() {
        let mut store = NodeStore::new();
        let n = store.create_node(NodeKind::Image {
            viewport: Rect::new(0.0, 0.0, 64.0, 64.0),
            has_content: false,
        });
        assert_eq!(store.opaque_region(n), None);
        store.set_geometry(
            n,
            NodeKind::Image {
                viewport: Rect::new(0.0, 0.0, 64.0, 64.0),
                has_content: true,
            },
        );
        assert_eq!(store.opaque_region(n), Some(&Rect::new(0.0, 0.0, 64.0, 64.0)));
        store.set_geometry(
            n,
            NodeKind::Image {
                viewport: Rect::new(0.0, 0.0, 0.9, 0.9),
                has_content: true,
            },
        );
        assert_eq!(store.opaque_region(n), None);
    }

    #[test]
    fn paths_never_have_opaque_regions() {
        let mut store = NodeStore::new();
        let n = store.create_node(NodeKind::Path);
        assert!(!store.supports_opaque_regions(n));
        assert!(!store.has_opaque_region(n));
        assert_eq!(store.opaque_region(n), None);
    }

    #[test]
    fn cache_is_reused_until_invalidated() {
        let mut store = NodeStore::new();
        let n = rect_node(&mut store, 0.0, 0.0, 100.0, 100.0);
        let _ = store.opaque_region(n);
        let computed = store.opaque_recompute_count();
        assert!(!store.is_opaque_region_invalid(n));
        let _ = store.opaque_region(n);
        let _ = store.opaque_region(n);
        assert_eq!(store.opaque_recompute_count(), computed);

        store.set_transform(n, Affine::translate((5.0, 0.0)));
        assert!(store.is_opaque_region_invalid(n));
        assert_eq!(
            store.opaque_region(n),
            Some(&Rect::new(5.0, 0.0, 105.0, 100.0))
        );
        assert_eq!(store.opaque_recompute_count(), computed + 1);
    }

    #[test]
    fn opacity_invalidates_only_across_boundaries() {
        let mut store = NodeStore::new();
        let n = rect_node(&mut store, 0.0, 0.0, 10.0, 10.0);
        let _ = store.opaque_region(n);

        // Leaving full opacity invalidates and removes the region.
        store.set_opacity(n, 0.5);
        assert!(store.is_opaque_region_invalid(n));
        assert_eq!(store.opaque_region(n), None);

        // Intermediate changes keep the cache valid.
        store.set_opacity(n, 0.6);
        assert!(!store.is_opaque_region_invalid(n));

        // Returning to full opacity invalidates and restores the region.
        store.set_opacity(n, 1.0);
        assert!(store.is_opaque_region_invalid(n));
        assert!(store.opaque_region(n).is_some());
    }

    #[test]
    fn blend_mode_invalidates_only_source_over_transitions() {
        let mut store = NodeStore::new();
        let n = rect_node(&mut store, 0.0, 0.0, 10.0, 10.0);
        let _ = store.opaque_region(n);

        store.set_blend_mode(n, Some(BlendMode::Multiply));
        assert!(store.is_opaque_region_invalid(n));
        assert_eq!(store.opaque_region(n), None);

        // Multiply -> Screen cannot change coverage.
        store.set_blend_mode(n, Some(BlendMode::Screen));
        assert!(!store.is_opaque_region_invalid(n));

        store.set_blend_mode(n, Some(BlendMode::SourceOver));
        assert!(store.opaque_region(n).is_some());
    }

    #[test]
    fn effect_reassignment_always_invalidates() {
        let mut store = NodeStore::new();
        let n = rect_node(&mut store, 0.0, 0.0, 10.0, 10.0);
        let _ = store.opaque_region(n);

        store.set_effect(n, Some(blur(true)));
        assert_eq!(store.opaque_region(n), None);

        // A non-reducing effect keeps the region.
        store.set_effect(n, Some(blur(false)));
        assert!(store.is_opaque_region_invalid(n));
        assert!(store.opaque_region(n).is_some());

        store.set_effect(n, None);
        assert!(store.is_opaque_region_invalid(n));
        let before = store.opaque_recompute_count();
        let _ = store.opaque_region(n);
        let _ = store.opaque_region(n);
        assert_eq!(store.opaque_recompute_count(), before + 1);
    }

    #[test]
    fn effects_do_not_defeat_cache_reuse() {
        let mut store = NodeStore::new();
        let n = rect_node(&mut store, 0.0, 0.0, 10.0, 10.0);
        store.set_effect(n, Some(blur(false)));
        let _ = store.opaque_region(n);
        let computed = store.opaque_recompute_count();

        // No mutation between queries: the cached rectangle is served.
        assert!(store.opaque_region(n).is_some());
        assert!(store.opaque_region(n).is_some());
        assert_eq!(store.opaque_recompute_count(), computed);

        // Out-of-band effect changes go through explicit invalidation.
        store.invalidate_opaque_region(n);
        let _ = store.opaque_region(n);
        assert_eq!(store.opaque_recompute_count(), computed + 1);
    }

    #[test]
    fn clip_intersects_the_region() {
        let mut store = NodeStore::new();
        let n = rect_node(&mut store, 0.0, 0.0, 100.0, 100.0);
        let mask = rect_node(&mut store, 25.0, 25.0, 150.0, 150.0);
        store.set_clip(n, Some(mask));
        assert_eq!(
            store.opaque_region(n),
            Some(&Rect::new(25.0, 25.0, 100.0, 100.0))
        );

        // A clip with no opaque region of its own removes the node's.
        store.set_opacity(mask, 0.5);
        assert!(store.is_opaque_region_invalid(n));
        assert_eq!(store.opaque_region(n), None);
    }

    #[test]
    fn invalidating_a_clip_propagates_to_the_clipped_node() {
        let mut store = NodeStore::new();
        let n = rect_node(&mut store, 0.0, 0.0, 100.0, 100.0);
        let mask = rect_node(&mut store, 10.0, 10.0, 90.0, 90.0);
        store.set_clip(n, Some(mask));
        let _ = store.opaque_region(n);
        assert!(!store.is_opaque_region_invalid(n));

        store.set_geometry(
            mask,
            NodeKind::Rectangle {
                bounds: Rect::new(20.0, 20.0, 80.0, 80.0),
                corner_radius: 0.0,
            },
        );
        assert!(store.is_opaque_region_invalid(n));
        assert_eq!(
            store.opaque_region(n),
            Some(&Rect::new(20.0, 20.0, 80.0, 80.0))
        );
    }

    #[test]
    fn rotated_nodes_report_no_region() {
        let mut store = NodeStore::new();
        let n = rect_node(&mut store, 0.0, 0.0, 100.0, 100.0);
        store.set_transform(n, Affine::rotate(0.3));
        assert_eq!(store.opaque_region(n), None);

        // Scale and translation are fine.
        store.set_transform(n, Affine::scale(2.0).then_translate((10.0, 10.0).into()));
        assert_eq!(
            store.opaque_region(n),
            Some(&Rect::new(10.0, 10.0, 210.0, 210.0))
        );
    }

    #[test]
    fn group_coverage_comes_from_declared_insets() {
        let mut store = NodeStore::new();
        let g = store.create_node(NodeKind::Group { opaque_insets: None });
        assert_eq!(store.opaque_region(g), None);
        store.set_geometry(
            g,
            NodeKind::Group {
                opaque_insets: Some(Rect::new(0.0, 0.0, 200.0, 200.0)),
            },
        );
        assert_eq!(
            store.opaque_region(g),
            Some(&Rect::new(0.0, 0.0, 200.0, 200.0))
        );
    }
}
