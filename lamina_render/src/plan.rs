// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Repaint plan: one render-root path per dirty region for one frame.

use alloc::vec::Vec;

use kurbo::{Affine, Rect};

use lamina_core::node::{NodeId, NodeStore, RenderRootResult};
use lamina_core::path::NodePath;
use lamina_core::region::DirtyRegionContainer;
use lamina_core::trace::{CullPassEvent, RegionsDerivedEvent, RenderRootEvent, Tracer};

/// The repaint instructions for a single dirty region.
#[derive(Clone, Debug)]
pub struct RegionPlan {
    /// The dirty region in device space.
    pub region: Rect,
    /// Outcome of the occluder search for this region.
    pub result: RenderRootResult,
    /// Chain from the tree root to the node to start painting at. Empty
    /// when the region's dirt is fully occluded and needs no painting.
    pub path: NodePath,
}

/// Everything the renderer needs to repaint one frame incrementally.
#[derive(Clone, Debug)]
pub struct RepaintPlan {
    /// The frame's derived dirty-region set.
    pub regions: DirtyRegionContainer,
    /// One entry per region, in slot order.
    pub entries: Vec<RegionPlan>,
}

impl RepaintPlan {
    /// Creates an empty plan, ready to be filled by [`rebuild`](Self::rebuild).
    #[must_use]
    pub fn new() -> Self {
        Self {
            regions: DirtyRegionContainer::default(),
            entries: Vec::new(),
        }
    }

    /// Returns whether no region needs any painting.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.entries.iter().all(|e| e.path.is_empty())
    }

    /// Runs the per-frame repaint pipeline into this plan:
    /// derive dirty regions → cull → select a render root per region.
    ///
    /// `base` supplies the region-set capacity; `candidates` are the frame's
    /// raw dirty rectangles in device space. `view_tx` maps the root's parent
    /// space to the view and `projection` maps the view to device space.
    ///
    /// Entries from the previous frame are reused in place, so keeping one
    /// plan alive across frames avoids reallocating the per-region paths.
    ///
    /// # Panics
    ///
    /// Panics if `root` is stale.
    pub fn rebuild(
        &mut self,
        store: &mut NodeStore,
        root: NodeId,
        base: &DirtyRegionContainer,
        candidates: &[Rect],
        view_tx: Affine,
        projection: Affine,
        frame_index: u64,
        tracer: &mut Tracer<'_>,
    ) {
        self.regions = base.derive_with_new_regions(candidates);
        tracer.regions_derived(&RegionsDerivedEvent {
            frame_index,
            candidate_count: candidates.len(),
            region_count: self.regions.len(),
        });

        store.mark_cull_regions(root, &self.regions, view_tx, projection);
        tracer.cull_pass(&CullPassEvent {
            frame_index,
            region_count: self.regions.len(),
        });

        let Self { regions, entries } = self;
        entries.truncate(regions.len());
        for (slot, region) in regions.iter().enumerate() {
            let culling_index =
                i32::try_from(slot).expect("region count is bounded by MAX_DIRTY_REGIONS");
            if slot == entries.len() {
                entries.push(RegionPlan {
                    region: *region,
                    result: RenderRootResult::NoRenderRoot,
                    path: NodePath::new(),
                });
            }
            let entry = &mut entries[slot];
            entry.region = *region;
            entry.path.clear();
            entry.result = store.get_render_root(
                &mut entry.path,
                root,
                *region,
                culling_index,
                view_tx,
                projection,
            );
            tracer.render_root(&RenderRootEvent {
                frame_index,
                region_index: slot,
                region: *region,
                result: entry.result,
                path_len: entry.path.len(),
            });
        }
    }
}

impl Default for RepaintPlan {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs the per-frame repaint pipeline into a fresh [`RepaintPlan`].
///
/// Convenience over [`RepaintPlan::rebuild`] for callers that do not keep a
/// plan alive across frames.
///
/// # Panics
///
/// Panics if `root` is stale.
pub fn plan_repaint(
    store: &mut NodeStore,
    root: NodeId,
    base: &DirtyRegionContainer,
    candidates: &[Rect],
    view_tx: Affine,
    projection: Affine,
    frame_index: u64,
    tracer: &mut Tracer<'_>,
) -> RepaintPlan {
    let mut plan = RepaintPlan::new();
    plan.rebuild(
        store, root, base, candidates, view_tx, projection, frame_index, tracer,
    );
    plan
}
