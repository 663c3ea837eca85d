// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounded dirty-region sets.
//!
//! A [`DirtyRegionContainer`] holds the frame's dirty rectangles in device
//! space. Capacity is explicit and small: every region costs a per-node
//! classification during culling, and the two-bit culling encoding packs at
//! most [`MAX_DIRTY_REGIONS`] slots into a `u32`. When a frame produces more
//! candidate rectangles than the container can hold, incoming rectangles are
//! merged into the existing slot whose union grows the least, so coverage is
//! never lost — it only becomes coarser.

use alloc::vec::Vec;

use kurbo::Rect;

use crate::geometry::{rect_contains_rect, rect_is_empty};

/// Hard upper bound on dirty regions per frame, dictated by the two-bit
/// per-region culling encoding in a `u32`.
pub const MAX_DIRTY_REGIONS: usize = 15;

/// Default container capacity. Past a handful of regions the per-node
/// classification cost outweighs the pixels saved.
pub const DEFAULT_DIRTY_REGION_CAPACITY: usize = 6;

/// An ordered, bounded set of non-empty dirty rectangles.
#[derive(Clone, Debug, PartialEq)]
pub struct DirtyRegionContainer {
    regions: Vec<Rect>,
    capacity: usize,
}

impl Default for DirtyRegionContainer {
    fn default() -> Self {
        Self::new(DEFAULT_DIRTY_REGION_CAPACITY)
    }
}

impl DirtyRegionContainer {
    /// Creates an empty container with the given capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or exceeds [`MAX_DIRTY_REGIONS`].
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(
            (1..=MAX_DIRTY_REGIONS).contains(&capacity),
            "capacity must be in 1..=15"
        );
        Self {
            regions: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Returns the number of active regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Returns whether the container holds no regions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Returns the configured capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the region in the given slot.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[must_use]
    pub fn region(&self, index: usize) -> Rect {
        self.regions[index]
    }

    /// Returns an iterator over the active regions, in slot order.
    pub fn iter(&self) -> core::slice::Iter<'_, Rect> {
        self.regions.iter()
    }

    /// Builds a new container with this container's capacity from the given
    /// candidate rectangles.
    ///
    /// Empty candidates are dropped. Candidates beyond the capacity are
    /// merged rather than truncated.
    #[must_use]
    pub fn derive_with_new_regions(&self, candidates: &[Rect]) -> Self {
        let mut derived = Self::new(self.capacity);
        for candidate in candidates {
            derived.add_dirty_region(*candidate);
        }
        derived
    }

    /// Adds a dirty rectangle.
    ///
    /// Empty rectangles are ignored. A rectangle already covered by an
    /// active region is dropped; active regions covered by the new rectangle
    /// are replaced by it. At capacity, the rectangle is merged into the
    /// slot whose union grows the least.
    pub fn add_dirty_region(&mut self, rect: Rect) {
        if rect_is_empty(&rect) {
            return;
        }
        let mut i = 0;
        while i < self.regions.len() {
            if rect_contains_rect(&self.regions[i], &rect) {
                return;
            }
            if rect_contains_rect(&rect, &self.regions[i]) {
                self.regions.swap_remove(i);
            } else {
                i += 1;
            }
        }
        if self.regions.len() < self.capacity {
            self.regions.push(rect);
            return;
        }
        let mut best = 0;
        let mut best_growth = f64::INFINITY;
        for (i, r) in self.regions.iter().enumerate() {
            let growth = r.union(rect).area() - r.area();
            if growth < best_growth {
                best_growth = growth;
                best = i;
            }
        }
        self.regions[best] = self.regions[best].union(rect);
    }
}

impl<'a> IntoIterator for &'a DirtyRegionContainer {
    type Item = &'a Rect;
    type IntoIter = core::slice::Iter<'a, Rect>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
