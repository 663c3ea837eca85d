// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the repaint pipeline.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that
//! repaint-pass instrumentation calls at each stage. All method bodies
//! default to no-ops, so implementing only the events you care about is
//! fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace`
//! feature is **off**, every `Tracer` method compiles to nothing (zero
//! overhead). When **on**, each method performs a single `Option` branch
//! before dispatching.
//!
//! # Crate features
//!
//! - `trace` — enables the `Tracer` method bodies (one branch per call).

use kurbo::Rect;

use crate::node::RenderRootResult;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted after a frame's dirty-region set has been derived.
#[derive(Clone, Copy, Debug)]
pub struct RegionsDerivedEvent {
    /// Monotonic frame counter.
    pub frame_index: u64,
    /// How many candidate rectangles were offered.
    pub candidate_count: usize,
    /// How many regions the container holds after deriving.
    pub region_count: usize,
}

/// Emitted after the culling pass has classified the tree.
#[derive(Clone, Copy, Debug)]
pub struct CullPassEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// How many regions the tree was classified against.
    pub region_count: usize,
}

/// Emitted after the render-root search for one dirty region.
#[derive(Clone, Copy, Debug)]
pub struct RenderRootEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which region slot was searched.
    pub region_index: usize,
    /// The dirty region in device space.
    pub region: Rect,
    /// Outcome of the occluder search.
    pub result: RenderRootResult,
    /// Length of the resulting path (0 when nothing needs painting).
    pub path_len: usize,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the repaint pipeline.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called after the dirty-region set has been derived.
    fn on_regions_derived(&mut self, e: &RegionsDerivedEvent) {
        _ = e;
    }

    /// Called after the culling pass.
    fn on_cull_pass(&mut self, e: &CullPassEvent) {
        _ = e;
    }

    /// Called after each per-region render-root search.
    fn on_render_root(&mut self, e: &RenderRootEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing.
/// When **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`RegionsDerivedEvent`].
    #[inline]
    pub fn regions_derived(&mut self, e: &RegionsDerivedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_regions_derived(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`CullPassEvent`].
    #[inline]
    pub fn cull_pass(&mut self, e: &CullPassEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_cull_pass(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`RenderRootEvent`].
    #[inline]
    pub fn render_root(&mut self, e: &RenderRootEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_render_root(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> RegionsDerivedEvent {
        RegionsDerivedEvent {
            frame_index: 42,
            candidate_count: 9,
            region_count: 6,
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_regions_derived(&sample_event());
        sink.on_cull_pass(&CullPassEvent {
            frame_index: 42,
            region_count: 6,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.regions_derived(&sample_event());
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            frames: Vec<u64>,
        }
        impl TraceSink for RecordingSink {
            fn on_regions_derived(&mut self, e: &RegionsDerivedEvent) {
                self.frames.push(e.frame_index);
            }
        }

        let mut sink = RecordingSink { frames: Vec::new() };
        let mut tracer = Tracer::new(&mut sink);
        tracer.regions_derived(&sample_event());
        drop(tracer);
        assert_eq!(sink.frames, &[42]);
    }
}
