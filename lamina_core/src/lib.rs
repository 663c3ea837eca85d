// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Incremental-repaint core for retained scene graphs.
//!
//! `lamina_core` provides the data structures and passes that let a retained
//! rendering graph repaint only what changed between frames. It is `no_std`
//! compatible (with `alloc`) and uses array-based struct-of-arrays storage
//! with generational index handles for cache-friendly traversal.
//!
//! # Architecture
//!
//! The crate is organized around a per-frame repaint pipeline:
//!
//! ```text
//!   property mutations ──► dirty flags + opaque-region invalidation
//!                                │
//!                                ▼
//!   DirtyRegionContainer::derive_with_new_regions() ──► bounded region set
//!                                │
//!                                ▼
//!   NodeStore::mark_cull_regions() ──► per-node 2-bit culling classification
//!                                │
//!                                ▼
//!   NodeStore::get_render_root() ──► NodePath per dirty region
//! ```
//!
//! **[`node`]** — Struct-of-arrays scene tree with generational handles.
//! Property setters run the precise opaque-region invalidation rules; the
//! opaque-region cache, culling pass, and render-root search all live on
//! [`NodeStore`](node::NodeStore).
//!
//! **[`region`]** — [`DirtyRegionContainer`](region::DirtyRegionContainer), a
//! bounded ordered set of dirty rectangles with a documented merge policy on
//! overflow.
//!
//! **[`path`]** — [`NodePath`](path::NodePath), the resettable
//! root-to-render-root walk handed to the renderer.
//!
//! **[`geometry`]** — Rectangle and affine helpers over [`kurbo`], including
//! the convex-quad containment test used under rotated device transforms.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types for
//! repaint-pass instrumentation, with zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one
//!   branch per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod geometry;
pub mod node;
pub mod path;
pub mod region;
pub mod trace;
