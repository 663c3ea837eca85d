// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and scene dumps for lamina diagnostics.
//!
//! This crate provides [`TraceSink`](lamina_core::trace::TraceSink)
//! implementations and inspection helpers for development and post-mortem
//! analysis:
//!
//! - [`pretty::PrettyPrintSink`] — human-readable one-line-per-event output.
//! - [`pretty::print_tree`] — an annotated dump of a scene subtree (dirty
//!   flags, culling bits, cached opaque regions).
//! - [`recorder::RecorderSink`] — in-memory event recording with JSON
//!   export via [`recorder::export_json`].

pub mod pretty;
pub mod recorder;
