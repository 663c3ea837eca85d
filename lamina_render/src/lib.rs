// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame repaint planning for lamina.
//!
//! This crate sits between [`lamina_core`]'s scene tree and a backend
//! renderer. [`plan_repaint`] runs the per-frame pipeline — derive the
//! dirty-region set, classify the tree against it, and select a render
//! root per region — and packages the result as a [`RepaintPlan`] the
//! renderer can execute.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

mod plan;

pub use plan::{RegionPlan, RepaintPlan, plan_repaint};
