// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene tree data model and repaint passes.
//!
//! A *node* is an element of a retained rendering tree. Each node has:
//!
//! - An identity ([`NodeId`]) — a generational handle that becomes stale
//!   when the node is destroyed, preventing use-after-free bugs at the API
//!   level.
//! - Topology — parent, first-child, and sibling links forming an ordered
//!   tree. Only [`Group`](NodeKind::Group) nodes own children; a later
//!   sibling paints on top of an earlier one.
//! - **Local properties** set by the caller:
//!   [`transform`](NodeStore::set_transform),
//!   [`opacity`](NodeStore::set_opacity),
//!   [`blend_mode`](NodeStore::set_blend_mode),
//!   [`effect`](NodeStore::set_effect), [`clip`](NodeStore::set_clip),
//!   [`visible`](NodeStore::set_visible),
//!   [`geometry`](NodeStore::set_geometry), and the bounds maintained by
//!   the owner's layout pass.
//! - **Repaint state** maintained by this crate: the cached opaque region
//!   with its validity flag, per-frame culling bits, and dirty flags.
//!
//! Nodes are stored in struct-of-arrays layout with index-based handles for
//! cache-friendly traversal.
//!
//! # Invalidation
//!
//! Property setters mark the node [`Dirty`](DirtyFlag::Dirty) (propagating
//! a `child_dirty` bit to ancestors) and invalidate the cached opaque
//! region exactly when the mutation can change it:
//!
//! - **transform** / **geometry** / **clip** — always.
//! - **opacity** — only when crossing the fully-opaque or fully-transparent
//!   boundary.
//! - **blend mode** — only on transitions into or out of source-over
//!   compatibility.
//! - **effect** — every reassignment (effects are conservative).
//!
//! A node acting as another node's clip forwards its invalidations to the
//! clipped node.

mod cull;
mod id;
mod kind;
mod opaque;
mod render_root;
mod store;
mod traverse;

pub use cull::{CULL_INSIDE, CULL_INTERSECTS, CULL_OUTSIDE};
pub use id::{EffectId, INVALID, NodeId};
pub use kind::{BlendMode, EffectRef, NodeKind};
pub use render_root::RenderRootResult;
pub use store::{DirtyFlag, NodeStore};
pub use traverse::Children;
