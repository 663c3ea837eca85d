// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node kinds, blend modes, and effect references.

use kurbo::{Point, Rect};

use super::id::EffectId;

/// How a node's pixels composite against what was painted below it.
///
/// A node with no explicit blend mode inherits source-over compositing,
/// which is the only mode under which opaque pixels stay opaque.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlendMode {
    /// Standard Porter-Duff source-over compositing.
    SourceOver,
    /// Multiply blending.
    Multiply,
    /// Screen blending.
    Screen,
}

/// Returns whether the given (optional) blend mode composites source-over.
#[inline]
pub(crate) fn passes_src_over(mode: Option<BlendMode>) -> bool {
    matches!(mode, None | Some(BlendMode::SourceOver))
}

/// A reference to an externally managed effect attached to a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EffectRef {
    /// Identity of the effect in the external pipeline.
    pub id: EffectId,
    /// Whether the effect can turn fully opaque input pixels translucent
    /// (e.g. a blur feathering edges). When `true`, the node can never
    /// promise an opaque region.
    pub reduces_opaque_pixels: bool,
}

/// What a node draws, in its own local coordinate space.
///
/// The variant set is closed: each variant carries exactly the geometry the
/// repaint core needs to answer "which axis-aligned rectangle is guaranteed
/// fully opaque when this node paints at full opacity?".
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NodeKind {
    /// An interior node that paints nothing itself but owns ordered children.
    ///
    /// `opaque_insets` optionally declares a local-space rectangle the
    /// group's background is known to cover (e.g. a styled container with an
    /// opaque fill), enabling the group itself to act as an occluder.
    Group {
        /// Declared opaque coverage in local coordinates, if any.
        opaque_insets: Option<Rect>,
    },
    /// An axis-aligned (possibly round-cornered) rectangle fill.
    Rectangle {
        /// Fill bounds in local coordinates.
        bounds: Rect,
        /// Corner arc radius; `0.0` for square corners.
        corner_radius: f64,
    },
    /// A filled circle.
    Circle {
        /// Center in local coordinates.
        center: Point,
        /// Radius.
        radius: f64,
    },
    /// A filled axis-aligned ellipse.
    Ellipse {
        /// Center in local coordinates.
        center: Point,
        /// Horizontal radius.
        radius_x: f64,
        /// Vertical radius.
        radius_y: f64,
    },
    /// A bitmap drawn into a viewport rectangle.
    Image {
        /// Destination rectangle in local coordinates.
        viewport: Rect,
        /// Whether pixel content is currently available. An image without
        /// content paints nothing and covers nothing.
        has_content: bool,
    },
    /// An arbitrary filled or stroked path. Paths make no opaque-coverage
    /// promises.
    Path,
}

impl NodeKind {
    /// Returns whether this kind can ever report an opaque region.
    #[must_use]
    pub fn supports_opaque_regions(&self) -> bool {
        !matches!(self, Self::Path)
    }
}
