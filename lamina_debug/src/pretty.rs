// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output and scene dumps.

use std::io::Write;

use lamina_core::node::{DirtyFlag, NodeId, NodeKind, NodeStore};
use lamina_core::trace::{CullPassEvent, RegionsDerivedEvent, RenderRootEvent, TraceSink};

/// A [`TraceSink`] that writes one line per event.
///
/// Useful during development to watch the repaint pipeline live:
///
/// ```text
/// [regions] frame=12 candidates=3 regions=2
/// [cull] frame=12 regions=2
/// [render-root] frame=12 slot=0 region=(150,150)-(300,300) result=HasRenderRoot path=2
/// ```
///
/// Write failures are ignored; tracing must never take the pipeline down.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink writing to the given boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink writing to a concrete writer type.
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_regions_derived(&mut self, e: &RegionsDerivedEvent) {
        let _ = writeln!(
            self.writer,
            "[regions] frame={} candidates={} regions={}",
            e.frame_index, e.candidate_count, e.region_count
        );
    }

    fn on_cull_pass(&mut self, e: &CullPassEvent) {
        let _ = writeln!(
            self.writer,
            "[cull] frame={} regions={}",
            e.frame_index, e.region_count
        );
    }

    fn on_render_root(&mut self, e: &RenderRootEvent) {
        let _ = writeln!(
            self.writer,
            "[render-root] frame={} slot={} region={} result={:?} path={}",
            e.frame_index,
            e.region_index,
            fmt_rect(e.region),
            e.result,
            e.path_len
        );
    }
}

fn fmt_rect(r: kurbo::Rect) -> String {
    format!("({},{})-({},{})", r.x0, r.y0, r.x1, r.y1)
}

fn kind_name(kind: &NodeKind) -> &'static str {
    match kind {
        NodeKind::Group { .. } => "Group",
        NodeKind::Rectangle { .. } => "Rectangle",
        NodeKind::Circle { .. } => "Circle",
        NodeKind::Ellipse { .. } => "Ellipse",
        NodeKind::Image { .. } => "Image",
        NodeKind::Path => "Path",
    }
}

/// Dumps a subtree with its repaint state, one node per line.
///
/// Each line shows the node kind and id followed by its dirty flags,
/// culling bits, cached opaque region, and any of invisibility, reduced
/// opacity, blend mode, effect, and clip that apply.
///
/// # Panics
///
/// Panics if `root` is stale.
///
/// # Errors
///
/// Propagates write failures.
pub fn print_tree<W: Write>(
    store: &NodeStore,
    root: NodeId,
    writer: &mut W,
) -> std::io::Result<()> {
    print_tree_at(store, root, writer, 0)
}

fn print_tree_at<W: Write>(
    store: &NodeStore,
    id: NodeId,
    writer: &mut W,
    depth: usize,
) -> std::io::Result<()> {
    for _ in 0..depth {
        write!(writer, "  ")?;
    }
    write!(writer, "{} {:?}", kind_name(store.kind(id)), id)?;

    if store.is_clean(id) {
        write!(writer, " clean")?;
    } else {
        if store.dirty_flag(id) == DirtyFlag::Dirty {
            write!(writer, " dirty")?;
        }
        if store.is_child_dirty(id) {
            write!(writer, " childDirty")?;
        }
    }

    let bits = store.culling_bits(id);
    if bits != 0 {
        write!(writer, " bits={bits:#b}")?;
    }
    if let Some(or) = store.cached_opaque_region(id) {
        if !store.is_opaque_region_invalid(id) {
            write!(writer, " or={}", fmt_rect(or))?;
        }
    }
    if !store.visible(id) {
        write!(writer, " invisible")?;
    }
    let opacity = store.opacity(id);
    if opacity < 1.0 {
        write!(writer, " op={opacity:.2}")?;
    }
    if let Some(mode) = store.blend_mode(id) {
        write!(writer, " blend={mode:?}")?;
    }
    if let Some(effect) = store.effect(id) {
        write!(writer, " effect={:?}", effect.id)?;
    }
    if let Some(clip) = store.clip(id) {
        write!(writer, " clip={clip:?}")?;
    }
    writeln!(writer)?;

    for child in store.children(id) {
        print_tree_at(store, child, writer, depth + 1)?;
    }
    Ok(())
}
