// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory event recording and JSON export.
//!
//! [`RecorderSink`] implements [`TraceSink`] and keeps every event it
//! receives. [`export_json`] writes a recording as a JSON array for
//! offline inspection of repaint behavior across frames.

use std::io::{self, Write};

use serde_json::{Value, json};

use kurbo::Rect;
use lamina_core::trace::{CullPassEvent, RegionsDerivedEvent, RenderRootEvent, TraceSink};

/// A recorded repaint-pipeline event.
#[derive(Clone, Copy, Debug)]
pub enum RecordedEvent {
    /// A [`RegionsDerivedEvent`].
    RegionsDerived(RegionsDerivedEvent),
    /// A [`CullPassEvent`].
    CullPass(CullPassEvent),
    /// A [`RenderRootEvent`].
    RenderRoot(RenderRootEvent),
}

/// A [`TraceSink`] that keeps every event it receives.
#[derive(Debug, Default)]
pub struct RecorderSink {
    events: Vec<RecordedEvent>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded events.
    #[must_use]
    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    /// Consumes the recorder and returns the recorded events.
    #[must_use]
    pub fn into_events(self) -> Vec<RecordedEvent> {
        self.events
    }

    /// Discards everything recorded so far.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl TraceSink for RecorderSink {
    fn on_regions_derived(&mut self, e: &RegionsDerivedEvent) {
        self.events.push(RecordedEvent::RegionsDerived(*e));
    }

    fn on_cull_pass(&mut self, e: &CullPassEvent) {
        self.events.push(RecordedEvent::CullPass(*e));
    }

    fn on_render_root(&mut self, e: &RenderRootEvent) {
        self.events.push(RecordedEvent::RenderRoot(*e));
    }
}

/// Exports a recording as a JSON array of event objects.
///
/// Each object carries an `"event"` discriminant plus the event's fields;
/// rectangles are written as `[x0, y0, x1, y1]`.
///
/// # Errors
///
/// Propagates write failures.
pub fn export_json(events: &[RecordedEvent], writer: &mut dyn Write) -> io::Result<()> {
    let mut out: Vec<Value> = Vec::with_capacity(events.len());

    for recorded in events {
        match recorded {
            RecordedEvent::RegionsDerived(e) => {
                out.push(json!({
                    "event": "regions_derived",
                    "frame": e.frame_index,
                    "candidates": e.candidate_count,
                    "regions": e.region_count,
                }));
            }
            RecordedEvent::CullPass(e) => {
                out.push(json!({
                    "event": "cull_pass",
                    "frame": e.frame_index,
                    "regions": e.region_count,
                }));
            }
            RecordedEvent::RenderRoot(e) => {
                out.push(json!({
                    "event": "render_root",
                    "frame": e.frame_index,
                    "slot": e.region_index,
                    "region": rect_json(e.region),
                    "result": format!("{:?}", e.result),
                    "path_len": e.path_len,
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &out)?;
    Ok(())
}

fn rect_json(r: Rect) -> Value {
    json!([r.x0, r.y0, r.x1, r.y1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use lamina_core::node::RenderRootResult;

    fn sample_regions_event() -> RegionsDerivedEvent {
        RegionsDerivedEvent {
            frame_index: 7,
            candidate_count: 4,
            region_count: 2,
        }
    }

    #[test]
    fn records_events_in_order() {
        let mut rec = RecorderSink::new();
        rec.on_regions_derived(&sample_regions_event());
        rec.on_cull_pass(&CullPassEvent {
            frame_index: 7,
            region_count: 2,
        });
        rec.on_render_root(&RenderRootEvent {
            frame_index: 7,
            region_index: 0,
            region: Rect::new(10.0, 10.0, 50.0, 50.0),
            result: RenderRootResult::NoRenderRoot,
            path_len: 1,
        });

        assert_eq!(rec.events().len(), 3);
        assert!(matches!(rec.events()[0], RecordedEvent::RegionsDerived(_)));
        assert!(matches!(rec.events()[1], RecordedEvent::CullPass(_)));
        assert!(matches!(rec.events()[2], RecordedEvent::RenderRoot(_)));

        rec.clear();
        assert!(rec.events().is_empty());
    }

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_regions_derived(&sample_regions_event());
        rec.on_render_root(&RenderRootEvent {
            frame_index: 7,
            region_index: 1,
            region: Rect::new(0.0, 0.0, 100.0, 200.0),
            result: RenderRootResult::HasRenderRootAndIsClean,
            path_len: 0,
        });

        let mut out = Vec::new();
        export_json(rec.events(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 2);

        assert_eq!(parsed[0]["event"], "regions_derived");
        assert_eq!(parsed[0]["frame"], 7);
        assert_eq!(parsed[0]["regions"], 2);

        assert_eq!(parsed[1]["event"], "render_root");
        assert_eq!(parsed[1]["slot"], 1);
        assert_eq!(parsed[1]["region"], json!([0.0, 0.0, 100.0, 200.0]));
        assert_eq!(parsed[1]["result"], "HasRenderRootAndIsClean");
        assert_eq!(parsed[1]["path_len"], 0);
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export_json(&[], &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert!(parsed.is_empty());
    }
}
