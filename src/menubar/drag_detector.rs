//! Recognizing "item dragged onto the control and released there".
//!
//! One global pointer feed drives a three-state machine: a press arms it,
//! movement past a small threshold turns the press into a drag, and a
//! release ends it. While dragging, hovering over the anchor's padded hit
//! area is tracked edge-triggered so the UI is only told about changes, not
//! every sample. A release inside the hit area yields the hide intent,
//! resolved against where the drag *started*: that is the item being
//! carried, not whatever sits under the cursor at release time.

use crate::config::Tuning;
use crate::geometry::{Point, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Moved,
    Up,
}

/// One sample from the global pointer feed, in top-left-origin screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub phase: PointerPhase,
    pub position: Point,
}

impl PointerSample {
    pub fn new(phase: PointerPhase, position: Point) -> Self {
        Self { phase, position }
    }

    /// Build a sample from a bottom-left-origin feed (Cocoa event monitors).
    /// The tree the intent will be resolved against is top-left-origin, so
    /// the conversion happens here, before anything downstream sees the
    /// point.
    pub fn from_bottom_left(phase: PointerPhase, position: Point, screen_height: f64) -> Self {
        Self {
            phase,
            position: position.flipped_y(screen_height),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragSignal {
    /// The drag entered (`true`) or left (`false`) the anchor hit area.
    HoverChanged(bool),
    /// Released inside the hit area while dragging. `grab_point` is the
    /// drag-start location to resolve the carried item at.
    DroppedOnAnchor { grab_point: Point },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    Armed { origin: Point },
    Dragging { origin: Point, hovering: bool },
}

pub struct DragGestureDetector {
    phase: Phase,
    threshold: f64,
    inset_x: f64,
    inset_y: f64,
}

impl DragGestureDetector {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            phase: Phase::Idle,
            threshold: tuning.drag_threshold,
            inset_x: tuning.hit_area_inset_x,
            inset_y: tuning.hit_area_inset_y,
        }
    }

    /// Feed one pointer sample. `anchor` is the control's current frame in
    /// top-left-origin screen space, or `None` while it has no window.
    pub fn handle(&mut self, sample: PointerSample, anchor: Option<Rect>) -> Option<DragSignal> {
        match sample.phase {
            PointerPhase::Down => {
                self.phase = Phase::Armed {
                    origin: sample.position,
                };
                None
            }
            PointerPhase::Moved => self.handle_move(sample.position, anchor),
            PointerPhase::Up => self.handle_release(sample.position, anchor),
        }
    }

    fn handle_move(&mut self, position: Point, anchor: Option<Rect>) -> Option<DragSignal> {
        match self.phase {
            Phase::Idle => None,
            Phase::Armed { origin } => {
                if origin.distance_to(position) <= self.threshold {
                    return None;
                }
                let hovering = self.hit_area_contains(anchor, position);
                self.phase = Phase::Dragging { origin, hovering };
                hovering.then_some(DragSignal::HoverChanged(true))
            }
            Phase::Dragging { origin, hovering } => {
                let inside = self.hit_area_contains(anchor, position);
                if inside == hovering {
                    return None;
                }
                self.phase = Phase::Dragging {
                    origin,
                    hovering: inside,
                };
                Some(DragSignal::HoverChanged(inside))
            }
        }
    }

    fn handle_release(&mut self, position: Point, anchor: Option<Rect>) -> Option<DragSignal> {
        let phase = self.phase;
        // The machine always returns to idle on release, whatever happens
        // with resolution downstream.
        self.phase = Phase::Idle;
        match phase {
            Phase::Dragging { origin, .. } if self.hit_area_contains(anchor, position) => {
                Some(DragSignal::DroppedOnAnchor { grab_point: origin })
            }
            _ => None,
        }
    }

    fn hit_area_contains(&self, anchor: Option<Rect>, position: Point) -> bool {
        anchor
            .map(|frame| frame.inset_by(-self.inset_x, -self.inset_y).contains(position))
            .unwrap_or(false)
    }
}
