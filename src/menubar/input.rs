//! macOS synthetic pointer input via CoreGraphics events.
//!
//! Move sequences are posted at the HID tap with the command flag (the
//! bar's reorder modifier) held on the press and drag stages, tagged to
//! the item's window when one is known. Event construction fails without
//! the input-synthesis privilege; that failure surfaces as `false` and the
//! mover's retry/bookkeeping absorbs it.

use core_graphics::display::CGDisplay;
use core_graphics::event::{
    CGEvent, CGEventFlags, CGEventTapLocation, CGEventType, CGMouseButton, EventField,
};
use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};
use core_graphics::geometry::CGPoint;

use crate::geometry::Point;
use crate::menubar::mover::{InputSynthesizer, PointerStage};

pub struct CgInputSynthesizer;

impl CgInputSynthesizer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CgInputSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSynthesizer for CgInputSynthesizer {
    fn post_stage(&mut self, stage: PointerStage, at: Point, window_hint: Option<u32>) -> bool {
        let Ok(source) = CGEventSource::new(CGEventSourceStateID::HIDSystemState) else {
            return false;
        };
        let event_type = match stage {
            PointerStage::Press => CGEventType::LeftMouseDown,
            PointerStage::Drag => CGEventType::LeftMouseDragged,
            PointerStage::Release => CGEventType::LeftMouseUp,
        };
        let Ok(event) = CGEvent::new_mouse_event(
            source,
            event_type,
            CGPoint::new(at.x, at.y),
            CGMouseButton::Left,
        ) else {
            return false;
        };

        // The reorder modifier rides on press and drag; the release is plain.
        if stage != PointerStage::Release {
            event.set_flags(CGEventFlags::CGEventFlagCommand);
        }
        if let Some(window_id) = window_hint {
            event.set_integer_value_field(
                EventField::MOUSE_EVENT_WINDOW_UNDER_MOUSE_POINTER,
                i64::from(window_id),
            );
        }

        event.post(CGEventTapLocation::HID);
        true
    }

    fn cursor_location(&self) -> Option<Point> {
        let source = CGEventSource::new(CGEventSourceStateID::HIDSystemState).ok()?;
        let event = CGEvent::new(source).ok()?;
        let location = event.location();
        Some(Point::new(location.x, location.y))
    }

    fn set_cursor_hidden(&mut self, hidden: bool) {
        let display = CGDisplay::main();
        let _ = if hidden {
            display.hide_cursor()
        } else {
            display.show_cursor()
        };
    }

    fn warp_cursor(&mut self, to: Point) {
        let _ = CGDisplay::warp_mouse_cursor_position(CGPoint::new(to.x, to.y));
    }
}
