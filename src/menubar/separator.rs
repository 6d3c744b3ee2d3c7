//! The separator: an invisible status item whose width partitions the bar.
//!
//! While expanded it takes a huge sentinel length, pushing everything to its
//! left out of the visible strip; collapsed it is zero-width and the bar lays
//! out normally. The OS recomputes every sibling's position on any length
//! change, so the frame must be re-read after each transition — a cached
//! frame is wrong, not merely stale.

use crate::config::Tuning;
use crate::geometry::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryState {
    /// Wide: items left of the separator are pushed off the strip.
    Expanded,
    /// Zero-width: every item lays out on screen.
    Collapsed,
}

/// Platform backing for the separator: one status-bar slot whose length we
/// own and whose frame the OS owns.
pub trait StatusSlot {
    fn set_length(&mut self, length: f64);

    /// Current frame of the slot's window in top-left-origin screen space,
    /// when the slot is attached to a bar.
    fn frame(&self) -> Option<Rect>;

    fn window_id(&self) -> Option<u32>;
}

/// Two-state boundary over a status slot. Created once at process start;
/// dropping it gives the slot back to the bar.
pub struct SeparatorBoundary<S> {
    slot: S,
    state: BoundaryState,
    expanded_length: f64,
    collapsed_length: f64,
}

impl<S: StatusSlot> SeparatorBoundary<S> {
    /// Starts collapsed; reconciliation expands it once there is something
    /// to hide behind it.
    pub fn new(mut slot: S, tuning: &Tuning) -> Self {
        slot.set_length(tuning.separator_collapsed_length);
        Self {
            slot,
            state: BoundaryState::Collapsed,
            expanded_length: tuning.separator_expanded_length,
            collapsed_length: tuning.separator_collapsed_length,
        }
    }

    pub fn state(&self) -> BoundaryState {
        self.state
    }

    /// Immediate, idempotent transition. The slot length is always written;
    /// the OS treats a same-value write as a no-op.
    pub fn set_state(&mut self, state: BoundaryState) {
        self.state = state;
        let length = match state {
            BoundaryState::Expanded => self.expanded_length,
            BoundaryState::Collapsed => self.collapsed_length,
        };
        self.slot.set_length(length);
    }

    pub fn toggle(&mut self) {
        match self.state {
            BoundaryState::Expanded => self.set_state(BoundaryState::Collapsed),
            BoundaryState::Collapsed => self.set_state(BoundaryState::Expanded),
        }
    }

    /// The boundary's screen frame, meaningful only while expanded. Always
    /// read through to the slot; never cached across a transition.
    pub fn frame(&self) -> Option<Rect> {
        match self.state {
            BoundaryState::Expanded => self.slot.frame(),
            BoundaryState::Collapsed => None,
        }
    }

    pub fn window_id(&self) -> Option<u32> {
        self.slot.window_id()
    }
}

#[cfg(target_os = "macos")]
pub use system::SystemStatusSlot;

#[cfg(target_os = "macos")]
mod system {
    use objc2::rc::Retained;
    use objc2::MainThreadMarker;
    use objc2_app_kit::{NSStatusBar, NSStatusItem};
    use objc2_foundation::NSString;

    use super::StatusSlot;
    use crate::geometry::Rect;

    /// A real status-bar slot. Autosave-named so the OS keeps its position
    /// in the bar across runs; removed from the bar on drop.
    pub struct SystemStatusSlot {
        status_item: Retained<NSStatusItem>,
        mtm: MainThreadMarker,
    }

    impl SystemStatusSlot {
        /// `None` off the main thread; AppKit status items are main-thread
        /// objects.
        pub fn new(autosave_name: &str) -> Option<Self> {
            let mtm = MainThreadMarker::new()?;
            let status_item = unsafe {
                let bar = NSStatusBar::systemStatusBar();
                bar.statusItemWithLength(0.0)
            };
            unsafe {
                status_item.setAutosaveName(Some(&NSString::from_str(autosave_name)));
                if let Some(button) = status_item.button(mtm) {
                    button.setTitle(&NSString::from_str(""));
                    button.setEnabled(false);
                }
            }
            Some(Self { status_item, mtm })
        }
    }

    impl StatusSlot for SystemStatusSlot {
        fn set_length(&mut self, length: f64) {
            unsafe { self.status_item.setLength(length) }
        }

        fn frame(&self) -> Option<Rect> {
            let window = unsafe { self.status_item.button(self.mtm)?.window()? };
            let frame = window.frame();
            let screen_height = unsafe {
                window
                    .screen()
                    .map(|screen| screen.frame().size.height)
                    .or_else(|| {
                        objc2_app_kit::NSScreen::mainScreen(self.mtm)
                            .map(|screen| screen.frame().size.height)
                    })?
            };
            let cocoa = Rect::new(
                frame.origin.x,
                frame.origin.y,
                frame.size.width,
                frame.size.height,
            );
            Some(cocoa.flipped_y(screen_height))
        }

        fn window_id(&self) -> Option<u32> {
            let window = unsafe { self.status_item.button(self.mtm)?.window()? };
            u32::try_from(window.windowNumber()).ok()
        }
    }

    impl Drop for SystemStatusSlot {
        fn drop(&mut self) {
            unsafe { NSStatusBar::systemStatusBar().removeStatusItem(&self.status_item) }
        }
    }
}
