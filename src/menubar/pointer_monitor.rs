//! Global pointer feed for the drag detector.
//!
//! A listen-only CGEventTap on a background thread forwards left-button
//! down/drag/up samples through a channel. The coordinating thread drains
//! the channel and feeds the detector; nothing here touches shared state.
//! CGEvent locations are already top-left-origin global coordinates, the
//! same space the accessibility tree uses, so samples pass through without
//! conversion.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use core_foundation::runloop::{kCFRunLoopCommonModes, kCFRunLoopDefaultMode, CFRunLoop};
use core_graphics::event::{
    CGEventTap, CGEventTapLocation, CGEventTapOptions, CGEventTapPlacement, CGEventType,
};

use crate::geometry::Point;
use crate::menubar::drag_detector::{PointerPhase, PointerSample};

/// Watches the global pointer and delivers [`PointerSample`]s.
pub struct PointerMonitor {
    running: Arc<AtomicBool>,
    receiver: Receiver<PointerSample>,
    run_loop: Arc<Mutex<Option<CFRunLoop>>>,
    _handle: JoinHandle<()>,
}

impl PointerMonitor {
    /// Install the event tap. Fails when the automation permission is
    /// missing, which is the usual reason tap creation is refused.
    pub fn start() -> Result<Self, String> {
        let running = Arc::new(AtomicBool::new(true));
        let running_for_thread = Arc::clone(&running);
        let (tx, rx) = mpsc::channel::<PointerSample>();
        let (setup_tx, setup_rx) = mpsc::channel::<Result<(), String>>();
        let run_loop: Arc<Mutex<Option<CFRunLoop>>> = Arc::new(Mutex::new(None));
        let run_loop_for_thread = Arc::clone(&run_loop);

        let handle = thread::spawn(move || {
            Self::pump(running_for_thread, tx, setup_tx, run_loop_for_thread);
        });

        match setup_rx.recv_timeout(Duration::from_secs(5)) {
            Ok(Ok(())) => Ok(Self {
                running,
                receiver: rx,
                run_loop,
                _handle: handle,
            }),
            Ok(Err(error)) => Err(error),
            Err(_) => Err("timed out installing pointer tap".to_string()),
        }
    }

    fn pump(
        running: Arc<AtomicBool>,
        tx: Sender<PointerSample>,
        setup_tx: Sender<Result<(), String>>,
        run_loop_holder: Arc<Mutex<Option<CFRunLoop>>>,
    ) {
        let interesting = vec![
            CGEventType::LeftMouseDown,
            CGEventType::LeftMouseDragged,
            CGEventType::LeftMouseUp,
        ];

        let tap = CGEventTap::new(
            CGEventTapLocation::HID,
            CGEventTapPlacement::HeadInsertEventTap,
            CGEventTapOptions::ListenOnly,
            interesting,
            move |_proxy, event_type, event| {
                let phase = match event_type {
                    CGEventType::LeftMouseDown => PointerPhase::Down,
                    CGEventType::LeftMouseDragged => PointerPhase::Moved,
                    CGEventType::LeftMouseUp => PointerPhase::Up,
                    _ => return None,
                };
                let location = event.location();
                let sample =
                    PointerSample::new(phase, Point::new(location.x, location.y));
                let _ = tx.send(sample);
                // Listen-only tap: the event continues unmodified.
                None
            },
        );

        let tap = match tap {
            Ok(tap) => tap,
            Err(()) => {
                let _ = setup_tx.send(Err(
                    "could not create pointer tap; automation permission missing?".to_string(),
                ));
                return;
            }
        };

        let source = match tap.mach_port.create_runloop_source(0) {
            Ok(source) => source,
            Err(()) => {
                let _ = setup_tx.send(Err("could not create run loop source".to_string()));
                return;
            }
        };

        let current = CFRunLoop::get_current();
        if let Ok(mut holder) = run_loop_holder.lock() {
            *holder = Some(current.clone());
        }

        unsafe {
            current.add_source(&source, kCFRunLoopCommonModes);
        }
        tap.enable();
        let _ = setup_tx.send(Ok(()));

        // kCFRunLoopDefaultMode for running; the common-modes pseudo-mode is
        // only valid for adding sources.
        while running.load(Ordering::SeqCst) {
            let result = unsafe {
                CFRunLoop::run_in_mode(kCFRunLoopDefaultMode, Duration::from_millis(100), true)
            };
            if result == core_foundation::runloop::CFRunLoopRunResult::Stopped {
                break;
            }
        }

        unsafe {
            current.remove_source(&source, kCFRunLoopCommonModes);
        }
    }

    /// Drain one sample without blocking.
    pub fn try_recv(&self) -> Option<PointerSample> {
        match self.receiver.try_recv() {
            Ok(sample) => Some(sample),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Wait briefly for the next sample.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<PointerSample> {
        self.receiver.recv_timeout(timeout).ok()
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        if let Ok(holder) = self.run_loop.lock() {
            if let Some(run_loop) = holder.as_ref() {
                run_loop.stop();
            }
        }
    }
}

impl Drop for PointerMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monitor_starts_and_stops_or_reports_missing_permission() {
        match PointerMonitor::start() {
            Ok(monitor) => {
                monitor.stop();
            }
            Err(error) => {
                // Expected on machines without the automation permission.
                assert!(error.contains("tap") || error.contains("permission"));
            }
        }
    }
}
