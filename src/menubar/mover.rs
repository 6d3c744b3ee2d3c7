//! Physically relocating a menu-bar item with synthesized pointer input.
//!
//! There is no public API for repositioning another app's status item, so
//! the mover replays what a user would do: press on the item with the
//! reorder modifier held, drag it past the separator, release. The layout
//! engine needs a beat to observe each stage, hence the fixed inter-step
//! delays. The whole sequence is racy against real user input by nature;
//! a failed move leaves the item where it was and the caller's bookkeeping
//! must not assume otherwise.

use std::thread;

use tracing::debug;

use crate::config::Tuning;
use crate::geometry::Point;
use crate::menubar::types::{MenuBarItem, MoveDestination};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerStage {
    Press,
    Drag,
    Release,
}

/// The platform input-synthesis boundary. Implementations post each stage
/// with the reorder modifier already applied and honor the target-window
/// hint when the platform supports tagging events.
pub trait InputSynthesizer {
    /// Post one stage of the drag sequence. `false` when the platform
    /// refuses to construct or deliver the event.
    fn post_stage(&mut self, stage: PointerStage, at: Point, window_hint: Option<u32>) -> bool;

    /// Current pointer position, if the platform can report it.
    fn cursor_location(&self) -> Option<Point>;

    fn set_cursor_hidden(&mut self, hidden: bool);

    fn warp_cursor(&mut self, to: Point);
}

/// Scoped ownership of the real cursor: hidden on entry, and visibility plus
/// position restored on every exit path, success or not.
struct CursorGuard<'a, S: InputSynthesizer> {
    synth: &'a mut S,
    saved: Option<Point>,
}

impl<'a, S: InputSynthesizer> CursorGuard<'a, S> {
    fn acquire(synth: &'a mut S) -> Self {
        let saved = synth.cursor_location();
        synth.set_cursor_hidden(true);
        Self { synth, saved }
    }

    fn post(&mut self, stage: PointerStage, at: Point, window_hint: Option<u32>) -> bool {
        self.synth.post_stage(stage, at, window_hint)
    }
}

impl<S: InputSynthesizer> Drop for CursorGuard<'_, S> {
    fn drop(&mut self) {
        self.synth.set_cursor_hidden(false);
        if let Some(saved) = self.saved {
            self.synth.warp_cursor(saved);
        }
    }
}

pub struct ItemMover<S> {
    synth: S,
    tuning: Tuning,
}

impl<S: InputSynthesizer> ItemMover<S> {
    pub fn new(synth: S, tuning: Tuning) -> Self {
        Self { synth, tuning }
    }

    /// Move an item to the given side of the separator. Retries the full
    /// press-drag-release sequence up to the configured bound; each attempt
    /// is all-or-nothing, a failure simply repeats it after a backoff.
    ///
    /// `false` when the item has no known position or every attempt failed.
    pub fn move_item(&mut self, item: &MenuBarItem, destination: MoveDestination) -> bool {
        let Some(source) = item.position else {
            debug!(id = %item.identity(), "item has no position, cannot move");
            return false;
        };
        let target = destination.target_point(self.tuning.move_margin);

        for attempt in 0..self.tuning.move_attempts {
            if attempt > 0 {
                thread::sleep(self.tuning.move_retry_delay);
            }
            if self.perform_attempt(source, target, item.window_id) {
                return true;
            }
        }
        debug!(id = %item.identity(), attempts = self.tuning.move_attempts, "move exhausted retries");
        false
    }

    fn perform_attempt(&mut self, source: Point, target: Point, window_hint: Option<u32>) -> bool {
        let step = self.tuning.move_step_delay;
        let mut cursor = CursorGuard::acquire(&mut self.synth);

        // The press is tagged to the item's window when known, so
        // overlapping items cannot steal the grab.
        if !cursor.post(PointerStage::Press, source, window_hint) {
            return false;
        }
        thread::sleep(step);
        if !cursor.post(PointerStage::Drag, target, None) {
            return false;
        }
        thread::sleep(step);
        if !cursor.post(PointerStage::Release, target, None) {
            return false;
        }
        thread::sleep(step);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    #[derive(Default)]
    struct ScriptedSynth {
        /// Outcomes to hand out per posted stage, in order. Missing = true.
        failures: Vec<bool>,
        posted: Vec<(PointerStage, Point, Option<u32>)>,
        hidden_transitions: Vec<bool>,
        warps: Vec<Point>,
        location: Option<Point>,
    }

    impl InputSynthesizer for ScriptedSynth {
        fn post_stage(&mut self, stage: PointerStage, at: Point, hint: Option<u32>) -> bool {
            let index = self.posted.len();
            self.posted.push((stage, at, hint));
            self.failures.get(index).copied().map_or(true, |fail| !fail)
        }

        fn cursor_location(&self) -> Option<Point> {
            self.location
        }

        fn set_cursor_hidden(&mut self, hidden: bool) {
            self.hidden_transitions.push(hidden);
        }

        fn warp_cursor(&mut self, to: Point) {
            self.warps.push(to);
        }
    }

    fn movable_item() -> MenuBarItem {
        MenuBarItem {
            owner_app_id: Some("com.example".to_string()),
            title: None,
            pid: 7,
            position: Some(Point::new(1200.0, 4.0)),
            window_id: Some(42),
            icon_png: None,
        }
    }

    fn separator_frame() -> Rect {
        Rect::new(1000.0, 0.0, 10_000.0, 24.0)
    }

    fn mover(synth: ScriptedSynth) -> ItemMover<ScriptedSynth> {
        ItemMover::new(synth, Tuning::instant())
    }

    #[test]
    fn posts_full_sequence_once_on_success() {
        let mut mover = mover(ScriptedSynth {
            location: Some(Point::new(5.0, 5.0)),
            ..Default::default()
        });
        assert!(mover.move_item(&movable_item(), MoveDestination::LeftOf(separator_frame())));

        let stages: Vec<_> = mover.synth.posted.iter().map(|(stage, ..)| *stage).collect();
        assert_eq!(
            stages,
            vec![PointerStage::Press, PointerStage::Drag, PointerStage::Release]
        );
        // Press at the item, drag/release at 20pt left of the separator.
        assert_eq!(mover.synth.posted[0].1, Point::new(1200.0, 4.0));
        assert_eq!(mover.synth.posted[1].1, Point::new(980.0, 12.0));
        // Only the press carries the window hint.
        assert_eq!(mover.synth.posted[0].2, Some(42));
        assert_eq!(mover.synth.posted[1].2, None);
    }

    #[test]
    fn retries_to_the_bound_then_fails() {
        let mut mover = mover(ScriptedSynth {
            failures: vec![true; 16],
            ..Default::default()
        });
        assert!(!mover.move_item(&movable_item(), MoveDestination::LeftOf(separator_frame())));
        // Three attempts, each dying at the press stage.
        assert_eq!(mover.synth.posted.len(), 3);
    }

    #[test]
    fn second_attempt_can_succeed() {
        // First attempt fails on the drag; the retry runs clean.
        let mut mover = mover(ScriptedSynth {
            failures: vec![false, true],
            ..Default::default()
        });
        assert!(mover.move_item(&movable_item(), MoveDestination::RightOf(separator_frame())));
        assert_eq!(mover.synth.posted.len(), 5);
    }

    #[test]
    fn cursor_restored_on_every_attempt_even_on_failure() {
        let mut mover = mover(ScriptedSynth {
            failures: vec![true; 16],
            location: Some(Point::new(33.0, 44.0)),
            ..Default::default()
        });
        assert!(!mover.move_item(&movable_item(), MoveDestination::LeftOf(separator_frame())));
        // hide, show per attempt, strictly alternating.
        assert_eq!(
            mover.synth.hidden_transitions,
            vec![true, false, true, false, true, false]
        );
        assert_eq!(mover.synth.warps, vec![Point::new(33.0, 44.0); 3]);
    }

    #[test]
    fn item_without_position_is_unmovable() {
        let mut mover = mover(ScriptedSynth::default());
        let mut item = movable_item();
        item.position = None;
        assert!(!mover.move_item(&item, MoveDestination::LeftOf(separator_frame())));
        assert!(mover.synth.posted.is_empty());
        assert!(mover.synth.hidden_transitions.is_empty());
    }

    #[test]
    fn unknown_cursor_location_skips_warp_but_not_unhide() {
        let mut mover = mover(ScriptedSynth::default());
        assert!(mover.move_item(&movable_item(), MoveDestination::LeftOf(separator_frame())));
        assert_eq!(mover.synth.hidden_transitions, vec![true, false]);
        assert!(mover.synth.warps.is_empty());
    }
}
