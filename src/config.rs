//! Tuning knobs for the automation layer.
//!
//! Every delay, threshold, and tolerance in the move/press/drag machinery is
//! empirically tuned against the OS layout engine's timing. They live here as
//! plain configuration rather than scattered constants so hosts (and tests)
//! can override them.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Tuning {
    /// Maximum synthetic-move attempts before giving up.
    pub move_attempts: u32,
    /// Pause between the press, drag, and release stages of one attempt,
    /// long enough for the layout engine to observe each stage.
    pub move_step_delay: Duration,
    /// Backoff between failed move attempts.
    pub move_retry_delay: Duration,
    /// Horizontal offset past the separator frame when placing an item.
    pub move_margin: f64,
    /// Distance a pressed pointer must travel before a drag is recognized.
    pub drag_threshold: f64,
    /// Horizontal / vertical growth of the anchor frame when testing whether
    /// a drag hovers over it.
    pub hit_area_inset_x: f64,
    pub hit_area_inset_y: f64,
    /// Maximum distance between an accessibility position and a window origin
    /// for the two to be considered the same item.
    pub window_match_tolerance: f64,
    /// Separator length while expanded; pushes trailing items off the bar.
    pub separator_expanded_length: f64,
    /// Separator length while collapsed.
    pub separator_collapsed_length: f64,
    /// Wait after collapsing the separator before re-resolving an item,
    /// so the bar has re-laid-out.
    pub press_settle_delay: Duration,
    /// Wait after activating an item before re-expanding, so any menu the
    /// press opened has appeared.
    pub press_menu_delay: Duration,
    /// Wait before reconciling at launch; other apps register their status
    /// items in no guaranteed order.
    pub launch_settle_delay: Duration,
    /// How often to re-check accessibility trust while it is not granted.
    pub permission_poll_interval: Duration,
    /// How many ancestors to climb when normalizing a hit-tested node to a
    /// menu-bar item.
    pub ancestor_walk_limit: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            move_attempts: 3,
            move_step_delay: Duration::from_millis(30),
            move_retry_delay: Duration::from_millis(50),
            move_margin: 20.0,
            drag_threshold: 5.0,
            hit_area_inset_x: 10.0,
            hit_area_inset_y: 6.0,
            window_match_tolerance: 20.0,
            separator_expanded_length: 10_000.0,
            separator_collapsed_length: 0.0,
            press_settle_delay: Duration::from_millis(150),
            press_menu_delay: Duration::from_millis(300),
            launch_settle_delay: Duration::from_secs(2),
            permission_poll_interval: Duration::from_millis(1500),
            ancestor_walk_limit: 6,
        }
    }
}

impl Tuning {
    /// A tuning with every delay zeroed, for tests and synchronous harnesses
    /// that drive the state machines without waiting on the OS.
    pub fn instant() -> Self {
        Self {
            move_step_delay: Duration::ZERO,
            move_retry_delay: Duration::ZERO,
            press_settle_delay: Duration::ZERO,
            press_menu_delay: Duration::ZERO,
            launch_settle_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_bounded() {
        let tuning = Tuning::default();
        assert!(tuning.move_attempts >= 1);
        assert!(tuning.drag_threshold > 0.0);
        assert!(tuning.window_match_tolerance > 0.0);
        assert!(tuning.separator_expanded_length > tuning.separator_collapsed_length);
    }

    #[test]
    fn instant_zeroes_delays_only() {
        let tuning = Tuning::instant();
        assert_eq!(tuning.move_step_delay, Duration::ZERO);
        assert_eq!(tuning.launch_settle_delay, Duration::ZERO);
        assert_eq!(tuning.move_attempts, Tuning::default().move_attempts);
    }
}
