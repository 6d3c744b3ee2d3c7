//! The automation-permission boundary.
//!
//! Accessibility trust is granted out-of-band in System Settings and can be
//! revoked at any time, so it is polled, not observed. The poller runs at a
//! low frequency while the capability is missing and goes quiet the moment
//! it is granted.

use std::time::{Duration, Instant};

use crate::config::Tuning;

pub trait PermissionGate {
    /// Is the automation capability currently granted?
    fn is_granted(&self) -> bool;

    /// Ask the OS to put up its grant prompt. Returns the state after the
    /// request, which on most platforms is still "not yet".
    fn request(&self) -> bool;
}

/// Caller-driven permission poll. `tick` is cheap to call at any cadence;
/// the gate is only consulted once per interval, and not at all once
/// granted.
pub struct PermissionPoller<G> {
    gate: G,
    interval: Duration,
    granted: bool,
    last_poll: Option<Instant>,
}

impl<G: PermissionGate> PermissionPoller<G> {
    pub fn new(gate: G, tuning: &Tuning) -> Self {
        let granted = gate.is_granted();
        Self {
            gate,
            interval: tuning.permission_poll_interval,
            granted,
            last_poll: None,
        }
    }

    pub fn has_permission(&self) -> bool {
        self.granted
    }

    /// Re-check immediately, optionally prompting. Returns the fresh state.
    pub fn refresh(&mut self, prompt: bool) -> bool {
        self.granted = if prompt {
            self.gate.request()
        } else {
            self.gate.is_granted()
        };
        self.granted
    }

    /// Poll if due. Returns `Some(state)` only when the observed state
    /// changed, so callers can react to edges without tracking their own.
    pub fn tick(&mut self, now: Instant) -> Option<bool> {
        if self.granted {
            return None;
        }
        let due = match self.last_poll {
            None => true,
            Some(last) => now.duration_since(last) >= self.interval,
        };
        if !due {
            return None;
        }
        self.last_poll = Some(now);
        let granted = self.gate.is_granted();
        if granted != self.granted {
            self.granted = granted;
            Some(granted)
        } else {
            None
        }
    }
}

#[cfg(target_os = "macos")]
pub use system::{open_accessibility_settings, AxPermissionGate};

#[cfg(target_os = "macos")]
mod system {
    use super::PermissionGate;

    const ACCESSIBILITY_SETTINGS_URL: &str =
        "x-apple.systempreferences:com.apple.preference.security?Privacy_Accessibility";

    /// Gate over the accessibility trust database.
    pub struct AxPermissionGate;

    impl PermissionGate for AxPermissionGate {
        fn is_granted(&self) -> bool {
            unsafe { accessibility_sys::AXIsProcessTrusted() }
        }

        fn request(&self) -> bool {
            unsafe {
                use core_foundation::base::TCFType;
                use core_foundation::boolean::CFBoolean;
                use core_foundation::dictionary::CFDictionary;
                use core_foundation::string::CFString;

                let key =
                    CFString::wrap_under_get_rule(accessibility_sys::kAXTrustedCheckOptionPrompt);
                let options = CFDictionary::from_CFType_pairs(&[(key, CFBoolean::true_value())]);
                accessibility_sys::AXIsProcessTrustedWithOptions(options.as_concrete_TypeRef())
            }
        }
    }

    /// Take the user straight to the Accessibility pane.
    pub fn open_accessibility_settings() {
        let _ = std::process::Command::new("open")
            .arg(ACCESSIBILITY_SETTINGS_URL)
            .spawn();
    }
}
