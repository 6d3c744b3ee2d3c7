pub mod coordinator;
pub mod drag_detector;
pub mod inspector;
pub mod mover;
pub mod permissions;
pub mod separator;
pub mod types;
pub mod window_match;

#[cfg(target_os = "macos")]
pub mod ax;
#[cfg(target_os = "macos")]
pub mod input;
#[cfg(target_os = "macos")]
pub mod pointer_monitor;

pub use coordinator::{Coordinator, HideOutcome};
pub use drag_detector::{DragGestureDetector, DragSignal, PointerPhase, PointerSample};
pub use inspector::MenuBarInspector;
pub use mover::{InputSynthesizer, ItemMover, PointerStage};
pub use permissions::{PermissionGate, PermissionPoller};
pub use separator::{BoundaryState, SeparatorBoundary, StatusSlot};
pub use types::{Capabilities, MenuBarItem, MenuBarRole, MoveDestination};

#[cfg(target_os = "macos")]
pub use ax::AxMenuBarInspector;
#[cfg(target_os = "macos")]
pub use input::CgInputSynthesizer;
#[cfg(target_os = "macos")]
pub use permissions::{open_accessibility_settings, AxPermissionGate};
#[cfg(target_os = "macos")]
pub use pointer_monitor::PointerMonitor;
#[cfg(target_os = "macos")]
pub use separator::SystemStatusSlot;
