//! Barkeep core: hide menu-bar icons behind an invisible separator and put
//! them back, surviving restarts.
//!
//! The OS offers no API for moving another app's status item, so the core
//! works the way a user would: it finds items through the accessibility
//! tree ([`menubar::MenuBarInspector`]), correlates them with their windows
//! by owner and proximity ([`menubar::window_match`]), and drags them past a
//! separator status item with synthesized ⌘-drag events
//! ([`menubar::ItemMover`]). The separator's width partitions the bar:
//! expanded, everything to its left is pushed off the strip; collapsed,
//! the bar lays out normally ([`menubar::SeparatorBoundary`]).
//!
//! [`menubar::Coordinator`] orchestrates the four operations a host shell
//! calls (`hide`, `unhide`, `press`, and `reconcile_on_launch`) against
//! the persisted, ordered hidden-item collection in [`hidden_items`].
//! Physical effects are best-effort against a racy, permission-gated OS
//! surface; the logical bookkeeping always advances and is what persists.
//!
//! A host wires up: an inspector, a mover over an input synthesizer, a
//! separator over a status slot, the model over its store, plus a
//! [`menubar::DragGestureDetector`] fed from a global pointer monitor and a
//! [`menubar::PermissionPoller`] ticked while trust is missing. On macOS
//! the platform halves are `AxMenuBarInspector`, `CgInputSynthesizer`,
//! `SystemStatusSlot`, `PointerMonitor`, and `AxPermissionGate`; on other
//! targets only the portable core compiles, against whatever impls the
//! embedder provides.
//!
//! Single-threaded by design: queries, event synthesis, and model mutation
//! all happen on one coordinating thread, with the pointer feed and timers
//! as the only re-entry points. Nothing in this crate panics on platform
//! failure; every external surface degrades to `None`, `false`, or an
//! empty collection.

pub mod config;
pub mod geometry;
pub mod hidden_items;
pub mod menubar;

pub use config::Tuning;
pub use geometry::{Point, Rect};
pub use hidden_items::{HiddenItem, HiddenItemsModel, HiddenItemsStore};
pub use menubar::{
    BoundaryState, Capabilities, Coordinator, DragGestureDetector, DragSignal, HideOutcome,
    InputSynthesizer, ItemMover, MenuBarInspector, MenuBarItem, MoveDestination, PermissionGate,
    PermissionPoller, PointerPhase, PointerSample, PointerStage, SeparatorBoundary, StatusSlot,
};
