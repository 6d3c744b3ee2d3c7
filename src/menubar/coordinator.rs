//! Orchestration of hide / unhide / press / launch reconciliation.
//!
//! The coordinator ties the inspector, the mover, the separator, and the
//! hidden-item model together. One rule runs through every operation: the
//! physical side (attribute writes, synthetic drags) is best-effort against
//! a racy, privilege-gated OS surface, while the logical bookkeeping in the
//! model is authoritative and always advances. A capability-less
//! environment still remembers what the user asked for.

use std::thread;

use tracing::debug;

use crate::config::Tuning;
use crate::geometry::{Point, Rect};
use crate::hidden_items::{HiddenItem, HiddenItemsModel};
use crate::menubar::inspector::MenuBarInspector;
use crate::menubar::mover::{InputSynthesizer, ItemMover};
use crate::menubar::separator::{BoundaryState, SeparatorBoundary, StatusSlot};
use crate::menubar::types::{MenuBarItem, MoveDestination};

/// What `hide` did: the record it wrote, and whether the item also left the
/// visible strip physically.
#[derive(Debug, Clone, PartialEq)]
pub struct HideOutcome {
    pub id: String,
    pub physically_hidden: bool,
}

pub struct Coordinator<I, S, B> {
    inspector: I,
    mover: ItemMover<S>,
    boundary: SeparatorBoundary<B>,
    model: HiddenItemsModel,
    tuning: Tuning,
    /// Set the first time a synthetic move demonstrably works, never
    /// cleared: once the environment has proven a capability, keep using it.
    observed_reposition: bool,
}

impl<I, S, B> Coordinator<I, S, B>
where
    I: MenuBarInspector,
    S: InputSynthesizer,
    B: StatusSlot,
{
    pub fn new(
        inspector: I,
        mover: ItemMover<S>,
        boundary: SeparatorBoundary<B>,
        model: HiddenItemsModel,
        tuning: Tuning,
    ) -> Self {
        Self {
            inspector,
            mover,
            boundary,
            model,
            tuning,
            observed_reposition: false,
        }
    }

    pub fn items(&self) -> &[HiddenItem] {
        self.model.items()
    }

    pub fn boundary_state(&self) -> BoundaryState {
        self.boundary.state()
    }

    /// Whether this environment has any demonstrated way of physically
    /// hiding an item; hosts surface "limited mode" when it is false.
    pub fn can_physically_hide(&self) -> bool {
        self.inspector.capabilities().any() || self.observed_reposition
    }

    /// Reorder the hidden list (list-drop semantics) and persist.
    pub fn move_hidden_item(&mut self, from: usize, to: usize) {
        self.model.move_item(from, to);
    }

    /// Hide a live item: expand the boundary, try to put the item physically
    /// behind it, and record it in the model whatever the physical outcome.
    pub fn hide(&mut self, item: &MenuBarItem) -> HideOutcome {
        self.boundary.set_state(BoundaryState::Expanded);
        let frame = self.boundary.frame();
        let physically_hidden = self.physically_hide(item, frame);
        if !physically_hidden {
            debug!(id = %item.identity(), "physical hide unavailable, recording logically only");
        }
        let id = self.model.add_hidden_item(item);
        HideOutcome {
            id,
            physically_hidden,
        }
    }

    /// Resolve the item under a drag-start point and hide it. This is the
    /// drag detector's entry: the point is where the gesture began, so the
    /// carried item is resolved even though the cursor has long since moved.
    pub fn hide_at(&mut self, grab_point: Point) -> Option<HideOutcome> {
        let item = self.inspector.item_at(grab_point)?;
        Some(self.hide(&item))
    }

    /// Activate a hidden item even though it currently sits outside the
    /// visible strip: collapse the boundary so everything lays out
    /// on-screen, re-resolve, press, and re-expand once any menu has had
    /// time to appear. The visible flicker is deliberate and time-bounded.
    pub fn press(&mut self, id: &str) -> bool {
        let Some(record) = self.model.find(id).cloned() else {
            return false;
        };

        // Resolve before collapsing; if the re-resolution below fails this
        // stale handle is still worth a try.
        let before = self
            .inspector
            .item_for(&record.owner_app_id, record.title.as_deref());

        self.boundary.set_state(BoundaryState::Collapsed);
        thread::sleep(self.tuning.press_settle_delay);

        let fresh = self
            .inspector
            .item_for(&record.owner_app_id, record.title.as_deref());
        let activated = match fresh.or(before) {
            Some(item) => self.inspector.activate(&item),
            None => {
                debug!(id, "item not resolvable for press");
                false
            }
        };

        thread::sleep(self.tuning.press_menu_delay);
        self.boundary.set_state(BoundaryState::Expanded);
        activated
    }

    /// Stop tracking an item as hidden. The physical restore is attempted,
    /// but the record is removed and persisted unconditionally; the user's
    /// request is "forget this", not "move this".
    pub fn unhide(&mut self, id: &str) -> bool {
        let Some(record) = self.model.find(id).cloned() else {
            return false;
        };

        match self
            .inspector
            .item_for(&record.owner_app_id, record.title.as_deref())
        {
            Some(live) => {
                if !self.physically_show(&live, &record) {
                    debug!(id, "physical restore failed, removing record anyway");
                }
            }
            None => debug!(id, "item not resolvable for unhide"),
        }

        self.model.remove_hidden_item(id);
        true
    }

    /// Replay the persisted hidden set against the live menu bar. The OS
    /// does not remember cross-session placement, so every record is
    /// re-resolved and moved behind the boundary again. Items whose apps
    /// have not registered yet are skipped silently; they stay visible
    /// until the next hide.
    ///
    /// Returns how many items were physically re-hidden.
    pub fn reconcile_on_launch(&mut self) -> usize {
        if self.model.is_empty() {
            return 0;
        }

        // Other apps register their status items in no guaranteed order;
        // resolving too early would silently skip most of them.
        thread::sleep(self.tuning.launch_settle_delay);

        self.boundary.set_state(BoundaryState::Expanded);
        let frame = self.boundary.frame();

        let records = self.model.items().to_vec();
        let mut restored = 0;
        for record in &records {
            let Some(live) = self
                .inspector
                .item_for(&record.owner_app_id, record.title.as_deref())
            else {
                debug!(id = %record.id, "not on the bar yet, skipping");
                continue;
            };
            if self.physically_hide(&live, frame) {
                restored += 1;
            }
        }
        debug!(restored, total = records.len(), "launch reconciliation done");
        restored
    }

    /// The physical hide ladder: direct attribute write when the tree
    /// allows it, else the synthetic drag behind the boundary. A
    /// capability-less environment with no observed success attempts
    /// nothing.
    fn physically_hide(&mut self, item: &MenuBarItem, frame: Option<Rect>) -> bool {
        if self.inspector.hide_item(item) {
            return true;
        }
        if !self.may_move() {
            return false;
        }
        let Some(frame) = frame else {
            return false;
        };
        if self.mover.move_item(item, MoveDestination::LeftOf(frame)) {
            self.observed_reposition = true;
            return true;
        }
        false
    }

    fn physically_show(&mut self, item: &MenuBarItem, record: &HiddenItem) -> bool {
        if self.inspector.show_item(item, record.original_position) {
            return true;
        }
        if !self.may_move() {
            return false;
        }
        let Some(frame) = self.boundary.frame() else {
            return false;
        };
        if self.mover.move_item(item, MoveDestination::RightOf(frame)) {
            self.observed_reposition = true;
            return true;
        }
        false
    }

    fn may_move(&self) -> bool {
        self.inspector.capabilities().any() || self.observed_reposition
    }
}
