//! The accessibility-tree boundary.
//!
//! One trait covers both inspector variants: the required query set every
//! platform provides, and an optional mutate set whose availability is
//! reported through [`Capabilities`] rather than through a distinct type.
//! Callers branch on the capability flags, never on the concrete impl.

use crate::geometry::Point;
use crate::menubar::types::{Capabilities, MenuBarItem};

/// Attribute-repositioned items are parked here, far past any screen edge.
const OFFSCREEN_X: f64 = -2000.0;

pub trait MenuBarInspector {
    /// Hit-test the menu-bar item at a top-left-origin screen point.
    /// Absence means "currently unavailable", never an error.
    fn item_at(&mut self, point: Point) -> Option<MenuBarItem>;

    /// Every menu-bar item, in on-screen left-to-right order. That order is
    /// authoritative; callers must not re-sort it.
    fn snapshot_all(&mut self) -> Vec<MenuBarItem>;

    /// Perform the platform's press action on the item. `false` when the
    /// item could not be reached.
    fn activate(&mut self, item: &MenuBarItem) -> bool;

    fn capabilities(&self) -> Capabilities;

    /// Resolve an item by identity. The default walks a fresh snapshot;
    /// impls with an identity cache may short-circuit, but a cache miss must
    /// fall back to the live tree.
    fn item_for(&mut self, owner_key: &str, title: Option<&str>) -> Option<MenuBarItem> {
        self.snapshot_all()
            .into_iter()
            .find(|item| matches_identity(item, owner_key, title))
    }

    /// Set the hidden attribute. Only meaningful when
    /// `capabilities().can_set_hidden`; the default has no such power.
    fn set_hidden(&mut self, _item: &MenuBarItem, _hidden: bool) -> bool {
        false
    }

    /// Set the position attribute. Only meaningful when
    /// `capabilities().can_reposition`.
    fn set_position(&mut self, _item: &MenuBarItem, _point: Point) -> bool {
        false
    }

    /// Attribute-based hide ladder: direct hidden attribute, else park the
    /// item off-screen. `false` when neither capability applies.
    fn hide_item(&mut self, item: &MenuBarItem) -> bool {
        if self.capabilities().can_set_hidden && self.set_hidden(item, true) {
            return true;
        }
        if self.capabilities().can_reposition {
            if let Some(position) = item.position {
                return self.set_position(item, Point::new(OFFSCREEN_X, position.y));
            }
        }
        false
    }

    /// Attribute-based show ladder: clear the hidden attribute, else restore
    /// the remembered position.
    fn show_item(&mut self, item: &MenuBarItem, restore: Option<Point>) -> bool {
        if self.capabilities().can_set_hidden && self.set_hidden(item, false) {
            return true;
        }
        match restore {
            Some(point) if self.capabilities().can_reposition => self.set_position(item, point),
            _ => false,
        }
    }
}

/// Identity match: same owner key, and the same title when the caller knows
/// one. A caller without a title takes the owner's first item in bar order.
pub fn matches_identity(item: &MenuBarItem, owner_key: &str, title: Option<&str>) -> bool {
    if item.owner_key() != owner_key {
        return false;
    }
    match title {
        Some(title) => item.title.as_deref() == Some(title),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(owner: &str, title: Option<&str>) -> MenuBarItem {
        MenuBarItem {
            owner_app_id: Some(owner.to_string()),
            title: title.map(str::to_string),
            pid: 1,
            position: Some(Point::new(100.0, 4.0)),
            window_id: None,
            icon_png: None,
        }
    }

    struct FixedInspector {
        items: Vec<MenuBarItem>,
        caps: Capabilities,
        hidden_calls: Vec<bool>,
        position_calls: Vec<Point>,
    }

    impl FixedInspector {
        fn new(items: Vec<MenuBarItem>, caps: Capabilities) -> Self {
            Self {
                items,
                caps,
                hidden_calls: Vec::new(),
                position_calls: Vec::new(),
            }
        }
    }

    impl MenuBarInspector for FixedInspector {
        fn item_at(&mut self, _point: Point) -> Option<MenuBarItem> {
            self.items.first().cloned()
        }

        fn snapshot_all(&mut self) -> Vec<MenuBarItem> {
            self.items.clone()
        }

        fn activate(&mut self, _item: &MenuBarItem) -> bool {
            true
        }

        fn capabilities(&self) -> Capabilities {
            self.caps
        }

        fn set_hidden(&mut self, _item: &MenuBarItem, hidden: bool) -> bool {
            self.hidden_calls.push(hidden);
            true
        }

        fn set_position(&mut self, _item: &MenuBarItem, point: Point) -> bool {
            self.position_calls.push(point);
            true
        }
    }

    #[test]
    fn item_for_matches_owner_and_title() {
        let mut inspector = FixedInspector::new(
            vec![item("com.a", Some("CPU")), item("com.a", Some("Net"))],
            Capabilities::none(),
        );
        let found = inspector.item_for("com.a", Some("Net")).unwrap();
        assert_eq!(found.title.as_deref(), Some("Net"));
        assert!(inspector.item_for("com.a", Some("Disk")).is_none());
        assert!(inspector.item_for("com.b", None).is_none());
    }

    #[test]
    fn item_for_without_title_takes_first_in_bar_order() {
        let mut inspector = FixedInspector::new(
            vec![item("com.a", Some("CPU")), item("com.a", Some("Net"))],
            Capabilities::none(),
        );
        let found = inspector.item_for("com.a", None).unwrap();
        assert_eq!(found.title.as_deref(), Some("CPU"));
    }

    #[test]
    fn hide_prefers_hidden_attribute() {
        let mut inspector = FixedInspector::new(
            vec![item("com.a", None)],
            Capabilities {
                can_set_hidden: true,
                can_reposition: true,
            },
        );
        let target = item("com.a", None);
        assert!(inspector.hide_item(&target));
        assert_eq!(inspector.hidden_calls, vec![true]);
        assert!(inspector.position_calls.is_empty());
    }

    #[test]
    fn hide_downgrades_to_offscreen_reposition() {
        let mut inspector = FixedInspector::new(
            vec![item("com.a", None)],
            Capabilities {
                can_set_hidden: false,
                can_reposition: true,
            },
        );
        let target = item("com.a", None);
        assert!(inspector.hide_item(&target));
        assert_eq!(inspector.position_calls, vec![Point::new(OFFSCREEN_X, 4.0)]);
    }

    #[test]
    fn hide_without_capability_does_nothing() {
        let mut inspector =
            FixedInspector::new(vec![item("com.a", None)], Capabilities::none());
        let target = item("com.a", None);
        assert!(!inspector.hide_item(&target));
        assert!(inspector.hidden_calls.is_empty());
        assert!(inspector.position_calls.is_empty());
    }

    #[test]
    fn show_restores_remembered_position() {
        let mut inspector = FixedInspector::new(
            vec![item("com.a", None)],
            Capabilities {
                can_set_hidden: false,
                can_reposition: true,
            },
        );
        let target = item("com.a", None);
        assert!(inspector.show_item(&target, Some(Point::new(900.0, 4.0))));
        assert_eq!(inspector.position_calls, vec![Point::new(900.0, 4.0)]);
        assert!(!inspector.show_item(&target, None));
    }
}
