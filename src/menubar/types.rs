use crate::geometry::{Point, Rect};

/// A live menu-bar item as resolved from the accessibility tree.
///
/// Ephemeral: rebuilt on every query and stale the moment the menu bar
/// re-lays-out. Carries no tree-node references; the inspector that produced
/// it keeps those for the duration of an operation and re-resolves on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuBarItem {
    /// Owning application's bundle identifier, when the OS can resolve one.
    pub owner_app_id: Option<String>,
    /// Label after the fallback chain: node title, node description, owning
    /// app's display name.
    pub title: Option<String>,
    pub pid: i32,
    /// Top-left-origin screen position. Items without one cannot be moved.
    pub position: Option<Point>,
    /// Backing window, when spatial correlation found one.
    pub window_id: Option<u32>,
    /// Owning app's icon as PNG bytes, for the hidden-list UI.
    pub icon_png: Option<Vec<u8>>,
}

impl MenuBarItem {
    /// Stable owner key: the bundle id, or `pid:<pid>` when the OS cannot
    /// name the owner.
    pub fn owner_key(&self) -> String {
        self.owner_app_id
            .clone()
            .unwrap_or_else(|| format!("pid:{}", self.pid))
    }

    /// Identity used for dedup and persistence. Compound with the title so
    /// two items of one app stay distinct.
    pub fn identity(&self) -> String {
        let owner = self.owner_key();
        match &self.title {
            Some(title) => format!("{owner}:{title}"),
            None => owner,
        }
    }
}

/// The closed set of accessibility roles that count as a menu-bar item.
/// Resolved once per lookup from the platform's role string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuBarRole {
    MenuBarItem,
    MenuExtra,
    StatusItem,
}

impl MenuBarRole {
    pub fn from_ax_role(role: &str) -> Option<Self> {
        match role {
            "AXMenuBarItem" => Some(Self::MenuBarItem),
            "AXMenuExtra" => Some(Self::MenuExtra),
            "AXStatusItem" => Some(Self::StatusItem),
            _ => None,
        }
    }
}

/// What the accessibility tree lets us do to items, probed once against a
/// sample item when the inspector is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// The hidden attribute is settable: items can be hidden directly.
    pub can_set_hidden: bool,
    /// The position attribute is settable: items can be repositioned.
    pub can_reposition: bool,
}

impl Capabilities {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn any(&self) -> bool {
        self.can_set_hidden || self.can_reposition
    }
}

/// Where a move should land an item, relative to the separator's frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveDestination {
    /// Into the hidden zone.
    LeftOf(Rect),
    /// Back into the visible zone.
    RightOf(Rect),
}

impl MoveDestination {
    /// The concrete pointer target, offset `margin` past the frame's edge on
    /// the separator's midline.
    pub fn target_point(&self, margin: f64) -> Point {
        match self {
            Self::LeftOf(frame) => Point::new(frame.min_x() - margin, frame.mid_y()),
            Self::RightOf(frame) => Point::new(frame.max_x() + margin, frame.mid_y()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(owner: Option<&str>, title: Option<&str>, pid: i32) -> MenuBarItem {
        MenuBarItem {
            owner_app_id: owner.map(str::to_string),
            title: title.map(str::to_string),
            pid,
            position: None,
            window_id: None,
            icon_png: None,
        }
    }

    #[test]
    fn identity_prefers_bundle_id() {
        assert_eq!(item(Some("com.a"), None, 7).identity(), "com.a");
    }

    #[test]
    fn identity_compounds_with_title() {
        assert_eq!(item(Some("com.a"), Some("CPU"), 7).identity(), "com.a:CPU");
    }

    #[test]
    fn identity_falls_back_to_pid() {
        assert_eq!(item(None, None, 4242).identity(), "pid:4242");
        assert_eq!(item(None, Some("CPU"), 4242).identity(), "pid:4242:CPU");
    }

    #[test]
    fn role_set_is_closed() {
        assert_eq!(
            MenuBarRole::from_ax_role("AXMenuBarItem"),
            Some(MenuBarRole::MenuBarItem)
        );
        assert_eq!(
            MenuBarRole::from_ax_role("AXMenuExtra"),
            Some(MenuBarRole::MenuExtra)
        );
        assert_eq!(
            MenuBarRole::from_ax_role("AXStatusItem"),
            Some(MenuBarRole::StatusItem)
        );
        assert_eq!(MenuBarRole::from_ax_role("AXButton"), None);
        assert_eq!(MenuBarRole::from_ax_role(""), None);
    }

    #[test]
    fn destination_offsets_past_frame() {
        let frame = Rect::new(1000.0, 0.0, 40.0, 24.0);
        let left = MoveDestination::LeftOf(frame).target_point(20.0);
        let right = MoveDestination::RightOf(frame).target_point(20.0);
        assert_eq!(left, Point::new(980.0, 12.0));
        assert_eq!(right, Point::new(1060.0, 12.0));
    }

    #[test]
    fn capabilities_any() {
        assert!(!Capabilities::none().any());
        assert!(Capabilities {
            can_set_hidden: true,
            can_reposition: false
        }
        .any());
    }
}
