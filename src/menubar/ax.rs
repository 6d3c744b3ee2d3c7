//! macOS accessibility-tree implementation of the inspector.
//!
//! Everything here talks to the AX API through raw CoreFoundation objects,
//! released via an RAII guard. Tree queries that error or time out resolve
//! to `None`; the callers upstream treat absence as "currently unavailable".

use std::collections::HashMap;
use std::ffi::c_void;

use accessibility_sys::{
    kAXChildrenAttribute, kAXDescriptionAttribute, kAXErrorSuccess, kAXHiddenAttribute,
    kAXMenuBarAttribute, kAXParentAttribute, kAXPositionAttribute, kAXPressAction,
    kAXRoleAttribute, kAXTitleAttribute,
    kAXValueTypeCGPoint, AXUIElementCopyAttributeValue, AXUIElementCopyElementAtPosition,
    AXUIElementCreateSystemWide, AXUIElementGetPid, AXUIElementIsAttributeSettable,
    AXUIElementPerformAction, AXUIElementRef, AXUIElementSetAttributeValue, AXValueCreate,
    AXValueGetType, AXValueGetValue,
};
use core_foundation::array::{CFArrayGetCount, CFArrayGetValueAtIndex};
use core_foundation::base::{CFGetTypeID, CFRelease, CFRetain, CFTypeRef, TCFType};
use core_foundation::boolean::CFBoolean;
use core_foundation::string::CFString;
use core_graphics::geometry::CGPoint;
use tracing::debug;

use crate::config::Tuning;
use crate::geometry::Point;
use crate::menubar::inspector::{matches_identity, MenuBarInspector};
use crate::menubar::types::{Capabilities, MenuBarItem, MenuBarRole};
use crate::menubar::window_match;

/// Owned CoreFoundation reference, released on drop.
struct CfGuard(*const c_void);

impl CfGuard {
    fn adopt(ptr: *const c_void) -> Option<Self> {
        (!ptr.is_null()).then_some(Self(ptr))
    }
}

impl Drop for CfGuard {
    fn drop(&mut self) {
        unsafe { CFRelease(self.0) }
    }
}

/// A retained accessibility node. Held only for the scope of an operation
/// or inside the advisory identity cache; never handed across the inspector
/// boundary.
struct AxNode(CfGuard);

impl AxNode {
    fn adopt(element: AXUIElementRef) -> Option<Self> {
        CfGuard::adopt(element as *const c_void).map(Self)
    }

    fn system_wide() -> Option<Self> {
        Self::adopt(unsafe { AXUIElementCreateSystemWide() })
    }

    fn as_ref(&self) -> AXUIElementRef {
        self.0 .0 as AXUIElementRef
    }

    fn retained(&self) -> Self {
        unsafe { CFRetain(self.0 .0) };
        Self(CfGuard(self.0 .0))
    }

    fn pid(&self) -> Option<i32> {
        let mut pid: i32 = 0;
        let result = unsafe { AXUIElementGetPid(self.as_ref(), &mut pid) };
        (result == kAXErrorSuccess && pid != 0).then_some(pid)
    }

    /// Raw attribute value, still retained.
    fn attribute(&self, name: &str) -> Option<CfGuard> {
        let attr = CFString::new(name);
        let mut value: CFTypeRef = std::ptr::null();
        let result = unsafe {
            AXUIElementCopyAttributeValue(self.as_ref(), attr.as_concrete_TypeRef(), &mut value)
        };
        if result != kAXErrorSuccess {
            return None;
        }
        CfGuard::adopt(value as *const c_void)
    }

    fn string_attribute(&self, name: &str) -> Option<String> {
        let guard = self.attribute(name)?;
        unsafe {
            if CFGetTypeID(guard.0 as _) != CFString::type_id() {
                return None;
            }
            let text = CFString::wrap_under_get_rule(guard.0 as _).to_string();
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
    }

    fn element_attribute(&self, name: &str) -> Option<AxNode> {
        self.attribute(name).map(|guard| AxNode(guard))
    }

    fn point_attribute(&self, name: &str) -> Option<Point> {
        let guard = self.attribute(name)?;
        let value = guard.0 as accessibility_sys::AXValueRef;
        unsafe {
            if AXValueGetType(value) != kAXValueTypeCGPoint {
                return None;
            }
            let mut point = CGPoint::new(0.0, 0.0);
            let ok = AXValueGetValue(
                value,
                kAXValueTypeCGPoint,
                (&mut point as *mut CGPoint).cast::<c_void>(),
            );
            ok.then(|| Point::new(point.x, point.y))
        }
    }

    fn children(&self) -> Vec<AxNode> {
        let Some(guard) = self.attribute(kAXChildrenAttribute) else {
            return Vec::new();
        };
        let mut nodes = Vec::new();
        unsafe {
            let count = CFArrayGetCount(guard.0 as _);
            for index in 0..count {
                let child = CFArrayGetValueAtIndex(guard.0 as _, index) as AXUIElementRef;
                if child.is_null() {
                    continue;
                }
                // The array owns its elements; retain before the guard drops.
                CFRetain(child as *const c_void);
                if let Some(node) = AxNode::adopt(child) {
                    nodes.push(node);
                }
            }
        }
        nodes
    }

    fn role(&self) -> Option<MenuBarRole> {
        self.string_attribute(kAXRoleAttribute)
            .and_then(|role| MenuBarRole::from_ax_role(&role))
    }

    fn is_attribute_settable(&self, name: &str) -> bool {
        let attr = CFString::new(name);
        let mut settable = false;
        let result = unsafe {
            AXUIElementIsAttributeSettable(
                self.as_ref(),
                attr.as_concrete_TypeRef(),
                &mut settable,
            )
        };
        result == kAXErrorSuccess && settable
    }

    fn set_attribute(&self, name: &str, value: CFTypeRef) -> bool {
        let attr = CFString::new(name);
        let result = unsafe {
            AXUIElementSetAttributeValue(self.as_ref(), attr.as_concrete_TypeRef(), value)
        };
        result == kAXErrorSuccess
    }

    fn press(&self) -> bool {
        let action = CFString::new(kAXPressAction);
        let result =
            unsafe { AXUIElementPerformAction(self.as_ref(), action.as_concrete_TypeRef()) };
        result == kAXErrorSuccess
    }
}

/// Inspector over the live accessibility tree.
///
/// Keeps an advisory identity→node cache so press/unhide can reach items
/// that were resolved earlier; every cached read is re-validated against
/// the live tree and a miss falls back to a fresh snapshot.
pub struct AxMenuBarInspector {
    system_wide: Option<AxNode>,
    capabilities: Capabilities,
    tuning: Tuning,
    cache: HashMap<String, AxNode>,
}

impl AxMenuBarInspector {
    pub fn new(tuning: Tuning) -> Self {
        let mut inspector = Self {
            system_wide: AxNode::system_wide(),
            capabilities: Capabilities::none(),
            tuning,
            cache: HashMap::new(),
        };
        inspector.capabilities = inspector.probe_capabilities();
        debug!(caps = ?inspector.capabilities, "accessibility inspector ready");
        inspector
    }

    /// Probe a sample item once for the optional mutate powers. No items on
    /// the bar (or no permission) probes as no capability; the flags are
    /// not re-examined later.
    fn probe_capabilities(&mut self) -> Capabilities {
        match self.menu_bar_nodes().into_iter().next() {
            Some(node) => Capabilities {
                can_set_hidden: node.is_attribute_settable(kAXHiddenAttribute),
                can_reposition: node.is_attribute_settable(kAXPositionAttribute),
            },
            None => Capabilities::none(),
        }
    }

    /// The menu bar's children, normalized to menu-bar items, in on-screen
    /// left-to-right order.
    fn menu_bar_nodes(&self) -> Vec<AxNode> {
        let Some(system_wide) = &self.system_wide else {
            return Vec::new();
        };
        let Some(menu_bar) = system_wide.element_attribute(kAXMenuBarAttribute) else {
            return Vec::new();
        };
        menu_bar
            .children()
            .into_iter()
            .filter_map(|child| self.normalize(child))
            .collect()
    }

    /// Walk upward from a hit-tested node until a menu-bar role appears.
    /// The walk is bounded; running past the bound is a miss, not an error.
    fn normalize(&self, node: AxNode) -> Option<AxNode> {
        let mut current = node;
        for _ in 0..=self.tuning.ancestor_walk_limit {
            if current.role().is_some() {
                return Some(current);
            }
            current = current.element_attribute(kAXParentAttribute)?;
        }
        None
    }

    /// Build the ephemeral item record for a normalized node and remember
    /// the node under the item's identity.
    fn make_item(&mut self, node: AxNode) -> Option<MenuBarItem> {
        let pid = node.pid()?;
        let (owner_app_id, app_name, icon_png) = owning_application(pid);

        let title = node
            .string_attribute(kAXTitleAttribute)
            .or_else(|| node.string_attribute(kAXDescriptionAttribute))
            .or(app_name);
        let position = node.point_attribute(kAXPositionAttribute);
        let window_id = position
            .and_then(|at| window_match::window_id_for(pid, at, self.tuning.window_match_tolerance));

        let item = MenuBarItem {
            owner_app_id,
            title,
            pid,
            position,
            window_id,
            icon_png,
        };
        self.cache.insert(item.identity(), node);
        Some(item)
    }

    /// A still-valid node for the item, from the cache when possible and
    /// from a fresh snapshot otherwise.
    fn resolve_node(&mut self, item: &MenuBarItem) -> Option<AxNode> {
        let identity = item.identity();
        if let Some(node) = self.cache.get(&identity) {
            if node.pid().is_some() {
                return Some(node.retained());
            }
            self.cache.remove(&identity);
        }
        // Snapshotting re-fills the cache for everything currently on the bar.
        let _ = self.snapshot_all();
        self.cache.get(&identity).map(AxNode::retained)
    }

    fn cache_lookup(&mut self, owner_key: &str, title: Option<&str>) -> Option<MenuBarItem> {
        let identity = match title {
            Some(title) => format!("{owner_key}:{title}"),
            None => owner_key.to_string(),
        };
        let node = self.cache.get(&identity)?.retained();
        let item = self.make_item(node)?;
        matches_identity(&item, owner_key, title).then_some(item)
    }
}

impl MenuBarInspector for AxMenuBarInspector {
    fn item_at(&mut self, point: Point) -> Option<MenuBarItem> {
        let system_wide = self.system_wide.as_ref()?;
        let mut element: AXUIElementRef = std::ptr::null_mut();
        let result = unsafe {
            AXUIElementCopyElementAtPosition(
                system_wide.as_ref(),
                point.x as f32,
                point.y as f32,
                &mut element,
            )
        };
        if result != kAXErrorSuccess {
            return None;
        }
        let node = AxNode::adopt(element)?;
        let normalized = self.normalize(node)?;
        self.make_item(normalized)
    }

    fn item_for(&mut self, owner_key: &str, title: Option<&str>) -> Option<MenuBarItem> {
        if let Some(item) = self.cache_lookup(owner_key, title) {
            return Some(item);
        }
        self.snapshot_all()
            .into_iter()
            .find(|item| matches_identity(item, owner_key, title))
    }

    fn snapshot_all(&mut self) -> Vec<MenuBarItem> {
        self.menu_bar_nodes()
            .into_iter()
            .filter_map(|node| self.make_item(node))
            .collect()
    }

    fn activate(&mut self, item: &MenuBarItem) -> bool {
        match self.resolve_node(item) {
            Some(node) => node.press(),
            None => false,
        }
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn set_hidden(&mut self, item: &MenuBarItem, hidden: bool) -> bool {
        let Some(node) = self.resolve_node(item) else {
            return false;
        };
        if !node.is_attribute_settable(kAXHiddenAttribute) {
            return false;
        }
        let value = if hidden {
            CFBoolean::true_value()
        } else {
            CFBoolean::false_value()
        };
        node.set_attribute(kAXHiddenAttribute, value.as_CFTypeRef())
    }

    fn set_position(&mut self, item: &MenuBarItem, point: Point) -> bool {
        let Some(node) = self.resolve_node(item) else {
            return false;
        };
        if !node.is_attribute_settable(kAXPositionAttribute) {
            return false;
        }
        let mut cg_point = CGPoint::new(point.x, point.y);
        let value = unsafe {
            AXValueCreate(
                kAXValueTypeCGPoint,
                (&mut cg_point as *mut CGPoint).cast::<c_void>(),
            )
        };
        let Some(guard) = CfGuard::adopt(value as *const c_void) else {
            return false;
        };
        node.set_attribute(kAXPositionAttribute, guard.0 as CFTypeRef)
    }
}

/// Owner metadata for a pid: bundle identifier, display name, and icon PNG.
/// Everything optional; a process the workspace cannot see yields nothing.
fn owning_application(pid: i32) -> (Option<String>, Option<String>, Option<Vec<u8>>) {
    use objc2_app_kit::NSRunningApplication;

    let Some(app) =
        (unsafe { NSRunningApplication::runningApplicationWithProcessIdentifier(pid) })
    else {
        return (None, None, None);
    };
    let bundle_id = unsafe { app.bundleIdentifier() }.map(|id| id.to_string());
    let name = unsafe { app.localizedName() }.map(|name| name.to_string());
    let icon = unsafe { app.icon() }.and_then(|image| png_data(&image));
    (bundle_id, name, icon)
}

/// Encode an AppKit image as PNG bytes via its bitmap representation.
fn png_data(image: &objc2_app_kit::NSImage) -> Option<Vec<u8>> {
    use objc2_app_kit::{NSBitmapImageFileType, NSBitmapImageRep};
    use objc2_foundation::NSDictionary;

    unsafe {
        let tiff = image.TIFFRepresentation()?;
        let rep = NSBitmapImageRep::imageRepWithData(&tiff)?;
        let png = rep.representationUsingType_properties(
            NSBitmapImageFileType::PNG,
            &NSDictionary::new(),
        )?;
        Some(png.to_vec())
    }
}
