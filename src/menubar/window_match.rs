//! Correlating accessibility items with their backing windows.
//!
//! The accessibility tree exposes no window handle, so the bridge to the
//! window server is spatial: enumerate the on-screen windows living in the
//! status-item layer, filter by owning process, and take the nearest one.
//! The resulting id lets synthetic events target the right window when
//! items overlap.

use crate::geometry::{Point, Rect};

/// The window-server layer status items are drawn in. A heuristic, not a
/// contract; an OS update that re-layers the bar breaks matching, and the
/// rest of the system must keep degrading gracefully when it does.
pub const STATUS_ITEM_LAYER: i32 = 25;

#[derive(Debug, Clone, PartialEq)]
pub struct ItemWindow {
    pub window_id: u32,
    pub frame: Rect,
    pub pid: i32,
}

/// Pick the window owned by `pid` whose origin is nearest `near`, requiring
/// the distance to be strictly under `tolerance`. Ties keep the first match
/// in enumeration order. `None` when nothing qualifies.
pub fn match_window(
    windows: &[ItemWindow],
    pid: i32,
    near: Point,
    tolerance: f64,
) -> Option<u32> {
    let mut best: Option<u32> = None;
    let mut best_distance = f64::INFINITY;
    for window in windows.iter().filter(|window| window.pid == pid) {
        let distance = window.frame.origin().distance_to(near);
        if distance < best_distance && distance < tolerance {
            best_distance = distance;
            best = Some(window.window_id);
        }
    }
    best
}

/// Enumerate the on-screen status-item windows, front to back.
#[cfg(target_os = "macos")]
pub fn status_item_windows() -> Vec<ItemWindow> {
    use core_foundation::base::{CFType, TCFType};
    use core_foundation::dictionary::CFDictionaryRef;
    use core_foundation::number::CFNumber;
    use core_foundation::string::CFString;
    use core_graphics::display::{
        kCGNullWindowID, kCGWindowListOptionOnScreenOnly, CGWindowListCopyWindowInfo,
    };

    let window_list =
        unsafe { CGWindowListCopyWindowInfo(kCGWindowListOptionOnScreenOnly, kCGNullWindowID) };
    if window_list.is_null() {
        return Vec::new();
    }

    let dicts: Vec<CFDictionaryRef> = unsafe {
        let count = core_foundation::array::CFArrayGetCount(window_list as _);
        (0..count)
            .map(|i| {
                core_foundation::array::CFArrayGetValueAtIndex(window_list as _, i)
                    as CFDictionaryRef
            })
            .collect()
    };

    let mut windows = Vec::new();
    for window_dict in dicts {
        let dict = unsafe {
            core_foundation::dictionary::CFDictionary::<CFString, CFType>::wrap_under_get_rule(
                window_dict,
            )
        };

        let number_field = |key: &str| -> Option<i32> {
            dict.find(CFString::new(key)).and_then(|value| {
                let number: CFNumber =
                    unsafe { CFNumber::wrap_under_get_rule(value.as_CFTypeRef() as _) };
                number.to_i32()
            })
        };

        let layer = match number_field("kCGWindowLayer") {
            Some(layer) => layer,
            None => continue,
        };
        if layer != STATUS_ITEM_LAYER {
            continue;
        }

        let window_id = match number_field("kCGWindowNumber") {
            Some(id) if id > 0 => id as u32,
            _ => continue,
        };
        let pid = match number_field("kCGWindowOwnerPID") {
            Some(pid) => pid,
            None => continue,
        };

        let frame = dict.find(CFString::new("kCGWindowBounds")).map(|value| {
            let bounds: core_foundation::dictionary::CFDictionary<CFString, CFNumber> = unsafe {
                core_foundation::dictionary::CFDictionary::wrap_under_get_rule(
                    value.as_CFTypeRef() as _,
                )
            };
            let field = |key: &str| -> f64 {
                bounds
                    .find(CFString::new(key))
                    .and_then(|n| n.to_f64())
                    .unwrap_or(0.0)
            };
            Rect::new(field("X"), field("Y"), field("Width"), field("Height"))
        });
        let frame = match frame {
            Some(frame) => frame,
            None => continue,
        };

        windows.push(ItemWindow {
            window_id,
            frame,
            pid,
        });
    }
    windows
}

#[cfg(not(target_os = "macos"))]
pub fn status_item_windows() -> Vec<ItemWindow> {
    Vec::new()
}

/// Window id for the status item owned by `pid` nearest an accessibility
/// position, within the given tolerance.
pub fn window_id_for(pid: i32, near: Point, tolerance: f64) -> Option<u32> {
    match_window(&status_item_windows(), pid, near, tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(id: u32, pid: i32, x: f64) -> ItemWindow {
        ItemWindow {
            window_id: id,
            frame: Rect::new(x, 0.0, 30.0, 24.0),
            pid,
        }
    }

    #[test]
    fn picks_nearest_window_of_owner() {
        let windows = vec![window(1, 10, 100.0), window(2, 10, 140.0), window(3, 20, 101.0)];
        let found = match_window(&windows, 10, Point::new(138.0, 0.0), 20.0);
        assert_eq!(found, Some(2));
    }

    #[test]
    fn tolerance_is_strict() {
        let windows = vec![window(1, 10, 100.0)];
        assert_eq!(
            match_window(&windows, 10, Point::new(120.0, 0.0), 20.0),
            None
        );
        assert_eq!(
            match_window(&windows, 10, Point::new(119.0, 0.0), 20.0),
            Some(1)
        );
    }

    #[test]
    fn foreign_pids_never_match() {
        let windows = vec![window(1, 99, 100.0)];
        assert_eq!(
            match_window(&windows, 10, Point::new(100.0, 0.0), 20.0),
            None
        );
    }

    #[test]
    fn ties_keep_first_in_enumeration_order() {
        let windows = vec![window(7, 10, 90.0), window(8, 10, 110.0)];
        // Equidistant from both origins.
        let found = match_window(&windows, 10, Point::new(100.0, 0.0), 20.0);
        assert_eq!(found, Some(7));
    }

    #[test]
    fn empty_enumeration_matches_nothing() {
        assert_eq!(match_window(&[], 10, Point::new(0.0, 0.0), 20.0), None);
    }
}
