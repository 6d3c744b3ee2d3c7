//! Screen geometry in the accessibility tree's coordinate space.
//!
//! Everything inside the core uses top-left-origin screen points, the space
//! the accessibility API reports positions in. AppKit hands out
//! bottom-left-origin frames; those are flipped at the platform edge with
//! [`Point::flipped_y`] / [`Rect::flipped_y`] before they enter the core.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Convert between bottom-left and top-left origin for a screen of the
    /// given height. The flip is its own inverse.
    pub fn flipped_y(self, screen_height: f64) -> Self {
        Self {
            x: self.x,
            y: screen_height - self.y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn min_x(&self) -> f64 {
        self.x
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn mid_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }

    /// Shrink the rect by `dx`/`dy` on each side. Negative values grow it,
    /// which is how the drag detector builds its anchor hit area.
    pub fn inset_by(&self, dx: f64, dy: f64) -> Rect {
        Rect {
            x: self.x + dx,
            y: self.y + dy,
            width: (self.width - 2.0 * dx).max(0.0),
            height: (self.height - 2.0 * dy).max(0.0),
        }
    }

    /// Convert a bottom-left-origin frame to top-left origin (or back) for a
    /// screen of the given height.
    pub fn flipped_y(&self, screen_height: f64) -> Rect {
        Rect {
            x: self.x,
            y: screen_height - self.y - self.height,
            width: self.width,
            height: self.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance_to(b) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn point_flip_round_trips() {
        let p = Point::new(10.0, 30.0);
        assert_eq!(p.flipped_y(900.0).flipped_y(900.0), p);
        assert_eq!(p.flipped_y(900.0).y, 870.0);
    }

    #[test]
    fn rect_flip_maps_menu_bar_to_top() {
        // A 24pt-tall bar at the top of a 900pt screen sits at cocoa y=876.
        let cocoa = Rect::new(100.0, 876.0, 200.0, 24.0);
        let flipped = cocoa.flipped_y(900.0);
        assert_eq!(flipped.y, 0.0);
        assert_eq!(flipped.flipped_y(900.0), cocoa);
    }

    #[test]
    fn contains_is_half_open() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains(Point::new(0.0, 0.0)));
        assert!(rect.contains(Point::new(9.9, 9.9)));
        assert!(!rect.contains(Point::new(10.0, 5.0)));
    }

    #[test]
    fn negative_inset_grows() {
        let rect = Rect::new(10.0, 10.0, 20.0, 10.0);
        let grown = rect.inset_by(-10.0, -6.0);
        assert_eq!(grown.x, 0.0);
        assert_eq!(grown.y, 4.0);
        assert_eq!(grown.width, 40.0);
        assert_eq!(grown.height, 22.0);
    }

    #[test]
    fn inset_clamps_at_zero() {
        let rect = Rect::new(0.0, 0.0, 4.0, 4.0);
        let shrunk = rect.inset_by(3.0, 3.0);
        assert_eq!(shrunk.width, 0.0);
        assert_eq!(shrunk.height, 0.0);
    }

    #[test]
    fn edges_and_midline() {
        let rect = Rect::new(50.0, 2.0, 30.0, 20.0);
        assert_eq!(rect.min_x(), 50.0);
        assert_eq!(rect.max_x(), 80.0);
        assert_eq!(rect.mid_y(), 12.0);
    }
}
