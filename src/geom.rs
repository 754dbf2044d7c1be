use std::fmt;

use serde::{Deserialize, Serialize};

/// A point in screen coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned screen rectangle, edges inclusive for hit testing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Build a rect from a top-left origin plus width and height, the way
    /// view bounds come off the screen.
    pub fn from_origin_size(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            left: x,
            top: y,
            right: x + width,
            bottom: y + height,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Point-in-rect test, all four edges counted as inside.
    pub fn contains_point(&self, p: Point) -> bool {
        !(self.left > p.x || self.top > p.y || self.right < p.x || self.bottom < p.y)
    }

    /// True when `other` lies entirely within this rect.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.left <= other.left
            && self.top <= other.top
            && self.right >= other.right
            && self.bottom >= other.bottom
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}-{},{}", self.left, self.top, self.right, self.bottom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_point_edges_inclusive() {
        let r = Rect::new(10, 20, 110, 220);
        assert!(r.contains_point(Point::new(10, 20)));
        assert!(r.contains_point(Point::new(110, 220)));
        assert!(r.contains_point(Point::new(60, 100)));
        assert!(!r.contains_point(Point::new(9, 20)));
        assert!(!r.contains_point(Point::new(111, 100)));
    }

    #[test]
    fn test_contains_rect() {
        let outer = Rect::new(0, 0, 100, 100);
        assert!(outer.contains_rect(&Rect::new(10, 10, 90, 90)));
        assert!(outer.contains_rect(&outer));
        assert!(!outer.contains_rect(&Rect::new(10, 10, 101, 90)));
        assert!(!outer.contains_rect(&Rect::new(-1, 0, 50, 50)));
    }

    #[test]
    fn test_from_origin_size() {
        let r = Rect::from_origin_size(5, 6, 20, 30);
        assert_eq!(r, Rect::new(5, 6, 25, 36));
        assert_eq!(r.width(), 20);
        assert_eq!(r.height(), 30);
    }

    #[test]
    fn test_display() {
        assert_eq!(Rect::new(0, 0, 1080, 2400).to_string(), "0,0-1080,2400");
    }
}
