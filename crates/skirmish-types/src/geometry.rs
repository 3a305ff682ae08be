//! Integer grid geometry.
//!
//! Positions are discrete cells on a bounded map. Distances are Euclidean
//! and computed in `f64`; coordinates themselves never leave `i32`.

use serde::{Deserialize, Serialize};

/// A cell on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    x: i32,
    y: i32,
}

impl Point {
    /// Create a point at `(x, y)`.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate.
    pub const fn x(self) -> i32 {
        self.x
    }

    /// Vertical coordinate.
    pub const fn y(self) -> i32 {
        self.y
    }

    /// Overwrite the horizontal coordinate.
    pub const fn set_x(&mut self, x: i32) {
        self.x = x;
    }

    /// Overwrite the vertical coordinate.
    pub const fn set_y(&mut self, y: i32) {
        self.y = y;
    }

    /// Euclidean distance to `other`.
    ///
    /// Symmetric, and zero only when both points are equal.
    pub fn distance_to(self, other: Self) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        dx.hypot(dy)
    }

    /// Shift by `(dx, dy)` and clamp into `[0, width-1] x [0, height-1]`.
    ///
    /// Out-of-range moves stop at the edge; they never wrap.
    pub fn offset_clamped(self, dx: i32, dy: i32, bounds: MapBounds) -> Self {
        let x = self.x.saturating_add(dx);
        let y = self.y.saturating_add(dy);
        Self::new(x, y).clamped(bounds)
    }

    /// Clamp into the map, keeping in-bounds points unchanged.
    pub fn clamped(self, bounds: MapBounds) -> Self {
        Self {
            x: self.x.clamp(0, bounds.max_x()),
            y: self.y.clamp(0, bounds.max_y()),
        }
    }
}

impl core::fmt::Display for Point {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Dimensions of the map. Valid cells are `[0, width-1] x [0, height-1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapBounds {
    width: u32,
    height: u32,
}

impl MapBounds {
    /// Create bounds of `width` by `height` cells.
    ///
    /// A zero dimension is widened to one cell so that clamping always has
    /// a valid target.
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width: if width == 0 { 1 } else { width },
            height: if height == 0 { 1 } else { height },
        }
    }

    /// Number of columns.
    pub const fn width(self) -> u32 {
        self.width
    }

    /// Number of rows.
    pub const fn height(self) -> u32 {
        self.height
    }

    /// Largest valid x coordinate.
    pub fn max_x(self) -> i32 {
        i32::try_from(self.width.saturating_sub(1)).unwrap_or(i32::MAX)
    }

    /// Largest valid y coordinate.
    pub fn max_y(self) -> i32 {
        i32::try_from(self.height.saturating_sub(1)).unwrap_or(i32::MAX)
    }

    /// Whether `point` lies on the map.
    pub fn contains(self, point: Point) -> bool {
        (0..=self.max_x()).contains(&point.x()) && (0..=self.max_y()).contains(&point.y())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_three_four_five() {
        let d = Point::new(0, 0).distance_to(Point::new(3, 4));
        assert!((d - 5.0).abs() < 1e-9);
    }

    #[test]
    fn distance_is_symmetric_and_zero_only_on_identity() {
        let a = Point::new(7, -2);
        let b = Point::new(-4, 9);
        assert!((a.distance_to(b) - b.distance_to(a)).abs() < f64::EPSILON);
        assert!(a.distance_to(a).abs() < f64::EPSILON);
        assert!(a.distance_to(b) > 0.0);
    }

    #[test]
    fn setters_replace_coordinates() {
        let mut p = Point::new(50, 50);
        p.set_x(75);
        p.set_y(25);
        assert_eq!(p, Point::new(75, 25));
    }

    #[test]
    fn offset_clamps_to_edges() {
        let bounds = MapBounds::new(100, 100);
        let p = Point::new(0, 0).offset_clamped(200, 200, bounds);
        assert_eq!(p, Point::new(99, 99));
        let q = Point::new(3, 3).offset_clamped(-10, -1, bounds);
        assert_eq!(q, Point::new(0, 2));
    }

    #[test]
    fn bounds_contain_only_valid_cells() {
        let bounds = MapBounds::new(50, 40);
        assert!(bounds.contains(Point::new(0, 0)));
        assert!(bounds.contains(Point::new(49, 39)));
        assert!(!bounds.contains(Point::new(50, 0)));
        assert!(!bounds.contains(Point::new(0, -1)));
    }

    #[test]
    fn zero_sized_bounds_widen_to_one_cell() {
        let bounds = MapBounds::new(0, 0);
        assert_eq!(Point::new(5, 5).clamped(bounds), Point::new(0, 0));
    }
}
