//! Screen geometry primitives.
//!
//! All coordinates are integer screen pixels with the origin at the top-left
//! corner of the primary display. Widths and heights are signed so that
//! overflow and offset arithmetic never needs casts; a rectangle with a
//! negative extent is treated as empty.

use serde::{Deserialize, Serialize};

/// Largest coordinate or extent accepted from outside the process.
///
/// Keeps sums of two coordinates plus two extents inside `i32`.
pub const COORD_LIMIT: i32 = i32::MAX / 4;

/// Convert an untrusted floating-point coordinate to whole pixels, rounding
/// half away from zero and clamping to [`COORD_LIMIT`].
pub fn coord_from_f64(v: f64) -> i32 {
    let limit = f64::from(COORD_LIMIT);
    v.round().clamp(-limit, limit) as i32
}

/// A point in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
}

impl Point {
    /// Create a new point.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset this point by the given deltas.
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl Size {
    /// Create a new size.
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle.
///
/// This is the shape of window bounds, display work areas and anchor
/// rectangles alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    /// X position of the left edge.
    pub x: i32,
    /// Y position of the top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl Rect {
    /// Create a new rectangle.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from a position and a size.
    pub const fn from_parts(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    /// The top-left corner.
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// The extent of the rectangle.
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// X coordinate one past the right edge.
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Y coordinate one past the bottom edge.
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// The center point, rounded toward the top-left.
    pub const fn center(&self) -> Point {
        Point::new(
            self.x.saturating_add(self.width / 2),
            self.y.saturating_add(self.height / 2),
        )
    }

    /// Check whether the rectangle has no area.
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Check whether a point lies inside this rectangle.
    pub const fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Return a copy moved to the given position.
    pub const fn with_origin(self, origin: Point) -> Self {
        Self::new(origin.x, origin.y, self.width, self.height)
    }

    /// Return a copy with the given extent.
    pub const fn with_size(self, size: Size) -> Self {
        Self::new(self.x, self.y, size.width, size.height)
    }

    /// Return a copy translated by the given deltas.
    pub const fn translated(self, dx: i32, dy: i32) -> Self {
        Self::new(
            self.x.saturating_add(dx),
            self.y.saturating_add(dy),
            self.width,
            self.height,
        )
    }

    /// Total number of pixels by which `inner` sticks out of this rectangle,
    /// summed over all four sides.
    pub fn overflow_of(&self, inner: &Rect) -> i32 {
        let left = self.x.saturating_sub(inner.x).max(0);
        let top = self.y.saturating_sub(inner.y).max(0);
        let right = inner.right().saturating_sub(self.right()).max(0);
        let bottom = inner.bottom().saturating_sub(self.bottom()).max(0);
        left.saturating_add(top)
            .saturating_add(right)
            .saturating_add(bottom)
    }

    /// Move `inner` so that it lies within this rectangle where possible.
    ///
    /// When `inner` is larger than this rectangle the top-left edges win.
    pub fn clamp_inside(&self, inner: Rect) -> Rect {
        let x = clamp_low_wins(inner.x, self.x, self.right().saturating_sub(inner.width));
        let y = clamp_low_wins(inner.y, self.y, self.bottom().saturating_sub(inner.height));
        Rect::new(x, y, inner.width, inner.height)
    }
}

/// Clamp `value` into `[min, max]`, returning `min` when the range is inverted.
///
/// Unlike [`i32::clamp`] this never panics.
pub fn clamp_low_wins(value: i32, min: i32, max: i32) -> i32 {
    value.min(max).max(min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let rect = Rect::new(10, 20, 100, 50);
        assert_eq!(rect.right(), 110);
        assert_eq!(rect.bottom(), 70);
        assert_eq!(rect.center(), Point::new(60, 45));
        assert!(!rect.is_empty());
        assert!(Rect::new(0, 0, 0, 10).is_empty());
    }

    #[test]
    fn test_rect_contains() {
        let rect = Rect::new(0, 0, 10, 10);
        assert!(rect.contains(Point::new(0, 0)));
        assert!(rect.contains(Point::new(9, 9)));
        assert!(!rect.contains(Point::new(10, 5)));
    }

    #[test]
    fn test_overflow_of() {
        let work_area = Rect::new(0, 0, 1000, 800);
        assert_eq!(work_area.overflow_of(&Rect::new(10, 10, 100, 100)), 0);
        // 20 off the top, 30 off the right
        assert_eq!(work_area.overflow_of(&Rect::new(930, -20, 100, 50)), 50);
    }

    #[test]
    fn test_clamp_inside() {
        let work_area = Rect::new(0, 0, 1000, 800);
        let clamped = work_area.clamp_inside(Rect::new(950, -10, 100, 40));
        assert_eq!(clamped, Rect::new(900, 0, 100, 40));

        // Larger than the work area: top-left wins
        let clamped = work_area.clamp_inside(Rect::new(-50, 20, 1200, 40));
        assert_eq!(clamped.x, 0);
    }

    #[test]
    fn test_overflow_of_huge_rect_saturates() {
        let work_area = Rect::new(0, 0, 1000, 800);
        let huge = Rect::new(i32::MIN, i32::MIN, i32::MAX, i32::MAX);
        assert_eq!(work_area.overflow_of(&huge), i32::MAX);
        assert_eq!(Rect::new(i32::MAX, 0, 10, 10).right(), i32::MAX);
    }

    #[test]
    fn test_coord_from_f64_is_bounded() {
        assert_eq!(coord_from_f64(12.5), 13);
        assert_eq!(coord_from_f64(-2.4), -2);
        assert_eq!(coord_from_f64(3e9), COORD_LIMIT);
        assert_eq!(coord_from_f64(-1e300), -COORD_LIMIT);
    }

    #[test]
    fn test_clamp_low_wins_inverted_range() {
        assert_eq!(clamp_low_wins(5, 10, 0), 10);
        assert_eq!(clamp_low_wins(5, 0, 10), 5);
    }
}
