//! Display (monitor) queries.
//!
//! The shell never talks to the platform's screen API directly. It asks a
//! [`DisplayQuery`] for the display that best matches a rectangle or is
//! nearest to a point, and uses its bounds or work area for clamping.

use horizon_shell_core::{Point, Rect};

use crate::error::DisplayError;

/// A connected display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Display {
    /// Full display bounds.
    pub bounds: Rect,
    /// Usable area excluding taskbars, docks and menu bars.
    pub work_area: Rect,
}

impl Display {
    /// Create a display description.
    pub fn new(bounds: Rect, work_area: Rect) -> Self {
        Self { bounds, work_area }
    }
}

/// Screen query capability.
pub trait DisplayQuery {
    /// The display that most closely intersects `rect`.
    fn display_matching(&self, rect: Rect) -> Result<Display, DisplayError>;

    /// The display nearest to `point`.
    fn display_nearest_point(&self, point: Point) -> Result<Display, DisplayError>;
}

/// Pick the display with the largest overlap with `rect`, falling back to
/// the one nearest to its center.
pub fn pick_matching(displays: &[Display], rect: Rect) -> Result<Display, DisplayError> {
    let best = displays
        .iter()
        .map(|d| (overlap_area(&d.bounds, &rect), d))
        .filter(|(area, _)| *area > 0)
        .max_by_key(|(area, _)| *area)
        .map(|(_, d)| *d);

    match best {
        Some(display) => Ok(display),
        None => pick_nearest(displays, rect.center()),
    }
}

/// Pick the display containing `point`, or the one whose bounds are closest.
pub fn pick_nearest(displays: &[Display], point: Point) -> Result<Display, DisplayError> {
    displays
        .iter()
        .min_by_key(|d| distance_squared(&d.bounds, point))
        .copied()
        .ok_or(DisplayError::NoDisplays)
}

fn overlap_area(a: &Rect, b: &Rect) -> i64 {
    let w = (i64::from(a.right().min(b.right())) - i64::from(a.x.max(b.x))).max(0);
    let h = (i64::from(a.bottom().min(b.bottom())) - i64::from(a.y.max(b.y))).max(0);
    w.saturating_mul(h)
}

fn distance_squared(rect: &Rect, point: Point) -> i64 {
    let axis = |p: i32, lo: i32, hi: i32| -> i64 {
        let (p, lo, hi) = (i64::from(p), i64::from(lo), i64::from(hi));
        if p < lo {
            lo - p
        } else if p >= hi {
            p - hi + 1
        } else {
            0
        }
    };
    let dx = axis(point.x, rect.x, rect.right());
    let dy = axis(point.y, rect.y, rect.bottom());
    dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
}
