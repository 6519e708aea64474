//! Window placement kinds and anchoring math.
//!
//! A window is placed relative to a reference ("parent") rectangle. Inward
//! kinds put the window inside the parent against the named corner; outward
//! kinds put it beside the parent, on the far side of the named edge.
//! `bound.x` and `bound.y` shift the window away from that corner.

use std::fmt;
use std::str::FromStr;

use horizon_shell_core::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

use crate::error::ShellError;

/// Where a window sits relative to its reference window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlacementKind {
    /// Centered over the parent.
    #[default]
    Center,
    LeftTopIn,
    LeftTopOut,
    RightTopIn,
    RightTopOut,
    LeftBottomIn,
    LeftBottomOut,
    RightBottomIn,
    RightBottomOut,
}

impl PlacementKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Center,
        Self::LeftTopIn,
        Self::LeftTopOut,
        Self::RightTopIn,
        Self::RightTopOut,
        Self::LeftBottomIn,
        Self::LeftBottomOut,
        Self::RightBottomIn,
        Self::RightBottomOut,
    ];

    /// The kebab-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Center => "center",
            Self::LeftTopIn => "left-top-in",
            Self::LeftTopOut => "left-top-out",
            Self::RightTopIn => "right-top-in",
            Self::RightTopOut => "right-top-out",
            Self::LeftBottomIn => "left-bottom-in",
            Self::LeftBottomOut => "left-bottom-out",
            Self::RightBottomIn => "right-bottom-in",
            Self::RightBottomOut => "right-bottom-out",
        }
    }

    /// Outside the parent.
    pub fn is_outward(self) -> bool {
        matches!(
            self,
            Self::LeftTopOut | Self::RightTopOut | Self::LeftBottomOut | Self::RightBottomOut
        )
    }

    /// Inside the parent, against a corner.
    pub fn is_inward(self) -> bool {
        !self.is_outward() && self != Self::Center
    }

    /// Placed past the parent's right edge, so the display's right edge
    /// limits it.
    pub fn needs_display_clamp(self) -> bool {
        matches!(self, Self::RightTopOut | Self::RightBottomOut)
    }
}

impl fmt::Display for PlacementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlacementKind {
    type Err = ShellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ShellError::UnknownPlacement(s.to_string()))
    }
}

/// Compute the top-left corner for a window of `size` placed by `kind`
/// against `parent`.
///
/// `offset` is the caller's `bound.x`/`bound.y` (zero when absent).
/// `display_right` is the right edge of the display containing the window;
/// when it is `None` right-outward kinds are not clamped.
pub fn anchored_position(
    kind: PlacementKind,
    parent: Rect,
    size: Size,
    offset: Point,
    display_right: Option<i32>,
) -> Point {
    let (w, h) = (size.width, size.height);
    let (bx, by) = (offset.x, offset.y);
    let clamp_right = |x: i32| match display_right {
        Some(right) => x.min(right.saturating_sub(w)),
        None => x,
    };
    let left = parent.x.saturating_add(bx);
    let right = parent.right().saturating_sub(bx);
    let top = parent.y.saturating_add(by);
    let bottom = parent.bottom().saturating_sub(by);

    match kind {
        PlacementKind::Center => Point::new(
            floor0(parent.x.saturating_add(parent.width.saturating_sub(w) / 2)),
            floor0(parent.y.saturating_add(parent.height.saturating_sub(h) / 2)),
        ),
        PlacementKind::LeftTopIn => Point::new(left, top),
        PlacementKind::LeftTopOut => Point::new(floor0(left.saturating_sub(w)), top),
        PlacementKind::RightTopIn => Point::new(floor0(right.saturating_sub(w)), top),
        PlacementKind::RightTopOut => Point::new(clamp_right(right), top),
        PlacementKind::LeftBottomIn => Point::new(floor0(left), floor0(bottom.saturating_sub(h))),
        PlacementKind::LeftBottomOut => Point::new(floor0(left.saturating_sub(w)), floor0(bottom)),
        PlacementKind::RightBottomIn => Point::new(
            floor0(right.saturating_sub(w)),
            floor0(bottom.saturating_sub(h)),
        ),
        PlacementKind::RightBottomOut => Point::new(floor0(clamp_right(right)), floor0(bottom)),
    }
}

/// Resize `current` to the requested width/height while keeping the edge
/// that `kind` anchors against visually fixed.
///
/// Center windows grow around their center. Inward windows keep their
/// position. Outward windows grow leftwards, floored at 0, with
/// right-outward kinds also kept inside `display_right`. Their y never
/// changes: top variants share the parent's top edge and bottom variants
/// hang from its bottom edge.
pub fn resize_preserving_anchor(
    kind: PlacementKind,
    current: Rect,
    width: Option<i32>,
    height: Option<i32>,
    display_right: Option<i32>,
) -> Rect {
    let new_width = width.unwrap_or(current.width);
    let new_height = height.unwrap_or(current.height);
    let dw = new_width.saturating_sub(current.width);
    let dh = new_height.saturating_sub(current.height);

    let (x, y) = match kind {
        PlacementKind::Center => (
            current.x.saturating_sub(dw / 2),
            current.y.saturating_sub(dh / 2),
        ),
        k if k.is_inward() => (current.x, current.y),
        k => {
            let mut x = current.x.saturating_sub(dw);
            if k.needs_display_clamp()
                && let Some(right) = display_right
            {
                x = x.min(right.saturating_sub(new_width));
            }
            (floor0(x), current.y)
        }
    };

    Rect::new(x, y, new_width, new_height)
}

fn floor0(v: i32) -> i32 {
    v.max(0)
}
