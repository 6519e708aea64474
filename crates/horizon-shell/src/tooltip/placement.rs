//! Choosing where the tooltip goes.
//!
//! Candidates are tried in a fixed order derived from the preferred side.
//! Each is scored by how far it sticks out of the display's work area; the
//! first candidate that fits wins, otherwise the least-overflowing one.

use horizon_shell_core::{Rect, Size, coord_from_f64};

use crate::tooltip::payload::{AnchorRect, TooltipPlacement};

/// The winning candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementChoice {
    pub placement: TooltipPlacement,
    /// Unclamped candidate bounds.
    pub bounds: Rect,
    /// Total work-area overflow in pixels.
    pub overflow: i32,
}

/// Candidate order for a preferred side: the opposite side first, then the
/// other axis.
pub fn placement_order(preferred: TooltipPlacement) -> [TooltipPlacement; 4] {
    use TooltipPlacement::{Bottom, Left, Right, Top};
    match preferred {
        Top => [Top, Bottom, Right, Left],
        Bottom => [Bottom, Top, Right, Left],
        Right => [Right, Left, Top, Bottom],
        Left => [Left, Right, Top, Bottom],
    }
}

/// Round half up, the way the renderer rounds, bounded to [`COORD_LIMIT`](horizon_shell_core::COORD_LIMIT).
pub(crate) fn round_px(v: f64) -> i32 {
    coord_from_f64((v + 0.5).floor())
}

/// Bounds of a `size` tooltip on `placement` side of `anchor`, `offset`
/// pixels away. Top and bottom are centered horizontally on the anchor,
/// left and right vertically.
pub fn candidate_bounds(placement: TooltipPlacement, anchor: &AnchorRect, size: Size, offset: f64) -> Rect {
    let (cx, cy) = anchor.center();
    let (w, h) = (f64::from(size.width), f64::from(size.height));
    let (x, y) = match placement {
        TooltipPlacement::Top => (cx - w / 2.0, anchor.y - h - offset),
        TooltipPlacement::Bottom => (cx - w / 2.0, anchor.y + anchor.height + offset),
        TooltipPlacement::Left => (anchor.x - w - offset, cy - h / 2.0),
        TooltipPlacement::Right => (anchor.x + anchor.width + offset, cy - h / 2.0),
    };
    Rect::new(round_px(x), round_px(y), size.width, size.height)
}

/// Pick the best side for a tooltip of `size` next to `anchor` inside
/// `work_area`.
pub fn choose_placement(
    preferred: TooltipPlacement,
    anchor: &AnchorRect,
    size: Size,
    offset: f64,
    work_area: Rect,
) -> PlacementChoice {
    let mut best: Option<PlacementChoice> = None;
    for placement in placement_order(preferred) {
        let bounds = candidate_bounds(placement, anchor, size, offset);
        let overflow = work_area.overflow_of(&bounds);
        if best.is_none_or(|b| overflow < b.overflow) {
            best = Some(PlacementChoice {
                placement,
                bounds,
                overflow,
            });
            if overflow == 0 {
                break;
            }
        }
    }
    // The order is never empty.
    best.unwrap_or(PlacementChoice {
        placement: preferred,
        bounds: candidate_bounds(preferred, anchor, size, offset),
        overflow: i32::MAX,
    })
}
