//! Tooltip subsystem: one floating window shared by every content window.

mod manager;
pub mod payload;
pub mod placement;

pub use manager::{TooltipManager, TooltipPhase};
pub use payload::{
    AnchorRect, ContentSize, TooltipAnchorUpdate, TooltipBehavior, TooltipComponent, TooltipContent,
    TooltipPin, TooltipPlacement, TooltipRef, TooltipSetPayload, TooltipShow,
};
