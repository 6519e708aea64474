//! Window registry, placement and follow-move tracking.

pub mod follow;
pub mod navigation;
mod options;
pub mod placement;
mod registry;

pub use follow::FollowGraph;
pub use navigation::NavigationAction;
pub use options::{AnimateSpec, Bound, CreateWindowOptions, CreateWindowRequest, WindowConfig};
pub use placement::PlacementKind;
pub use registry::{
    BoundsUpdate, MAIN_WINDOW_KEY, TrackingInfo, UpdateWindowBounds, WindowKey, WindowRegistry,
    generated_key,
};
