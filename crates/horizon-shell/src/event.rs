//! Events flowing into the shell and messages flowing out to renderers.

use serde::Serialize;

use crate::native::NativeWindowId;

/// A native window event delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowEvent {
    /// The first frame is ready; the window may be positioned and shown.
    ReadyToShow,
    Moved,
    Resized,
    Focused,
    Blurred,
    EnterFullScreen,
    LeaveFullScreen,
    Hidden,
    Minimized,
    /// The window is gone.
    Closed,
}

/// Renderer-bound channel names.
pub mod channels {
    /// A window lost focus. Broadcast to every window.
    pub const WINDOW_BLUR: &str = "window-blur";
    /// New tooltip content for the tooltip renderer.
    pub const TOOLTIP_SET: &str = "tooltip-set";
}

/// Payload of [`channels::WINDOW_BLUR`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowBlurPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash_route: Option<String>,
    pub id: NativeWindowId,
}
