//! Native window capability.
//!
//! The registry and the tooltip manager drive windows only through the
//! [`NativeWindow`] trait and create them through a [`WindowFactory`]. The
//! host owns the event loop and feeds window events back in by
//! [`NativeWindowId`]; nothing here stores callbacks on the native object.

use std::collections::BTreeMap;
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use horizon_shell_core::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::NativeWindowError;

/// Platform window identifier, stable for the window's lifetime.
///
/// Serializes as a bare number so it can travel in IPC payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NativeWindowId(u64);

impl NativeWindowId {
    /// Wrap a raw platform id.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw platform id.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NativeWindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NativeWindowId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// Stacking level for always-on-top windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WindowLevel {
    /// Normal stacking.
    #[default]
    Normal,
    /// Above normal windows.
    Floating,
    /// Above everything, including full-screen windows.
    ScreenSaver,
}

impl WindowLevel {
    /// The level used for overlays that must float above other windows.
    ///
    /// macOS uses the floating level; elsewhere the screen-saver level is
    /// needed to stay above full-screen windows.
    pub fn overlay() -> Self {
        if cfg!(target_os = "macos") {
            Self::Floating
        } else {
            Self::ScreenSaver
        }
    }
}

/// Construction-time window attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowAttributes {
    pub title: Option<String>,
    pub size: Size,
    /// Show on creation.
    pub visible: bool,
    pub level: WindowLevel,
    pub auto_hide_menu_bar: bool,
    pub closable: bool,
    /// Draw the platform frame (title bar and borders).
    pub frame: bool,
    pub transparent: bool,
    pub resizable: bool,
    pub movable: bool,
    pub minimizable: bool,
    pub maximizable: bool,
    pub fullscreenable: bool,
    pub skip_taskbar: bool,
    pub focusable: bool,
    pub has_shadow: bool,
    pub modal: bool,
    /// Native parent window.
    pub parent: Option<NativeWindowId>,
    /// Options this shell does not interpret, passed through to the backend.
    pub extra: serde_json::Map<String, Value>,
}

impl Default for WindowAttributes {
    fn default() -> Self {
        Self {
            title: None,
            size: Size::new(800, 600),
            visible: true,
            level: WindowLevel::Normal,
            auto_hide_menu_bar: false,
            closable: true,
            frame: true,
            transparent: false,
            resizable: true,
            movable: true,
            minimizable: true,
            maximizable: true,
            fullscreenable: true,
            skip_taskbar: false,
            focusable: true,
            has_shadow: true,
            modal: false,
            parent: None,
            extra: serde_json::Map::new(),
        }
    }
}

/// What a window displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    /// The bundled front end at a hash route, with query parameters.
    Route {
        route: Option<String>,
        params: BTreeMap<String, String>,
    },
    /// An arbitrary URL.
    Url(String),
}

/// Entry document of the bundled front end.
const ENTRY_DOCUMENT: &str = "index.html";

impl ContentSource {
    /// A route without parameters.
    pub fn route(route: impl Into<String>) -> Self {
        Self::Route {
            route: Some(route.into()),
            params: BTreeMap::new(),
        }
    }

    /// A route with parameters taken from a JSON object.
    ///
    /// String values are used as-is, everything else by its JSON text.
    pub fn route_with_params(route: Option<String>, params: Option<&serde_json::Map<String, Value>>) -> Self {
        let params = params
            .map(|map| {
                map.iter()
                    .map(|(k, v)| {
                        let value = match v {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        };
                        (k.clone(), value)
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self::Route { route, params }
    }

    /// The location string handed to the backend's loader.
    pub fn location(&self) -> String {
        match self {
            Self::Url(url) => url.clone(),
            Self::Route { route, params } => {
                let mut location = format!("{ENTRY_DOCUMENT}#{}", route.as_deref().unwrap_or_default());
                if !params.is_empty() {
                    let query = url::form_urlencoded::Serializer::new(String::new())
                        .extend_pairs(params.iter())
                        .finish();
                    location.push('?');
                    location.push_str(&query);
                }
                location
            }
        }
    }
}

/// A platform window.
pub trait NativeWindow {
    /// Platform identifier.
    fn id(&self) -> NativeWindowId;

    /// Outer bounds in screen coordinates.
    fn bounds(&self) -> Rect;

    /// Move and resize.
    fn set_bounds(&mut self, bounds: Rect, animate: bool);

    /// Outer position in screen coordinates.
    fn position(&self) -> Point {
        self.bounds().origin()
    }

    /// Move without resizing.
    fn set_position(&mut self, position: Point, animate: bool);

    /// Bounds of the content area in screen coordinates.
    fn content_bounds(&self) -> Rect;

    /// Window opacity in `0.0..=1.0`.
    fn set_opacity(&mut self, opacity: f32);

    /// Show and focus.
    fn show(&mut self);

    /// Show without taking focus.
    fn show_inactive(&mut self) -> Result<(), NativeWindowError>;

    fn hide(&mut self);

    fn focus(&mut self);

    /// Destroy the window. Further calls are no-ops.
    fn destroy(&mut self);

    fn is_destroyed(&self) -> bool;

    fn is_visible(&self) -> bool;

    fn is_focused(&self) -> bool;

    fn is_fullscreen(&self) -> bool;

    fn set_always_on_top(&mut self, level: WindowLevel) -> Result<(), NativeWindowError>;

    fn set_focusable(&mut self, focusable: bool) -> Result<(), NativeWindowError>;

    /// Deliver a message to the window's renderer.
    fn send(&mut self, channel: &str, payload: &Value);

    /// Navigate the window to new content.
    fn load(&mut self, content: &ContentSource);

    /// Stop delivering this window's events to the host.
    fn detach_listeners(&mut self);
}

/// Creates native windows.
pub trait WindowFactory {
    fn create(&mut self, attributes: &WindowAttributes) -> Result<Box<dyn NativeWindow>, NativeWindowError>;
}

/// Read access to tracked windows by native id.
pub trait WindowLookup {
    fn window(&self, id: NativeWindowId) -> Option<&dyn NativeWindow>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_window_id_serializes_as_number() {
        let id = NativeWindowId::new(42);
        assert_eq!(serde_json::to_value(id).unwrap(), serde_json::json!(42));
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_native_window_id_parses_from_display_form() {
        let id: NativeWindowId = "42".parse().unwrap();
        assert_eq!(id, NativeWindowId::new(42));
        assert!("$$42".parse::<NativeWindowId>().is_err());
        assert!("main".parse::<NativeWindowId>().is_err());
    }

    #[test]
    fn test_route_location_without_params() {
        let content = ContentSource::route("settings");
        assert_eq!(content.location(), "index.html#settings");
    }

    #[test]
    fn test_route_location_encodes_params() {
        let params = serde_json::json!({ "name": "a b", "count": 3 });
        let content = ContentSource::route_with_params(Some("detail".into()), params.as_object());
        assert_eq!(content.location(), "index.html#detail?count=3&name=a+b");
    }

    #[test]
    fn test_url_location() {
        let content = ContentSource::Url("https://example.com/".into());
        assert_eq!(content.location(), "https://example.com/");
    }

    #[test]
    fn test_overlay_level() {
        let level = WindowLevel::overlay();
        if cfg!(target_os = "macos") {
            assert_eq!(level, WindowLevel::Floating);
        } else {
            assert_eq!(level, WindowLevel::ScreenSaver);
        }
    }
}
