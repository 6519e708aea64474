//! Window creation options.
//!
//! [`CreateWindowOptions`] is the typed request used from Rust.
//! [`CreateWindowRequest`] is its wire form, as received over IPC; its
//! placement kind is a free-form string that is validated on conversion.

use horizon_shell_core::{Point, Size, WindowDefaults, coord_from_f64};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::ShellError;
use crate::native::{NativeWindowId, WindowAttributes, WindowLevel};
use crate::window::placement::PlacementKind;
use crate::window::registry::WindowKey;

/// Placement offset and size override.
///
/// `x`/`y` shift the window away from its anchor corner. Supplying `x`
/// marks the window as anchored: it is created without a native parent
/// and never becomes modal.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bound {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl Bound {
    /// Offset only.
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// Add a size override.
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Whether this bound anchors the window.
    pub fn is_anchored(&self) -> bool {
        self.x.is_some()
    }

    /// Whether a width or height override is present.
    pub fn overrides_size(&self) -> bool {
        self.width.is_some() || self.height.is_some()
    }

    /// Offset from the anchor corner, zero where absent.
    pub fn offset(&self) -> Point {
        Point::new(px(self.x.unwrap_or(0.0)), px(self.y.unwrap_or(0.0)))
    }

    /// `own` with any overridden dimension replaced.
    pub fn size_or(&self, own: Size) -> Size {
        Size::new(
            self.width.map_or(own.width, px_extent),
            self.height.map_or(own.height, px_extent),
        )
    }
}

/// Round a wire coordinate to whole pixels, bounded to [`COORD_LIMIT`](horizon_shell_core::COORD_LIMIT).
pub(crate) fn px(v: f64) -> i32 {
    coord_from_f64(v)
}

/// Like [`px`], for widths and heights: never below one pixel.
pub(crate) fn px_extent(v: f64) -> i32 {
    px(v).max(1)
}

/// Reveal animation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimateSpec {
    /// Tick interval in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_y: Option<i32>,
}

/// Accepts an animate object, `true` (defaults) or `false` (disabled).
fn deserialize_animate<'de, D>(deserializer: D) -> Result<Option<AnimateSpec>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum AnimateSetting {
        Toggle(bool),
        Spec(AnimateSpec),
    }

    Ok(match Option::<AnimateSetting>::deserialize(deserializer)? {
        None | Some(AnimateSetting::Toggle(false)) => None,
        Some(AnimateSetting::Toggle(true)) => Some(AnimateSpec::default()),
        Some(AnimateSetting::Spec(spec)) => Some(spec),
    })
}

/// Native window options. Unset fields fall back to [`WindowDefaults`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub always_on_top: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_hide_menu_bar: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transparent: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resizable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimizable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximizable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fullscreenable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_taskbar: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focusable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_shadow: Option<bool>,
    /// Reveal animation. `false` disables it.
    #[serde(
        default,
        deserialize_with = "deserialize_animate",
        skip_serializing_if = "Option::is_none"
    )]
    pub animate: Option<AnimateSpec>,
    /// Registry key of the logical parent window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<WindowKey>,
    /// Options passed through to the backend untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WindowConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_parent(mut self, parent: impl Into<WindowKey>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_animate(mut self, animate: AnimateSpec) -> Self {
        self.animate = Some(animate);
        self
    }

    pub fn with_show(mut self, show: bool) -> Self {
        self.show = Some(show);
        self
    }

    /// Merge with `defaults` into native attributes.
    pub(crate) fn to_attributes(
        &self,
        defaults: &WindowDefaults,
        modal: bool,
        parent: Option<NativeWindowId>,
    ) -> WindowAttributes {
        let size = Size::new(
            self.width.map_or(defaults.default_width, px_extent),
            self.height.map_or(defaults.default_height, px_extent),
        );
        let base = WindowAttributes::default();
        let always_on_top = self.always_on_top.unwrap_or(defaults.always_on_top);

        WindowAttributes {
            title: self.title.clone(),
            size,
            visible: self.show.unwrap_or(defaults.show),
            level: if always_on_top { WindowLevel::Floating } else { WindowLevel::Normal },
            auto_hide_menu_bar: self.auto_hide_menu_bar.unwrap_or(defaults.auto_hide_menu_bar),
            closable: self.closable.unwrap_or(defaults.closable),
            frame: self.frame.unwrap_or(base.frame),
            transparent: self.transparent.unwrap_or(base.transparent),
            resizable: self.resizable.unwrap_or(base.resizable),
            movable: self.movable.unwrap_or(base.movable),
            minimizable: self.minimizable.unwrap_or(base.minimizable),
            maximizable: self.maximizable.unwrap_or(base.maximizable),
            fullscreenable: self.fullscreenable.unwrap_or(base.fullscreenable),
            skip_taskbar: self.skip_taskbar.unwrap_or(base.skip_taskbar),
            focusable: self.focusable.unwrap_or(base.focusable),
            has_shadow: self.has_shadow.unwrap_or(base.has_shadow),
            modal,
            parent,
            extra: self.extra.clone(),
        }
    }
}

/// Options for [`WindowRegistry::create_window`](crate::WindowRegistry::create_window).
#[derive(Debug, Clone, Default)]
pub struct CreateWindowOptions {
    /// Registry key. Reusing the key of a live window focuses it instead.
    pub id: Option<WindowKey>,
    /// Alias under which the window can also be looked up.
    pub export_name: Option<String>,
    pub window_config: WindowConfig,
    /// Placement kind; center when absent.
    pub kind: Option<PlacementKind>,
    pub bound: Option<Bound>,
    /// Front-end route to load.
    pub hash_route: Option<String>,
    /// Query parameters for the route.
    pub params: Option<Map<String, Value>>,
    /// Reposition this window whenever its reference window moves.
    pub follow_move: bool,
    /// Per-window override of the global link policy.
    pub open_links_external: Option<bool>,
}

impl CreateWindowOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<WindowKey>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_export_name(mut self, name: impl Into<String>) -> Self {
        self.export_name = Some(name.into());
        self
    }

    pub fn with_config(mut self, config: WindowConfig) -> Self {
        self.window_config = config;
        self
    }

    pub fn with_kind(mut self, kind: PlacementKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_bound(mut self, bound: Bound) -> Self {
        self.bound = Some(bound);
        self
    }

    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.hash_route = Some(route.into());
        self
    }

    pub fn with_params(mut self, params: Map<String, Value>) -> Self {
        self.params = Some(params);
        self
    }

    pub fn with_follow_move(mut self, follow: bool) -> Self {
        self.follow_move = follow;
        self
    }

    pub fn with_open_links_external(mut self, external: bool) -> Self {
        self.open_links_external = Some(external);
        self
    }
}

/// Wire form of [`CreateWindowOptions`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWindowRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub export_name: Option<String>,
    #[serde(default)]
    pub window_config: WindowConfig,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub bound: Option<Bound>,
    #[serde(default)]
    pub hash_route: Option<String>,
    #[serde(default)]
    pub params: Option<Map<String, Value>>,
    #[serde(default)]
    pub is_follow_move: Option<bool>,
    #[serde(default)]
    pub open_links_external: Option<bool>,
}

impl TryFrom<CreateWindowRequest> for CreateWindowOptions {
    type Error = ShellError;

    fn try_from(request: CreateWindowRequest) -> Result<Self, Self::Error> {
        let kind = request.kind.as_deref().map(str::parse).transpose()?;
        Ok(Self {
            id: request.id,
            export_name: request.export_name,
            window_config: request.window_config,
            kind,
            bound: request.bound,
            hash_route: request.hash_route,
            params: request.params,
            follow_move: request.is_follow_move.unwrap_or(false),
            open_links_external: request.open_links_external,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bound_helpers() {
        let bound = Bound::at(10.4, -3.6).with_size(200.0, 100.0);
        assert!(bound.is_anchored());
        assert!(bound.overrides_size());
        assert_eq!(bound.offset(), Point::new(10, -4));
        assert_eq!(bound.size_or(Size::new(1, 1)), Size::new(200, 100));

        let bound = Bound {
            y: Some(5.0),
            height: Some(40.0),
            ..Bound::default()
        };
        assert!(!bound.is_anchored());
        assert_eq!(bound.size_or(Size::new(300, 300)), Size::new(300, 40));
    }

    #[test]
    fn test_animate_accepts_bool_and_object() {
        let config: WindowConfig = serde_json::from_value(json!({ "animate": false })).unwrap();
        assert_eq!(config.animate, None);

        let config: WindowConfig = serde_json::from_value(json!({ "animate": true })).unwrap();
        assert_eq!(config.animate, Some(AnimateSpec::default()));

        let config: WindowConfig =
            serde_json::from_value(json!({ "animate": { "duration": 10, "offsetY": -20 } })).unwrap();
        assert_eq!(
            config.animate,
            Some(AnimateSpec {
                duration: Some(10),
                offset_x: None,
                offset_y: Some(-20),
            })
        );
    }

    #[test]
    fn test_unknown_config_keys_pass_through() {
        let config: WindowConfig =
            serde_json::from_value(json!({ "width": 300, "vibrancy": "sidebar" })).unwrap();
        assert_eq!(config.width, Some(300.0));
        assert_eq!(config.extra.get("vibrancy"), Some(&json!("sidebar")));
    }

    #[test]
    fn test_attributes_use_defaults() {
        let defaults = WindowDefaults::default();
        let attrs = WindowConfig::new().to_attributes(&defaults, false, None);
        assert_eq!(attrs.size, Size::new(900, 670));
        assert!(!attrs.visible);
        assert_eq!(attrs.level, WindowLevel::Floating);
        assert!(attrs.auto_hide_menu_bar);
        assert!(attrs.closable);

        let attrs = WindowConfig::new()
            .with_size(300.0, 200.0)
            .with_show(true)
            .to_attributes(&defaults, true, Some(NativeWindowId::new(1)));
        assert_eq!(attrs.size, Size::new(300, 200));
        assert!(attrs.visible);
        assert!(attrs.modal);
        assert_eq!(attrs.parent, Some(NativeWindowId::new(1)));
    }

    #[test]
    fn test_request_conversion() {
        let request: CreateWindowRequest = serde_json::from_value(json!({
            "id": "panel",
            "type": "right-top-out",
            "bound": { "x": 10, "y": 0 },
            "hashRoute": "panel",
            "isFollowMove": true,
        }))
        .unwrap();
        let options = CreateWindowOptions::try_from(request).unwrap();
        assert_eq!(options.kind, Some(PlacementKind::RightTopOut));
        assert!(options.follow_move);
        assert_eq!(options.bound, Some(Bound::at(10.0, 0.0)));
    }

    #[test]
    fn test_request_with_unknown_kind_fails() {
        let request: CreateWindowRequest =
            serde_json::from_value(json!({ "type": "upside-down" })).unwrap();
        let err = CreateWindowOptions::try_from(request).unwrap_err();
        assert!(matches!(err, ShellError::UnknownPlacement(_)));
    }
}
