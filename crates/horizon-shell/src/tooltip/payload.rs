//! Tooltip wire types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Side of the anchor the tooltip appears on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TooltipPlacement {
    #[default]
    Top,
    Bottom,
    Left,
    Right,
}

/// How the tooltip reacts to the pointer leaving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TooltipBehavior {
    /// Hide shortly after the pointer leaves anchor and tooltip.
    #[default]
    Hover,
    /// Stay until explicitly closed; the tooltip accepts input.
    Manual,
}

/// Anchor rectangle relative to the content area of its window.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AnchorRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl AnchorRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// The same rectangle shifted by `(dx, dy)`.
    pub fn translated(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// A named renderer component with its props.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TooltipComponent {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Map<String, Value>>,
}

/// What the tooltip shows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TooltipContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<TooltipComponent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<f64>,
}

impl TooltipContent {
    /// Plain text content.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Whether there is anything to render.
    pub fn has_body(&self) -> bool {
        self.text.as_deref().is_some_and(|t| !t.is_empty())
            || self.html.as_deref().is_some_and(|h| !h.is_empty())
            || self.component.is_some()
    }
}

/// `tooltipShow` input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TooltipShow {
    pub id: String,
    pub anchor_rect: AnchorRect,
    pub content: TooltipContent,
    #[serde(default)]
    pub placement: Option<TooltipPlacement>,
    #[serde(default)]
    pub offset: Option<f64>,
    #[serde(default)]
    pub behavior: Option<TooltipBehavior>,
}

impl TooltipShow {
    pub fn new(id: impl Into<String>, anchor_rect: AnchorRect, content: TooltipContent) -> Self {
        Self {
            id: id.into(),
            anchor_rect,
            content,
            placement: None,
            offset: None,
            behavior: None,
        }
    }

    pub fn with_placement(mut self, placement: TooltipPlacement) -> Self {
        self.placement = Some(placement);
        self
    }

    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_behavior(mut self, behavior: TooltipBehavior) -> Self {
        self.behavior = Some(behavior);
        self
    }
}

/// `tooltipUpdateAnchorRect` input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TooltipAnchorUpdate {
    pub id: String,
    pub anchor_rect: AnchorRect,
}

/// `tooltipHide` / `tooltipClose` input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TooltipRef {
    pub id: String,
}

/// `tooltipSetPinned` input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TooltipPin {
    pub id: String,
    pub pinned: bool,
}

/// `tooltipReportSize` input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContentSize {
    pub width: f64,
    pub height: f64,
}

/// Payload of the `tooltip-set` message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TooltipSetPayload {
    pub id: String,
    pub content: TooltipContent,
    pub placement: TooltipPlacement,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behavior: Option<TooltipBehavior>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<f64>,
}
