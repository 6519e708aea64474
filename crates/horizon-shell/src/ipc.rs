//! The shell facade and its IPC boundary.
//!
//! [`Shell`] owns the window registry and the tooltip manager, routes host
//! events to both and exposes every renderer-callable method through
//! [`Shell::invoke`], which decodes JSON arguments and encodes the JSON
//! result.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use std::time::Instant;

use horizon_shell_core::{Clock, ShellConfig, SystemClock};
use serde::de::{DeserializeOwned, Error as _};
use serde_json::{Value, json};

use crate::display::DisplayQuery;
use crate::error::{IpcError, Result};
use crate::event::WindowEvent;
use crate::native::{NativeWindowId, WindowFactory, WindowLookup};
use crate::opener::ExternalOpener;
use crate::tooltip::{
    ContentSize, TooltipAnchorUpdate, TooltipManager, TooltipPin, TooltipRef, TooltipShow,
};
use crate::window::{
    CreateWindowOptions, CreateWindowRequest, NavigationAction, UpdateWindowBounds, WindowKey,
    WindowRegistry,
};

/// Methods a renderer can invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpcChannel {
    CreateWindow,
    UpdateWindowBounds,
    GetOpenLinksExternal,
    UpdateOpenLinksExternal,
    GetCurrentWindowState,
    Ping,
    TooltipShow,
    TooltipUpdateAnchorRect,
    TooltipHide,
    TooltipClose,
    TooltipForceHide,
    TooltipReportSize,
    TooltipSetPinned,
    TooltipSetTooltipHovered,
    TooltipRendererReady,
}

impl IpcChannel {
    pub const ALL: [Self; 15] = [
        Self::CreateWindow,
        Self::UpdateWindowBounds,
        Self::GetOpenLinksExternal,
        Self::UpdateOpenLinksExternal,
        Self::GetCurrentWindowState,
        Self::Ping,
        Self::TooltipShow,
        Self::TooltipUpdateAnchorRect,
        Self::TooltipHide,
        Self::TooltipClose,
        Self::TooltipForceHide,
        Self::TooltipReportSize,
        Self::TooltipSetPinned,
        Self::TooltipSetTooltipHovered,
        Self::TooltipRendererReady,
    ];

    /// Channel name as used by renderers.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateWindow => "createWindow",
            Self::UpdateWindowBounds => "updateWindowBounds",
            Self::GetOpenLinksExternal => "getOpenLinksExternal",
            Self::UpdateOpenLinksExternal => "updateOpenLinksExternal",
            Self::GetCurrentWindowState => "getCurrentWindowState",
            Self::Ping => "ping",
            Self::TooltipShow => "tooltipShow",
            Self::TooltipUpdateAnchorRect => "tooltipUpdateAnchorRect",
            Self::TooltipHide => "tooltipHide",
            Self::TooltipClose => "tooltipClose",
            Self::TooltipForceHide => "tooltipForceHide",
            Self::TooltipReportSize => "tooltipReportSize",
            Self::TooltipSetPinned => "tooltipSetPinned",
            Self::TooltipSetTooltipHovered => "tooltipSetTooltipHovered",
            Self::TooltipRendererReady => "tooltipRendererReady",
        }
    }
}

impl fmt::Display for IpcChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IpcChannel {
    type Err = IpcError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| IpcError::UnknownChannel(s.to_string()))
    }
}

fn decode<T: DeserializeOwned>(channel: IpcChannel, payload: Value) -> std::result::Result<T, IpcError> {
    serde_json::from_value(payload).map_err(|source| IpcError::InvalidPayload {
        channel: channel.as_str(),
        source,
    })
}

/// The window registry and tooltip manager behind one event and IPC surface.
pub struct Shell {
    registry: WindowRegistry,
    tooltip: TooltipManager,
}

impl Shell {
    /// Create a shell running on the system clock.
    pub fn new(config: ShellConfig, displays: Rc<dyn DisplayQuery>, opener: Box<dyn ExternalOpener>) -> Self {
        Self::with_clock(config, Rc::new(SystemClock), displays, opener)
    }

    /// Create a shell with an explicit clock.
    pub fn with_clock(
        config: ShellConfig,
        clock: Rc<dyn Clock>,
        displays: Rc<dyn DisplayQuery>,
        opener: Box<dyn ExternalOpener>,
    ) -> Self {
        let ShellConfig { windows, tooltip } = config;
        Self {
            registry: WindowRegistry::new(windows, Rc::clone(&clock), Rc::clone(&displays), opener),
            tooltip: TooltipManager::new(tooltip, clock, displays),
        }
    }

    pub fn registry(&self) -> &WindowRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut WindowRegistry {
        &mut self.registry
    }

    pub fn tooltip(&self) -> &TooltipManager {
        &self.tooltip
    }

    pub fn tooltip_mut(&mut self) -> &mut TooltipManager {
        &mut self.tooltip
    }

    /// Create a window. See [`WindowRegistry::create_window`].
    pub fn create_window(
        &mut self,
        factory: &mut dyn WindowFactory,
        options: CreateWindowOptions,
    ) -> Result<WindowKey> {
        self.registry.create_window(factory, options)
    }

    /// Route a native window event.
    pub fn handle_window_event(&mut self, id: NativeWindowId, event: WindowEvent) {
        if self.tooltip.is_tooltip_window(id) {
            self.tooltip.handle_tooltip_window_event(event);
            return;
        }

        self.tooltip.handle_parent_event(&self.registry, id, event);

        let closes_main = event == WindowEvent::Closed
            && self
                .registry
                .main_window()
                .is_some_and(|main| self.registry.key_of(id) == Some(main));
        self.registry.handle_event(id, event);
        if closes_main {
            self.tooltip.destroy();
        }
    }

    /// Display layout or scale changed.
    pub fn handle_display_metrics_changed(&mut self) {
        self.tooltip.handle_display_metrics_changed(&self.registry);
    }

    /// See [`WindowRegistry::handle_open_request`].
    pub fn handle_open_request(&mut self, id: NativeWindowId, url: &str) -> NavigationAction {
        self.registry.handle_open_request(id, url)
    }

    /// See [`WindowRegistry::handle_will_navigate`].
    pub fn handle_will_navigate(&mut self, id: NativeWindowId, url: &str) -> NavigationAction {
        self.registry.handle_will_navigate(id, url)
    }

    /// Run every due timer.
    pub fn process_timers(&mut self) {
        self.registry.process_timers();
        self.tooltip.process_timers();
    }

    /// Earliest pending timer deadline across registry and tooltip.
    pub fn next_timer_deadline(&mut self) -> Option<Instant> {
        match (self.registry.next_timer_deadline(), self.tooltip.next_timer_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Destroy every window, including the tooltip window.
    pub fn destroy_all(&mut self) {
        self.tooltip.destroy();
        self.registry.destroy_all();
    }

    /// Dispatch a renderer call by channel name.
    ///
    /// `sender` is the window the call came from, when known.
    pub fn invoke(
        &mut self,
        factory: &mut dyn WindowFactory,
        sender: Option<NativeWindowId>,
        channel: &str,
        payload: Value,
    ) -> std::result::Result<Value, IpcError> {
        let channel: IpcChannel = channel.parse()?;
        tracing::trace!(target: "horizon_shell::ipc", %channel, ?sender, "ipc call");

        match channel {
            IpcChannel::CreateWindow => {
                let request: CreateWindowRequest = decode(channel, payload)?;
                let options = CreateWindowOptions::try_from(request)?;
                let key = self.registry.create_window(factory, options)?;
                Ok(Value::String(key))
            }
            IpcChannel::UpdateWindowBounds => {
                let request: UpdateWindowBounds = decode(channel, payload)?;
                Ok(Value::Bool(self.registry.update_window_bounds(&request)))
            }
            IpcChannel::GetOpenLinksExternal => Ok(Value::Bool(self.registry.open_links_external())),
            IpcChannel::UpdateOpenLinksExternal => {
                let external: bool = decode(channel, payload)?;
                self.registry.set_open_links_external(external);
                Ok(Value::Null)
            }
            IpcChannel::GetCurrentWindowState => {
                let full_screen = sender
                    .and_then(|id| self.registry.window(id))
                    .is_some_and(|w| w.is_fullscreen());
                Ok(json!({ "isFullScreen": full_screen }))
            }
            IpcChannel::Ping => {
                tracing::debug!(target: "horizon_shell::ipc", "pong");
                Ok(Value::Null)
            }
            IpcChannel::TooltipShow => {
                let params: TooltipShow = decode(channel, payload)?;
                if !params.content.has_body() {
                    return Err(IpcError::InvalidPayload {
                        channel: channel.as_str(),
                        source: serde_json::Error::custom(
                            "tooltip content must include text, html, or component",
                        ),
                    });
                }
                if let Some(sender) = sender {
                    self.tooltip.show(factory, &self.registry, sender, params);
                }
                Ok(Value::Null)
            }
            IpcChannel::TooltipUpdateAnchorRect => {
                let update: TooltipAnchorUpdate = decode(channel, payload)?;
                if let Some(sender) = sender {
                    self.tooltip.update_anchor_rect(&self.registry, sender, update);
                }
                Ok(Value::Null)
            }
            IpcChannel::TooltipHide => {
                let request: TooltipRef = decode(channel, payload)?;
                self.tooltip.hide_from_anchor_leave(&request);
                Ok(Value::Null)
            }
            IpcChannel::TooltipClose => {
                let request: TooltipRef = decode(channel, payload)?;
                self.tooltip.close(&request);
                Ok(Value::Null)
            }
            IpcChannel::TooltipForceHide => {
                self.tooltip.force_hide();
                Ok(Value::Null)
            }
            IpcChannel::TooltipReportSize => {
                let size: ContentSize = decode(channel, payload)?;
                self.tooltip.report_content_size(&self.registry, size);
                Ok(Value::Null)
            }
            IpcChannel::TooltipSetPinned => {
                let request: TooltipPin = decode(channel, payload)?;
                self.tooltip.set_pinned(&request);
                Ok(Value::Null)
            }
            IpcChannel::TooltipSetTooltipHovered => {
                let hovered: bool = decode(channel, payload)?;
                self.tooltip.set_tooltip_hovered(hovered);
                Ok(Value::Null)
            }
            IpcChannel::TooltipRendererReady => {
                if let Some(sender) = sender {
                    self.tooltip.on_renderer_ready(&self.registry, sender);
                }
                Ok(Value::Null)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_names_round_trip() {
        for channel in IpcChannel::ALL {
            assert_eq!(channel.as_str().parse::<IpcChannel>().unwrap(), channel);
        }
    }

    #[test]
    fn test_unknown_channel() {
        let err = "launchRockets".parse::<IpcChannel>().unwrap_err();
        assert!(matches!(err, IpcError::UnknownChannel(ref c) if c == "launchRockets"));
    }

    #[test]
    fn test_decode_reports_channel() {
        let err = decode::<bool>(IpcChannel::UpdateOpenLinksExternal, json!("yes")).unwrap_err();
        assert!(format!("{}", err).contains("updateOpenLinksExternal"));
    }
}
