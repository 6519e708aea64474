//! winit-backed windows and monitors.
//!
//! winit owns the platform windows but not their web content. Messages and
//! content loads are forwarded over a channel as [`Outbound`] items for the
//! host's renderer layer to deliver.
//!
//! winit has no "ready to show" notification. Hosts report
//! [`WindowEvent::ReadyToShow`] themselves once a window's renderer has
//! painted its first frame.

use std::cell::RefCell;

use crossbeam_channel::Sender;
use horizon_shell_core::{Point, Rect, Size};
use serde_json::Value;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowButtons};

use crate::display::{self, Display, DisplayQuery};
use crate::error::{DisplayError, NativeWindowError};
use crate::event::WindowEvent;
use crate::native::{
    ContentSource, NativeWindow, NativeWindowId, WindowAttributes, WindowFactory, WindowLevel,
};

const TARGET: &str = "horizon_shell::backend";

/// Work for the renderer layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// Deliver `payload` to the renderer of `window` on `channel`.
    Message {
        window: NativeWindowId,
        channel: String,
        payload: Value,
    },
    /// Point the renderer of `window` at `location`.
    Load {
        window: NativeWindowId,
        location: String,
    },
}

fn native_id(window: &Window) -> NativeWindowId {
    NativeWindowId::new(u64::from(window.id()))
}

fn to_winit_level(level: WindowLevel) -> winit::window::WindowLevel {
    match level {
        WindowLevel::Normal => winit::window::WindowLevel::Normal,
        WindowLevel::Floating | WindowLevel::ScreenSaver => winit::window::WindowLevel::AlwaysOnTop,
    }
}

fn to_rect(position: PhysicalPosition<i32>, size: PhysicalSize<u32>) -> Rect {
    Rect::new(
        position.x,
        position.y,
        i32::try_from(size.width).unwrap_or(i32::MAX),
        i32::try_from(size.height).unwrap_or(i32::MAX),
    )
}

fn to_physical_size(size: Size) -> PhysicalSize<u32> {
    PhysicalSize::new(size.width.max(1) as u32, size.height.max(1) as u32)
}

/// A [`NativeWindow`] over a winit window.
#[derive(Debug)]
pub struct WinitWindow {
    id: NativeWindowId,
    window: Option<Window>,
    outbound: Sender<Outbound>,
}

impl WinitWindow {
    /// Wrap an existing winit window.
    pub fn new(window: Window, outbound: Sender<Outbound>) -> Self {
        Self {
            id: native_id(&window),
            window: Some(window),
            outbound,
        }
    }

    /// The underlying winit window, until destroyed.
    pub fn winit_window(&self) -> Option<&Window> {
        self.window.as_ref()
    }

    fn forward(&self, item: Outbound) {
        if self.outbound.send(item).is_err() {
            tracing::warn!(target: TARGET, window = %self.id, "renderer channel closed");
        }
    }
}

impl NativeWindow for WinitWindow {
    fn id(&self) -> NativeWindowId {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.window
            .as_ref()
            .map(|w| to_rect(w.outer_position().unwrap_or_default(), w.outer_size()))
            .unwrap_or_default()
    }

    fn set_bounds(&mut self, bounds: Rect, _animate: bool) {
        if let Some(window) = &self.window {
            window.set_outer_position(PhysicalPosition::new(bounds.x, bounds.y));
            let _ = window.request_inner_size(to_physical_size(bounds.size()));
        }
    }

    fn set_position(&mut self, position: Point, _animate: bool) {
        if let Some(window) = &self.window {
            window.set_outer_position(PhysicalPosition::new(position.x, position.y));
        }
    }

    fn content_bounds(&self) -> Rect {
        self.window
            .as_ref()
            .map(|w| to_rect(w.inner_position().unwrap_or_default(), w.inner_size()))
            .unwrap_or_default()
    }

    fn set_opacity(&mut self, opacity: f32) {
        // No window-level opacity in winit; the reveal degrades to a slide.
        tracing::trace!(target: TARGET, window = %self.id, opacity, "opacity ignored");
    }

    fn show(&mut self) {
        if let Some(window) = &self.window {
            window.set_visible(true);
            window.focus_window();
        }
    }

    fn show_inactive(&mut self) -> Result<(), NativeWindowError> {
        let window = self.window.as_ref().ok_or(NativeWindowError::Destroyed)?;
        window.set_visible(true);
        Ok(())
    }

    fn hide(&mut self) {
        if let Some(window) = &self.window {
            window.set_visible(false);
        }
    }

    fn focus(&mut self) {
        if let Some(window) = &self.window {
            window.focus_window();
        }
    }

    fn destroy(&mut self) {
        if self.window.take().is_some() {
            tracing::debug!(target: TARGET, window = %self.id, "winit window dropped");
        }
    }

    fn is_destroyed(&self) -> bool {
        self.window.is_none()
    }

    fn is_visible(&self) -> bool {
        self.window
            .as_ref()
            .and_then(|w| w.is_visible())
            .unwrap_or(false)
    }

    fn is_focused(&self) -> bool {
        self.window.as_ref().is_some_and(|w| w.has_focus())
    }

    fn is_fullscreen(&self) -> bool {
        self.window.as_ref().is_some_and(|w| w.fullscreen().is_some())
    }

    fn set_always_on_top(&mut self, level: WindowLevel) -> Result<(), NativeWindowError> {
        let window = self.window.as_ref().ok_or(NativeWindowError::Destroyed)?;
        window.set_window_level(to_winit_level(level));
        Ok(())
    }

    fn set_focusable(&mut self, _focusable: bool) -> Result<(), NativeWindowError> {
        Err(NativeWindowError::Unsupported("focusable"))
    }

    fn send(&mut self, channel: &str, payload: &Value) {
        if self.window.is_some() {
            self.forward(Outbound::Message {
                window: self.id,
                channel: channel.to_string(),
                payload: payload.clone(),
            });
        }
    }

    fn load(&mut self, content: &ContentSource) {
        if self.window.is_some() {
            self.forward(Outbound::Load {
                window: self.id,
                location: content.location(),
            });
        }
    }

    fn detach_listeners(&mut self) {}
}

/// Creates [`WinitWindow`]s inside a running event loop.
pub struct WinitFactory<'a> {
    event_loop: &'a ActiveEventLoop,
    outbound: Sender<Outbound>,
}

impl<'a> WinitFactory<'a> {
    /// This must be used from within the event loop (typically in
    /// `resumed()` or `window_event()`).
    pub fn new(event_loop: &'a ActiveEventLoop, outbound: Sender<Outbound>) -> Self {
        Self {
            event_loop,
            outbound,
        }
    }
}

impl WindowFactory for WinitFactory<'_> {
    fn create(&mut self, attributes: &WindowAttributes) -> Result<Box<dyn NativeWindow>, NativeWindowError> {
        let mut buttons = WindowButtons::empty();
        if attributes.closable {
            buttons |= WindowButtons::CLOSE;
        }
        if attributes.minimizable {
            buttons |= WindowButtons::MINIMIZE;
        }
        if attributes.maximizable {
            buttons |= WindowButtons::MAXIMIZE;
        }

        let mut attrs = Window::default_attributes()
            .with_inner_size(to_physical_size(attributes.size))
            .with_visible(attributes.visible)
            .with_decorations(attributes.frame)
            .with_transparent(attributes.transparent)
            .with_resizable(attributes.resizable)
            .with_window_level(to_winit_level(attributes.level))
            .with_active(attributes.focusable)
            .with_enabled_buttons(buttons);
        if let Some(title) = &attributes.title {
            attrs = attrs.with_title(title);
        }
        if attributes.parent.is_some() || attributes.modal {
            tracing::trace!(target: TARGET, modal = attributes.modal, "native parenting not applied");
        }

        let window = self
            .event_loop
            .create_window(attrs)
            .map_err(|e| NativeWindowError::CreationFailed(e.to_string()))?;
        Ok(Box::new(WinitWindow::new(window, self.outbound.clone())))
    }
}

/// Monitors reported by winit. winit exposes no work area, so the full
/// monitor bounds are used for both.
#[derive(Debug, Default)]
pub struct MonitorDisplays {
    displays: RefCell<Vec<Display>>,
}

impl MonitorDisplays {
    pub fn from_event_loop(event_loop: &ActiveEventLoop) -> Self {
        let displays = Self::default();
        displays.refresh(event_loop);
        displays
    }

    /// Re-read the monitor layout.
    pub fn refresh(&self, event_loop: &ActiveEventLoop) {
        let monitors: Vec<Display> = event_loop
            .available_monitors()
            .map(|m| {
                let bounds = to_rect(m.position(), m.size());
                Display::new(bounds, bounds)
            })
            .collect();
        tracing::debug!(target: TARGET, count = monitors.len(), "monitor layout refreshed");
        *self.displays.borrow_mut() = monitors;
    }
}

impl DisplayQuery for MonitorDisplays {
    fn display_matching(&self, rect: Rect) -> Result<Display, DisplayError> {
        display::pick_matching(&self.displays.borrow(), rect)
    }

    fn display_nearest_point(&self, point: Point) -> Result<Display, DisplayError> {
        display::pick_nearest(&self.displays.borrow(), point)
    }
}

/// Map a winit window event to the shell's event, if it has one.
pub fn translate_event(event: &winit::event::WindowEvent) -> Option<WindowEvent> {
    use winit::event::WindowEvent as W;

    match event {
        W::Moved(_) => Some(WindowEvent::Moved),
        W::Resized(_) => Some(WindowEvent::Resized),
        W::Focused(true) => Some(WindowEvent::Focused),
        W::Focused(false) => Some(WindowEvent::Blurred),
        W::Occluded(true) => Some(WindowEvent::Hidden),
        W::CloseRequested | W::Destroyed => Some(WindowEvent::Closed),
        _ => None,
    }
}
