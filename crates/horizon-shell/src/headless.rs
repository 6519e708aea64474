//! In-memory backend.
//!
//! Windows created by [`HeadlessFactory`] keep their state in shared cells
//! so that a [`HeadlessHandle`] can inspect and poke a window after the
//! registry has taken ownership of it. Used by the test suites and by hosts
//! that run without a display server.

use std::cell::RefCell;
use std::rc::Rc;

use horizon_shell_core::{Point, Rect};
use serde_json::Value;

use crate::display::{self, Display, DisplayQuery};
use crate::error::{DisplayError, NativeWindowError};
use crate::native::{
    ContentSource, NativeWindow, NativeWindowId, WindowAttributes, WindowFactory, WindowLevel,
};
use crate::opener::ExternalOpener;

#[derive(Debug, Clone)]
struct HeadlessState {
    attributes: WindowAttributes,
    bounds: Rect,
    /// Offset of the content area from the outer origin (title bar, border).
    content_inset: Point,
    opacity: f32,
    visible: bool,
    focused: bool,
    fullscreen: bool,
    destroyed: bool,
    listeners_attached: bool,
    level: WindowLevel,
    focusable: bool,
    sent: Vec<(String, Value)>,
    loaded: Vec<String>,
    show_count: usize,
    focus_count: usize,
}

/// A window that only records what is done to it.
#[derive(Debug)]
pub struct HeadlessWindow {
    id: NativeWindowId,
    state: Rc<RefCell<HeadlessState>>,
}

/// Shared view of a [`HeadlessWindow`].
#[derive(Debug, Clone)]
pub struct HeadlessHandle {
    id: NativeWindowId,
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessWindow {
    /// Create a window at the origin with the attributes' size.
    pub fn new(id: NativeWindowId, attributes: &WindowAttributes) -> (Self, HeadlessHandle) {
        let state = Rc::new(RefCell::new(HeadlessState {
            bounds: Rect::from_parts(Point::new(0, 0), attributes.size),
            content_inset: Point::new(0, 0),
            opacity: 1.0,
            visible: attributes.visible,
            focused: false,
            fullscreen: false,
            destroyed: false,
            listeners_attached: true,
            level: attributes.level,
            focusable: attributes.focusable,
            sent: Vec::new(),
            loaded: Vec::new(),
            show_count: usize::from(attributes.visible),
            focus_count: 0,
            attributes: attributes.clone(),
        }));
        let handle = HeadlessHandle {
            id,
            state: Rc::clone(&state),
        };
        (Self { id, state }, handle)
    }
}

impl NativeWindow for HeadlessWindow {
    fn id(&self) -> NativeWindowId {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.state.borrow().bounds
    }

    fn set_bounds(&mut self, bounds: Rect, _animate: bool) {
        self.state.borrow_mut().bounds = bounds;
    }

    fn set_position(&mut self, position: Point, _animate: bool) {
        let mut state = self.state.borrow_mut();
        state.bounds = state.bounds.with_origin(position);
    }

    fn content_bounds(&self) -> Rect {
        let state = self.state.borrow();
        let inset = state.content_inset;
        Rect::new(
            state.bounds.x.saturating_add(inset.x),
            state.bounds.y.saturating_add(inset.y),
            state.bounds.width.saturating_sub(inset.x),
            state.bounds.height.saturating_sub(inset.y),
        )
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.state.borrow_mut().opacity = opacity;
    }

    fn show(&mut self) {
        let mut state = self.state.borrow_mut();
        state.visible = true;
        state.show_count += 1;
        if state.focusable {
            state.focused = true;
        }
    }

    fn show_inactive(&mut self) -> Result<(), NativeWindowError> {
        let mut state = self.state.borrow_mut();
        state.visible = true;
        state.show_count += 1;
        Ok(())
    }

    fn hide(&mut self) {
        let mut state = self.state.borrow_mut();
        state.visible = false;
        state.focused = false;
    }

    fn focus(&mut self) {
        let mut state = self.state.borrow_mut();
        state.focus_count += 1;
        if state.focusable {
            state.focused = true;
        }
    }

    fn destroy(&mut self) {
        let mut state = self.state.borrow_mut();
        state.destroyed = true;
        state.visible = false;
        state.focused = false;
    }

    fn is_destroyed(&self) -> bool {
        self.state.borrow().destroyed
    }

    fn is_visible(&self) -> bool {
        self.state.borrow().visible
    }

    fn is_focused(&self) -> bool {
        self.state.borrow().focused
    }

    fn is_fullscreen(&self) -> bool {
        self.state.borrow().fullscreen
    }

    fn set_always_on_top(&mut self, level: WindowLevel) -> Result<(), NativeWindowError> {
        self.state.borrow_mut().level = level;
        Ok(())
    }

    fn set_focusable(&mut self, focusable: bool) -> Result<(), NativeWindowError> {
        self.state.borrow_mut().focusable = focusable;
        Ok(())
    }

    fn send(&mut self, channel: &str, payload: &Value) {
        self.state
            .borrow_mut()
            .sent
            .push((channel.to_string(), payload.clone()));
    }

    fn load(&mut self, content: &ContentSource) {
        self.state.borrow_mut().loaded.push(content.location());
    }

    fn detach_listeners(&mut self) {
        self.state.borrow_mut().listeners_attached = false;
    }
}

impl HeadlessHandle {
    pub fn id(&self) -> NativeWindowId {
        self.id
    }

    /// Attributes the window was created with.
    pub fn attributes(&self) -> WindowAttributes {
        self.state.borrow().attributes.clone()
    }

    pub fn bounds(&self) -> Rect {
        self.state.borrow().bounds
    }

    /// Move or resize the window as the user or the platform would.
    pub fn set_bounds_external(&self, bounds: Rect) {
        self.state.borrow_mut().bounds = bounds;
    }

    /// Offset the content area from the outer origin.
    pub fn set_content_inset(&self, inset: Point) {
        self.state.borrow_mut().content_inset = inset;
    }

    pub fn opacity(&self) -> f32 {
        self.state.borrow().opacity
    }

    pub fn is_visible(&self) -> bool {
        self.state.borrow().visible
    }

    pub fn is_focused(&self) -> bool {
        self.state.borrow().focused
    }

    pub fn set_focused(&self, focused: bool) {
        self.state.borrow_mut().focused = focused;
    }

    pub fn set_fullscreen(&self, fullscreen: bool) {
        self.state.borrow_mut().fullscreen = fullscreen;
    }

    pub fn is_destroyed(&self) -> bool {
        self.state.borrow().destroyed
    }

    /// Mark the window destroyed without going through the registry.
    pub fn simulate_destroyed(&self) {
        self.state.borrow_mut().destroyed = true;
    }

    pub fn listeners_attached(&self) -> bool {
        self.state.borrow().listeners_attached
    }

    pub fn level(&self) -> WindowLevel {
        self.state.borrow().level
    }

    pub fn is_focusable(&self) -> bool {
        self.state.borrow().focusable
    }

    /// Number of times the window was shown.
    pub fn show_count(&self) -> usize {
        self.state.borrow().show_count
    }

    /// Number of explicit focus requests.
    pub fn focus_count(&self) -> usize {
        self.state.borrow().focus_count
    }

    /// Every message sent to the renderer, in order.
    pub fn sent(&self) -> Vec<(String, Value)> {
        self.state.borrow().sent.clone()
    }

    /// Payloads sent on one channel, in order.
    pub fn sent_on(&self, channel: &str) -> Vec<Value> {
        self.state
            .borrow()
            .sent
            .iter()
            .filter(|(c, _)| c == channel)
            .map(|(_, payload)| payload.clone())
            .collect()
    }

    /// Locations loaded, in order.
    pub fn loaded(&self) -> Vec<String> {
        self.state.borrow().loaded.clone()
    }
}

/// Creates [`HeadlessWindow`]s with sequential ids starting at 1.
#[derive(Debug, Default)]
pub struct HeadlessFactory {
    next_id: u64,
    handles: Vec<HeadlessHandle>,
    fail_next: bool,
}

impl HeadlessFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next [`create`](WindowFactory::create) call fail.
    pub fn fail_next(&mut self) {
        self.fail_next = true;
    }

    /// Handles of every window created so far.
    pub fn handles(&self) -> &[HeadlessHandle] {
        &self.handles
    }

    /// Handle of the window with the given id.
    pub fn handle(&self, id: NativeWindowId) -> Option<&HeadlessHandle> {
        self.handles.iter().find(|h| h.id == id)
    }

    /// Handle of the most recently created window.
    pub fn last(&self) -> Option<&HeadlessHandle> {
        self.handles.last()
    }

    pub fn created_count(&self) -> usize {
        self.handles.len()
    }
}

impl WindowFactory for HeadlessFactory {
    fn create(&mut self, attributes: &WindowAttributes) -> Result<Box<dyn NativeWindow>, NativeWindowError> {
        if std::mem::take(&mut self.fail_next) {
            return Err(NativeWindowError::CreationFailed("headless failure requested".into()));
        }
        self.next_id += 1;
        let (window, handle) = HeadlessWindow::new(NativeWindowId::new(self.next_id), attributes);
        self.handles.push(handle);
        Ok(Box::new(window))
    }
}

/// A fixed set of displays.
#[derive(Debug, Clone, Default)]
pub struct StaticDisplays {
    displays: Vec<Display>,
}

impl StaticDisplays {
    pub fn new(displays: Vec<Display>) -> Self {
        Self { displays }
    }

    pub fn single(display: Display) -> Self {
        Self::new(vec![display])
    }
}

impl DisplayQuery for StaticDisplays {
    fn display_matching(&self, rect: Rect) -> Result<Display, DisplayError> {
        display::pick_matching(&self.displays, rect)
    }

    fn display_nearest_point(&self, point: Point) -> Result<Display, DisplayError> {
        display::pick_nearest(&self.displays, point)
    }
}

/// Records URLs instead of opening them. Clones share the record.
#[derive(Debug, Clone, Default)]
pub struct RecordingOpener {
    opened: Rc<RefCell<Vec<String>>>,
}

impl RecordingOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// URLs opened so far.
    pub fn opened(&self) -> Vec<String> {
        self.opened.borrow().clone()
    }
}

impl ExternalOpener for RecordingOpener {
    fn open_external(&self, url: &str) -> std::io::Result<()> {
        self.opened.borrow_mut().push(url.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_assigns_sequential_ids() {
        let mut factory = HeadlessFactory::new();
        let attrs = WindowAttributes::default();
        let a = factory.create(&attrs).unwrap();
        let b = factory.create(&attrs).unwrap();
        assert_eq!(a.id(), NativeWindowId::new(1));
        assert_eq!(b.id(), NativeWindowId::new(2));
        assert_eq!(factory.created_count(), 2);
    }

    #[test]
    fn test_handle_observes_window() {
        let mut factory = HeadlessFactory::new();
        let mut window = factory.create(&WindowAttributes::default()).unwrap();
        let handle = factory.last().unwrap().clone();

        window.set_position(Point::new(10, 20), false);
        window.send("ping", &serde_json::json!(1));
        window.destroy();

        assert_eq!(handle.bounds().origin(), Point::new(10, 20));
        assert_eq!(handle.sent_on("ping"), [serde_json::json!(1)]);
        assert!(handle.is_destroyed());
    }

    #[test]
    fn test_content_inset() {
        let mut factory = HeadlessFactory::new();
        let window = factory.create(&WindowAttributes::default()).unwrap();
        let handle = factory.last().unwrap().clone();
        handle.set_bounds_external(Rect::new(100, 100, 400, 300));
        handle.set_content_inset(Point::new(0, 28));
        assert_eq!(window.content_bounds(), Rect::new(100, 128, 400, 272));
    }

    #[test]
    fn test_fail_next() {
        let mut factory = HeadlessFactory::new();
        factory.fail_next();
        assert!(factory.create(&WindowAttributes::default()).is_err());
        assert!(factory.create(&WindowAttributes::default()).is_ok());
    }
}
