//! The tooltip manager.
//!
//! One auxiliary window serves every tooltip in the application. Content
//! windows report hover and anchor changes; the manager decides when the
//! tooltip window is shown, where it goes and what it displays.
//!
//! The first tooltip has to wait for the auxiliary window's renderer to
//! load. Until it signals ready the payload stays queued, and the window is
//! only revealed after the renderer reports the measured content size so it
//! never visibly jumps from the default to the real size.

use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;
use std::time::Instant;

use horizon_shell_core::{Clock, Point, Size, TimerId, TimerManager, TooltipDefaults};

use crate::display::DisplayQuery;
use crate::event::{WindowEvent, channels};
use crate::native::{
    ContentSource, NativeWindow, NativeWindowId, WindowAttributes, WindowFactory, WindowLevel,
    WindowLookup,
};
use crate::tooltip::payload::{
    AnchorRect, ContentSize, TooltipAnchorUpdate, TooltipBehavior, TooltipPin, TooltipPlacement,
    TooltipRef, TooltipSetPayload, TooltipShow,
};
use crate::tooltip::placement::{self, round_px};

/// Front-end route rendered by the tooltip window.
const TOOLTIP_ROUTE: &str = "tooltip";

/// Observable state of the tooltip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooltipPhase {
    /// Nothing shown, nothing pending.
    Idle,
    /// Waiting for the tooltip renderer to finish loading.
    PendingRendererReady,
    /// Payload sent, waiting for the first size report before revealing.
    AwaitingFirstSize,
    Visible,
    /// The pointer left; the window hides when the grace period ends.
    ScheduledHide,
}

/// Whether a placement change during repositioning is pushed to the
/// renderer right away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlacementSync {
    /// Only update the queued payload; it is about to be sent anyway.
    Quiet,
    /// Re-send the payload so the renderer can turn its arrow.
    Notify,
}

/// Per-hover state. Reset when the tooltip is force-hidden or closed.
#[derive(Debug, Clone, Default)]
struct TooltipSession {
    current_id: Option<String>,
    parent: Option<NativeWindowId>,
    anchor: Option<AnchorRect>,
    payload: Option<TooltipSetPayload>,
    placement: TooltipPlacement,
    offset: f64,
    behavior: TooltipBehavior,
    pinned: bool,
    anchor_hovered: bool,
    tooltip_hovered: bool,
    pending_show: bool,
    awaiting_first_size: bool,
}

impl TooltipSession {
    fn matches(&self, id: &str) -> bool {
        self.current_id.as_deref() == Some(id)
    }

    /// Manual and pinned tooltips ignore hover loss and parent blur.
    fn is_sticky(&self) -> bool {
        self.pinned || self.behavior == TooltipBehavior::Manual
    }
}

/// Drives the single tooltip window.
pub struct TooltipManager {
    defaults: TooltipDefaults,
    clock: Rc<dyn Clock>,
    displays: Rc<dyn DisplayQuery>,
    window: Option<Box<dyn NativeWindow>>,
    session: TooltipSession,
    content_size: Size,
    renderer_ready: bool,
    attached_parents: HashSet<NativeWindowId>,
    timers: TimerManager,
    hide_timer: Option<TimerId>,
}

impl TooltipManager {
    pub fn new(defaults: TooltipDefaults, clock: Rc<dyn Clock>, displays: Rc<dyn DisplayQuery>) -> Self {
        let content_size = defaults.initial_content_size();
        Self {
            defaults,
            clock,
            displays,
            window: None,
            session: TooltipSession::default(),
            content_size,
            renderer_ready: false,
            attached_parents: HashSet::new(),
            timers: TimerManager::new(),
            hide_timer: None,
        }
    }

    // =========================================================================
    // State
    // =========================================================================

    /// Current phase, derived from the session flags.
    pub fn phase(&self) -> TooltipPhase {
        if self.hide_timer.is_some() {
            TooltipPhase::ScheduledHide
        } else if self.session.pending_show {
            TooltipPhase::PendingRendererReady
        } else if self.session.awaiting_first_size {
            TooltipPhase::AwaitingFirstSize
        } else if self.live_window().is_some_and(|w| w.is_visible()) {
            TooltipPhase::Visible
        } else {
            TooltipPhase::Idle
        }
    }

    /// Id of the tooltip currently shown or pending.
    pub fn current_id(&self) -> Option<&str> {
        self.session.current_id.as_deref()
    }

    /// Side the tooltip is currently placed on.
    pub fn placement(&self) -> TooltipPlacement {
        self.session.placement
    }

    pub fn is_pinned(&self) -> bool {
        self.session.pinned
    }

    pub fn behavior(&self) -> TooltipBehavior {
        self.session.behavior
    }

    /// Last reported content size.
    pub fn content_size(&self) -> Size {
        self.content_size
    }

    /// Whether the tooltip renderer has completed its handshake.
    pub fn is_renderer_ready(&self) -> bool {
        self.renderer_ready
    }

    /// Native id of the tooltip window, if it exists.
    pub fn window_id(&self) -> Option<NativeWindowId> {
        self.live_window().map(|w| w.id())
    }

    /// Whether `id` is the tooltip window.
    pub fn is_tooltip_window(&self, id: NativeWindowId) -> bool {
        self.window.as_ref().is_some_and(|w| w.id() == id)
    }

    /// When [`process_timers`](Self::process_timers) is next needed.
    pub fn next_timer_deadline(&mut self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    // =========================================================================
    // Requests from content windows
    // =========================================================================

    /// Show a tooltip for an anchor in `parent`.
    pub fn show(
        &mut self,
        factory: &mut dyn WindowFactory,
        lookup: &dyn WindowLookup,
        parent: NativeWindowId,
        params: TooltipShow,
    ) {
        let behavior = params.behavior.unwrap_or_default();
        let placement = params.placement.unwrap_or_default();
        let max_width = params.content.max_width.unwrap_or(self.defaults.default_max_width);
        let mut content = params.content;
        content.max_width = Some(max_width);

        let session = &mut self.session;
        session.current_id = Some(params.id.clone());
        session.parent = Some(parent);
        session.anchor = Some(params.anchor_rect);
        session.anchor_hovered = true;
        session.offset = params.offset.unwrap_or(self.defaults.default_offset);
        session.behavior = behavior;
        session.pinned = behavior == TooltipBehavior::Manual;
        session.placement = placement;
        session.payload = Some(TooltipSetPayload {
            id: params.id,
            content,
            placement,
            behavior: Some(behavior),
            max_width: Some(max_width),
        });

        self.cancel_hide();
        if !self.ensure_window(factory) {
            return;
        }
        self.apply_interactivity();
        self.attached_parents.insert(parent);

        if !self.renderer_ready {
            self.session.pending_show = true;
            self.session.awaiting_first_size = true;
            tracing::debug!(target: "horizon_shell::tooltip", id = ?self.session.current_id, "tooltip queued until renderer is ready");
            return;
        }

        let handshake = !self.live_window().is_some_and(|w| w.is_visible());
        self.session.awaiting_first_size = handshake;
        self.reposition(lookup, PlacementSync::Quiet);
        self.send_payload();
        if !handshake {
            self.show_window();
        }
        tracing::debug!(target: "horizon_shell::tooltip", id = ?self.session.current_id, handshake, "tooltip shown");
    }

    /// Move the anchor of the current tooltip.
    pub fn update_anchor_rect(
        &mut self,
        lookup: &dyn WindowLookup,
        parent: NativeWindowId,
        update: TooltipAnchorUpdate,
    ) {
        if !self.session.matches(&update.id) {
            return;
        }
        if self.session.parent.is_some_and(|p| p != parent) {
            return;
        }
        self.session.parent = Some(parent);
        self.session.anchor = Some(update.anchor_rect);
        self.reposition(lookup, PlacementSync::Notify);
    }

    /// The pointer left the anchor.
    pub fn hide_from_anchor_leave(&mut self, request: &TooltipRef) {
        if !self.session.matches(&request.id) || self.session.is_sticky() {
            return;
        }
        self.session.anchor_hovered = false;
        self.session.pending_show = false;
        self.session.awaiting_first_size = false;
        self.schedule_hide();
    }

    /// Close the current tooltip regardless of hover.
    pub fn close(&mut self, request: &TooltipRef) {
        if !self.session.matches(&request.id) {
            return;
        }
        self.force_hide();
    }

    /// Hide immediately and forget the session.
    pub fn force_hide(&mut self) {
        self.cancel_hide();
        self.session = TooltipSession::default();
        self.apply_interactivity();
        self.hide_window();
        tracing::debug!(target: "horizon_shell::tooltip", "tooltip force-hidden");
    }

    /// Pin or unpin the current tooltip.
    pub fn set_pinned(&mut self, request: &TooltipPin) {
        if !self.session.matches(&request.id) {
            return;
        }
        self.session.pinned = request.pinned;
        self.apply_interactivity();
    }

    /// The pointer entered or left the tooltip window itself.
    pub fn set_tooltip_hovered(&mut self, hovered: bool) {
        if self.session.current_id.is_none() {
            return;
        }
        self.session.tooltip_hovered = hovered;
        if hovered {
            self.cancel_hide();
        } else {
            self.schedule_hide();
        }
    }

    /// The tooltip renderer measured its content.
    pub fn report_content_size(&mut self, lookup: &dyn WindowLookup, size: ContentSize) {
        self.content_size = Size::new(round_px(size.width).max(1), round_px(size.height).max(1));
        self.reposition(lookup, PlacementSync::Notify);

        let session = &mut self.session;
        if session.awaiting_first_size && session.anchor_hovered && !session.pending_show {
            session.awaiting_first_size = false;
            self.show_window();
            tracing::debug!(target: "horizon_shell::tooltip", size = ?self.content_size, "tooltip revealed after first size report");
        }
    }

    /// The tooltip renderer finished loading.
    pub fn on_renderer_ready(&mut self, lookup: &dyn WindowLookup, from: NativeWindowId) {
        if self.live_window().is_none_or(|w| w.id() != from) {
            return;
        }
        self.renderer_ready = true;
        tracing::debug!(target: "horizon_shell::tooltip", "tooltip renderer ready");

        if self.session.payload.is_some() {
            self.reposition(lookup, PlacementSync::Quiet);
            self.send_payload();
        }
    }

    // =========================================================================
    // Host events
    // =========================================================================

    /// React to an event on a window that has shown a tooltip.
    pub fn handle_parent_event(&mut self, lookup: &dyn WindowLookup, id: NativeWindowId, event: WindowEvent) {
        if !self.attached_parents.contains(&id) {
            return;
        }
        match event {
            WindowEvent::Moved
            | WindowEvent::Resized
            | WindowEvent::EnterFullScreen
            | WindowEvent::LeaveFullScreen => self.reposition(lookup, PlacementSync::Notify),
            WindowEvent::Hidden | WindowEvent::Minimized => self.force_hide(),
            WindowEvent::Closed => {
                self.force_hide();
                self.attached_parents.remove(&id);
            }
            WindowEvent::Blurred => {
                if !self.session.is_sticky() {
                    self.force_hide();
                }
            }
            WindowEvent::ReadyToShow | WindowEvent::Focused => {}
        }
    }

    /// React to an event on the tooltip window itself.
    pub fn handle_tooltip_window_event(&mut self, event: WindowEvent) {
        if event == WindowEvent::Closed {
            self.window = None;
            self.renderer_ready = false;
            tracing::debug!(target: "horizon_shell::tooltip", "tooltip window closed");
        }
    }

    /// Display layout changed.
    pub fn handle_display_metrics_changed(&mut self, lookup: &dyn WindowLookup) {
        self.reposition(lookup, PlacementSync::Notify);
    }

    /// Run the hide timer if it is due.
    pub fn process_timers(&mut self) {
        let now = self.clock.now();
        for id in self.timers.process_expired(now) {
            if self.hide_timer != Some(id) {
                continue;
            }
            self.hide_timer = None;
            if !self.session.anchor_hovered && !self.session.tooltip_hovered {
                self.hide_window();
                tracing::trace!(target: "horizon_shell::tooltip", "tooltip hidden after grace period");
            }
        }
    }

    /// Hide and destroy the tooltip window.
    pub fn destroy(&mut self) {
        self.force_hide();
        if let Some(mut window) = self.window.take() {
            window.detach_listeners();
            if !window.is_destroyed() {
                window.destroy();
            }
        }
        self.renderer_ready = false;
        self.attached_parents.clear();
        self.timers.clear();
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn live_window(&self) -> Option<&dyn NativeWindow> {
        self.window.as_deref().filter(|w| !w.is_destroyed())
    }

    fn live_window_mut(&mut self) -> Option<&mut (dyn NativeWindow + 'static)> {
        self.window.as_deref_mut().filter(|w| !w.is_destroyed())
    }

    /// Create the tooltip window if needed. Returns `false` when it cannot
    /// be created.
    fn ensure_window(&mut self, factory: &mut dyn WindowFactory) -> bool {
        if self.live_window().is_some() {
            return true;
        }

        let attributes = WindowAttributes {
            title: None,
            size: self.defaults.window_size(),
            visible: false,
            level: WindowLevel::overlay(),
            auto_hide_menu_bar: true,
            closable: true,
            frame: false,
            transparent: true,
            resizable: false,
            movable: false,
            minimizable: false,
            maximizable: false,
            fullscreenable: false,
            skip_taskbar: true,
            focusable: false,
            has_shadow: false,
            modal: false,
            parent: None,
            extra: serde_json::Map::new(),
        };
        let mut window = match factory.create(&attributes) {
            Ok(window) => window,
            Err(err) => {
                tracing::warn!(target: "horizon_shell::tooltip", %err, "failed to create tooltip window");
                return false;
            }
        };

        if let Err(err) = window.set_always_on_top(attributes.level) {
            tracing::debug!(target: "horizon_shell::tooltip", %err, "overlay level rejected, using floating");
            let _ = window.set_always_on_top(WindowLevel::Floating);
        }

        let params = BTreeMap::from([
            ("__winId".to_string(), window.id().to_string()),
            ("__tooltip".to_string(), "1".to_string()),
        ]);
        window.load(&ContentSource::Route {
            route: Some(TOOLTIP_ROUTE.to_string()),
            params,
        });

        tracing::debug!(target: "horizon_shell::tooltip", id = %window.id(), "tooltip window created");
        self.renderer_ready = false;
        self.window = Some(window);
        true
    }

    fn apply_interactivity(&mut self) {
        let interactive = self.session.is_sticky();
        if let Some(window) = self.live_window_mut()
            && let Err(err) = window.set_focusable(interactive)
        {
            tracing::trace!(target: "horizon_shell::tooltip", %err, "focusable toggle unsupported");
        }
    }

    fn schedule_hide(&mut self) {
        let session = &self.session;
        if session.is_sticky() || session.anchor_hovered || session.tooltip_hovered {
            return;
        }
        if self.hide_timer.is_some() {
            return;
        }
        let id = self
            .timers
            .start_one_shot(self.clock.now(), self.defaults.hide_delay());
        self.hide_timer = Some(id);
    }

    fn cancel_hide(&mut self) {
        if let Some(id) = self.hide_timer.take() {
            let _ = self.timers.stop(id);
        }
    }

    /// Send the queued payload, completing a pending show.
    fn send_payload(&mut self) {
        if self.live_window().is_none() {
            return;
        }
        self.emit_payload();
        if self.session.pending_show {
            self.session.pending_show = false;
            self.session.awaiting_first_size = true;
        }
    }

    fn emit_payload(&mut self) {
        let Some(payload) = &self.session.payload else {
            return;
        };
        let value = match serde_json::to_value(payload) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(target: "horizon_shell::tooltip", %err, "failed to encode tooltip payload");
                return;
            }
        };
        if let Some(window) = self.live_window_mut() {
            window.send(channels::TOOLTIP_SET, &value);
        }
    }

    fn show_window(&mut self) {
        if let Some(window) = self.live_window_mut()
            && window.show_inactive().is_err()
        {
            window.show();
        }
    }

    fn hide_window(&mut self) {
        if let Some(window) = self.live_window_mut() {
            window.hide();
        }
    }

    /// Place the tooltip next to its anchor on the best side.
    fn reposition(&mut self, lookup: &dyn WindowLookup, sync: PlacementSync) {
        let (Some(parent_id), Some(anchor)) = (self.session.parent, self.session.anchor) else {
            return;
        };
        if self.live_window().is_none() {
            return;
        }
        let Some(parent) = lookup.window(parent_id).filter(|w| !w.is_destroyed()) else {
            return;
        };

        let content = parent.content_bounds();
        let anchor = anchor.translated(f64::from(content.x), f64::from(content.y));
        let (cx, cy) = anchor.center();
        let work_area = match self
            .displays
            .display_nearest_point(Point::new(round_px(cx), round_px(cy)))
        {
            Ok(display) => display.work_area,
            Err(err) => {
                tracing::warn!(target: "horizon_shell::tooltip", %err, "display lookup failed, skipping reposition");
                return;
            }
        };

        let choice = placement::choose_placement(
            self.session.placement,
            &anchor,
            self.content_size,
            self.session.offset,
            work_area,
        );

        if choice.placement != self.session.placement {
            tracing::debug!(
                target: "horizon_shell::tooltip",
                from = ?self.session.placement,
                to = ?choice.placement,
                "tooltip placement changed"
            );
            self.session.placement = choice.placement;
            if let Some(payload) = &mut self.session.payload {
                payload.placement = choice.placement;
                if sync == PlacementSync::Notify {
                    self.emit_payload();
                }
            }
        }

        let bounds = work_area.clamp_inside(choice.bounds);
        if let Some(window) = self.live_window_mut() {
            window.set_bounds(bounds, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::time::Duration;

    use horizon_shell_core::{ManualClock, Rect};

    use crate::display::Display;
    use crate::error::DisplayError;
    use crate::headless::{HeadlessFactory, HeadlessHandle, StaticDisplays};
    use crate::tooltip::payload::TooltipContent;

    /// A content window whose content area sits at (200, 200).
    struct Parent {
        window: Box<dyn NativeWindow>,
    }

    impl WindowLookup for Parent {
        fn window(&self, id: NativeWindowId) -> Option<&dyn NativeWindow> {
            (self.window.id() == id).then_some(&*self.window)
        }
    }

    struct Fixture {
        manager: TooltipManager,
        factory: HeadlessFactory,
        parent: Parent,
        parent_id: NativeWindowId,
        clock: ManualClock,
    }

    /// One display whose work area can change between calls.
    struct ShiftingDisplay {
        display: Cell<Display>,
    }

    impl DisplayQuery for ShiftingDisplay {
        fn display_matching(&self, _rect: Rect) -> Result<Display, DisplayError> {
            Ok(self.display.get())
        }

        fn display_nearest_point(&self, _point: Point) -> Result<Display, DisplayError> {
            Ok(self.display.get())
        }
    }

    impl Fixture {
        fn new() -> Self {
            Self::with_displays(Rc::new(StaticDisplays::single(Display::new(
                Rect::new(0, 0, 1024, 768),
                Rect::new(0, 0, 1024, 740),
            ))))
        }

        fn with_displays(displays: Rc<dyn DisplayQuery>) -> Self {
            let clock = ManualClock::new();
            let manager = TooltipManager::new(TooltipDefaults::default(), Rc::new(clock.clone()), displays);
            let mut factory = HeadlessFactory::new();
            let window = factory.create(&WindowAttributes::default()).unwrap();
            factory.last().unwrap().set_bounds_external(Rect::new(200, 200, 600, 400));
            let parent_id = window.id();
            Self {
                manager,
                factory,
                parent: Parent { window },
                parent_id,
                clock,
            }
        }

        fn show(&mut self, id: &str) {
            let params = TooltipShow::new(id, AnchorRect::new(10.0, 100.0, 50.0, 20.0), TooltipContent::text("hi"));
            self.manager.show(&mut self.factory, &self.parent, self.parent_id, params);
        }

        fn move_anchor(&mut self, id: &str, parent: NativeWindowId, anchor: AnchorRect) {
            let update = TooltipAnchorUpdate {
                id: id.into(),
                anchor_rect: anchor,
            };
            self.manager.update_anchor_rect(&self.parent, parent, update);
        }

        fn tooltip(&self) -> HeadlessHandle {
            self.factory.last().unwrap().clone()
        }

        /// Show, complete the handshake and reveal.
        fn show_visible(&mut self, id: &str) -> HeadlessHandle {
            self.show(id);
            let tooltip = self.tooltip();
            self.manager.on_renderer_ready(&self.parent, tooltip.id());
            self.manager
                .report_content_size(&self.parent, ContentSize { width: 120.0, height: 40.0 });
            tooltip
        }
    }

    #[test]
    fn test_first_show_waits_for_renderer() {
        let mut fx = Fixture::new();
        fx.show("t1");
        let tooltip = fx.tooltip();

        assert_eq!(fx.manager.phase(), TooltipPhase::PendingRendererReady);
        assert!(tooltip.sent().is_empty());
        assert!(!tooltip.is_visible());
        assert_eq!(
            tooltip.loaded().first().map(String::as_str),
            Some(format!("index.html#tooltip?__tooltip=1&__winId={}", tooltip.id()).as_str())
        );
        assert!(!tooltip.is_focusable());
    }

    #[test]
    fn test_ready_sends_and_size_reveals() {
        let mut fx = Fixture::new();
        fx.show("t1");
        let tooltip = fx.tooltip();

        fx.manager.on_renderer_ready(&fx.parent, tooltip.id());
        assert_eq!(fx.manager.phase(), TooltipPhase::AwaitingFirstSize);
        assert_eq!(tooltip.sent_on(channels::TOOLTIP_SET).len(), 1);
        assert!(!tooltip.is_visible());

        fx.manager
            .report_content_size(&fx.parent, ContentSize { width: 119.6, height: 0.2 });
        assert_eq!(fx.manager.content_size(), Size::new(120, 1));
        assert_eq!(fx.manager.phase(), TooltipPhase::Visible);
        assert_eq!(tooltip.show_count(), 1);
    }

    #[test]
    fn test_ready_from_other_window_is_ignored() {
        let mut fx = Fixture::new();
        fx.show("t1");
        fx.manager.on_renderer_ready(&fx.parent, fx.parent_id);
        assert!(!fx.manager.is_renderer_ready());
        assert_eq!(fx.manager.phase(), TooltipPhase::PendingRendererReady);
    }

    #[test]
    fn test_hide_grace_period() {
        let mut fx = Fixture::new();
        let tooltip = fx.show_visible("t1");

        fx.manager.hide_from_anchor_leave(&TooltipRef { id: "t1".into() });
        assert_eq!(fx.manager.phase(), TooltipPhase::ScheduledHide);

        fx.clock.advance(Duration::from_millis(119));
        fx.manager.process_timers();
        assert!(tooltip.is_visible());

        fx.clock.advance(Duration::from_millis(1));
        fx.manager.process_timers();
        assert!(!tooltip.is_visible());
        assert_eq!(fx.manager.phase(), TooltipPhase::Idle);
    }

    #[test]
    fn test_reentry_cancels_hide() {
        let mut fx = Fixture::new();
        let tooltip = fx.show_visible("t1");

        fx.manager.hide_from_anchor_leave(&TooltipRef { id: "t1".into() });
        fx.clock.advance(Duration::from_millis(60));
        fx.manager.set_tooltip_hovered(true);
        assert_eq!(fx.manager.phase(), TooltipPhase::Visible);

        fx.clock.advance(Duration::from_millis(500));
        fx.manager.process_timers();
        assert!(tooltip.is_visible());

        fx.manager.set_tooltip_hovered(false);
        fx.clock.advance(Duration::from_millis(120));
        fx.manager.process_timers();
        assert!(!tooltip.is_visible());
    }

    #[test]
    fn test_stale_ids_are_dropped() {
        let mut fx = Fixture::new();
        let tooltip = fx.show_visible("t2");

        fx.manager.hide_from_anchor_leave(&TooltipRef { id: "t1".into() });
        assert_eq!(fx.manager.phase(), TooltipPhase::Visible);
        assert_eq!(fx.manager.next_timer_deadline(), None);

        fx.manager.close(&TooltipRef { id: "t1".into() });
        fx.manager.set_pinned(&TooltipPin { id: "t1".into(), pinned: true });
        assert!(tooltip.is_visible());
        assert!(!fx.manager.is_pinned());
    }

    #[test]
    fn test_manual_behavior_is_sticky_and_interactive() {
        let mut fx = Fixture::new();
        let params = TooltipShow::new("m1", AnchorRect::new(10.0, 100.0, 50.0, 20.0), TooltipContent::text("ok?"))
            .with_behavior(TooltipBehavior::Manual);
        fx.manager.show(&mut fx.factory, &fx.parent, fx.parent_id, params);
        let tooltip = fx.tooltip();
        assert!(fx.manager.is_pinned());
        assert!(tooltip.is_focusable());

        fx.manager.handle_parent_event(&fx.parent, fx.parent_id, WindowEvent::Blurred);
        fx.manager.hide_from_anchor_leave(&TooltipRef { id: "m1".into() });
        assert_eq!(fx.manager.current_id(), Some("m1"));

        fx.manager.close(&TooltipRef { id: "m1".into() });
        assert_eq!(fx.manager.current_id(), None);
        assert!(!tooltip.is_focusable());
    }

    #[test]
    fn test_pin_toggles_focusable() {
        let mut fx = Fixture::new();
        let tooltip = fx.show_visible("t1");
        fx.manager.set_pinned(&TooltipPin { id: "t1".into(), pinned: true });
        assert!(tooltip.is_focusable());
        fx.manager.set_pinned(&TooltipPin { id: "t1".into(), pinned: false });
        assert!(!tooltip.is_focusable());
    }

    #[test]
    fn test_parent_blur_force_hides_hover_tooltip() {
        let mut fx = Fixture::new();
        let tooltip = fx.show_visible("t1");
        fx.manager.handle_parent_event(&fx.parent, fx.parent_id, WindowEvent::Blurred);
        assert!(!tooltip.is_visible());
        assert_eq!(fx.manager.current_id(), None);
    }

    #[test]
    fn test_parent_move_repositions() {
        let mut fx = Fixture::new();
        let tooltip = fx.show_visible("t1");
        let before = tooltip.bounds();

        fx.factory.handles()[0].set_bounds_external(Rect::new(300, 250, 600, 400));
        fx.manager.handle_parent_event(&fx.parent, fx.parent_id, WindowEvent::Moved);
        assert_eq!(tooltip.bounds(), before.translated(100, 50));
    }

    #[test]
    fn test_tooltip_bounds_above_anchor() {
        let mut fx = Fixture::new();
        let tooltip = fx.show_visible("t1");
        // anchor on screen: (210, 300, 50, 20), centered at x = 235
        assert_eq!(tooltip.bounds(), Rect::new(175, 250, 120, 40));
        assert_eq!(fx.manager.placement(), TooltipPlacement::Top);
    }

    #[test]
    fn test_tooltip_window_closed_resets_handshake() {
        let mut fx = Fixture::new();
        fx.show_visible("t1");
        fx.manager.handle_tooltip_window_event(WindowEvent::Closed);
        assert!(!fx.manager.is_renderer_ready());
        assert_eq!(fx.manager.window_id(), None);

        // The next show creates a fresh window and waits again.
        fx.show("t2");
        assert_eq!(fx.factory.created_count(), 3);
        assert_eq!(fx.manager.phase(), TooltipPhase::PendingRendererReady);
    }

    #[test]
    fn test_size_report_after_force_hide_is_harmless() {
        let mut fx = Fixture::new();
        let tooltip = fx.show_visible("t1");
        fx.manager.force_hide();
        fx.manager
            .report_content_size(&fx.parent, ContentSize { width: 300.0, height: 80.0 });
        assert!(!tooltip.is_visible());
        assert_eq!(fx.manager.phase(), TooltipPhase::Idle);
    }

    #[test]
    fn test_anchor_update_repositions() {
        let mut fx = Fixture::new();
        let tooltip = fx.show_visible("t1");

        let parent = fx.parent_id;
        fx.move_anchor("t1", parent, AnchorRect::new(110.0, 100.0, 50.0, 20.0));

        assert_eq!(tooltip.bounds(), Rect::new(275, 250, 120, 40));
        assert_eq!(tooltip.sent_on(channels::TOOLTIP_SET).len(), 1);
    }

    #[test]
    fn test_anchor_update_near_top_flips_and_resends() {
        let mut fx = Fixture::new();
        let tooltip = fx.show_visible("t1");

        // On screen the anchor now starts at y = 10, leaving no room above.
        let parent = fx.parent_id;
        fx.move_anchor("t1", parent, AnchorRect::new(10.0, -190.0, 50.0, 20.0));

        assert_eq!(fx.manager.placement(), TooltipPlacement::Bottom);
        assert_eq!(tooltip.bounds(), Rect::new(175, 40, 120, 40));
        let sent = tooltip.sent_on(channels::TOOLTIP_SET);
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1]["placement"], serde_json::json!("bottom"));
    }

    #[test]
    fn test_anchor_update_with_stale_id_is_dropped() {
        let mut fx = Fixture::new();
        let tooltip = fx.show_visible("t1");
        let before = tooltip.bounds();

        let parent = fx.parent_id;
        fx.move_anchor("t0", parent, AnchorRect::new(400.0, 100.0, 50.0, 20.0));

        assert_eq!(tooltip.bounds(), before);
    }

    #[test]
    fn test_anchor_update_from_other_window_is_dropped() {
        let mut fx = Fixture::new();
        let tooltip = fx.show_visible("t1");
        let before = tooltip.bounds();

        fx.move_anchor("t1", NativeWindowId::new(999), AnchorRect::new(400.0, 100.0, 50.0, 20.0));

        assert_eq!(tooltip.bounds(), before);
        assert_eq!(fx.manager.current_id(), Some("t1"));
    }

    #[test]
    fn test_parent_hidden_or_minimized_hides_pinned_tooltip() {
        for event in [WindowEvent::Hidden, WindowEvent::Minimized] {
            let mut fx = Fixture::new();
            let tooltip = fx.show_visible("t1");
            fx.manager.set_pinned(&TooltipPin { id: "t1".into(), pinned: true });

            fx.manager.handle_parent_event(&fx.parent, fx.parent_id, event);

            assert!(!tooltip.is_visible(), "{event:?}");
            assert_eq!(fx.manager.current_id(), None);
            assert!(!fx.manager.is_pinned());
        }
    }

    #[test]
    fn test_display_change_repositions() {
        let display = Rc::new(ShiftingDisplay {
            display: Cell::new(Display::new(Rect::new(0, 0, 1024, 768), Rect::new(0, 0, 1024, 740))),
        });
        let mut fx = Fixture::with_displays(display.clone());
        let tooltip = fx.show_visible("t1");
        assert_eq!(tooltip.bounds(), Rect::new(175, 250, 120, 40));

        // A tall top panel now covers the space above the anchor.
        display.display.set(Display::new(Rect::new(0, 0, 1024, 768), Rect::new(0, 280, 1024, 460)));
        fx.manager.handle_display_metrics_changed(&fx.parent);

        assert_eq!(fx.manager.placement(), TooltipPlacement::Bottom);
        assert_eq!(tooltip.bounds(), Rect::new(175, 330, 120, 40));
        assert_eq!(tooltip.sent_on(channels::TOOLTIP_SET).len(), 2);
    }
}
