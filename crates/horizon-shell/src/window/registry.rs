//! The window registry and positioner.
//!
//! Every application window is tracked here under a string key. The
//! registry positions windows relative to a reference window, keeps
//! followers glued to their parent while it moves, plays the reveal
//! animation, and tears everything down when the main window closes.
//!
//! The registry never blocks or spawns. The host forwards native events with
//! [`WindowRegistry::handle_event`] and pumps [`WindowRegistry::process_timers`]
//! from its event loop, using [`WindowRegistry::next_timer_deadline`] to
//! know when to wake up.

use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use horizon_shell_core::{
    Clock, PerfSpan, Point, Rect, RevealTween, Throttle, ThrottleDecision, TimerId, TimerManager,
    TweenFrame, WindowDefaults,
};

use crate::display::DisplayQuery;
use crate::error::Result;
use crate::event::{WindowBlurPayload, WindowEvent, channels};
use crate::native::{ContentSource, NativeWindow, NativeWindowId, WindowFactory, WindowLookup};
use crate::opener::ExternalOpener;
use crate::window::follow::FollowGraph;
use crate::window::navigation::{self, LinkTarget, NavigationAction};
use crate::window::options::{AnimateSpec, Bound, CreateWindowOptions, px_extent};
use crate::window::placement::{self, PlacementKind};

/// Key under which a window is tracked.
pub type WindowKey = String;

/// Key that designates the main window when no main window is set.
pub const MAIN_WINDOW_KEY: &str = "main";

/// Key for a window created without an explicit id.
pub fn generated_key(id: NativeWindowId) -> WindowKey {
    format!("$${id}")
}

/// A registered window and the options it was created with.
struct TrackedWindow {
    native: Box<dyn NativeWindow>,
    placement: PlacementKind,
    bound: Option<Bound>,
    animate: Option<AnimateSpec>,
    follow_move: bool,
    modal: bool,
    /// Logical parent from the creation options, kept even when anchoring
    /// suppressed the native parent.
    parent: Option<WindowKey>,
    hash_route: Option<String>,
    open_links_external: Option<bool>,
    export_name: Option<String>,
}

impl TrackedWindow {
    fn is_live(&self) -> bool {
        !self.native.is_destroyed()
    }
}

/// What a fired timer was for.
#[derive(Debug, Clone, PartialEq, Eq)]
enum TimerTask {
    /// Trailing edge of a parent's move throttle.
    MoveBroadcast(WindowKey),
    /// Next frame of a window's reveal animation.
    RevealTick(WindowKey),
}

struct RevealAnimation {
    tween: RevealTween,
    timer: TimerId,
}

/// Sizes of the registry's internal tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingInfo {
    pub window_count: usize,
    pub relation_count: usize,
    pub throttle_count: usize,
    pub animation_count: usize,
}

/// Resize request for [`WindowRegistry::update_window_bounds`].
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
pub struct UpdateWindowBounds {
    /// Registry key, or the raw native id of a window created without one.
    pub id: String,
    pub bounds: BoundsUpdate,
}

/// New dimensions; absent dimensions are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Deserialize)]
pub struct BoundsUpdate {
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

/// Tracks, positions and tears down application windows.
pub struct WindowRegistry {
    defaults: WindowDefaults,
    clock: Rc<dyn Clock>,
    displays: Rc<dyn DisplayQuery>,
    opener: Box<dyn ExternalOpener>,
    windows: HashMap<WindowKey, TrackedWindow>,
    by_native: HashMap<NativeWindowId, WindowKey>,
    exports: HashMap<String, WindowKey>,
    follow: FollowGraph,
    throttles: HashMap<WindowKey, Throttle>,
    animations: HashMap<WindowKey, RevealAnimation>,
    timers: TimerManager,
    tasks: HashMap<TimerId, TimerTask>,
    main: Option<WindowKey>,
    open_links_external: bool,
}

impl WindowRegistry {
    /// Create an empty registry.
    pub fn new(
        defaults: WindowDefaults,
        clock: Rc<dyn Clock>,
        displays: Rc<dyn DisplayQuery>,
        opener: Box<dyn ExternalOpener>,
    ) -> Self {
        let open_links_external = defaults.open_links_external;
        Self {
            defaults,
            clock,
            displays,
            opener,
            windows: HashMap::new(),
            by_native: HashMap::new(),
            exports: HashMap::new(),
            follow: FollowGraph::new(),
            throttles: HashMap::new(),
            animations: HashMap::new(),
            timers: TimerManager::new(),
            tasks: HashMap::new(),
            main: None,
            open_links_external,
        }
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Create and register a window, or focus the live window already
    /// registered under `options.id`.
    ///
    /// The window is loaded immediately and positioned and shown when the
    /// host reports [`WindowEvent::ReadyToShow`].
    pub fn create_window(
        &mut self,
        factory: &mut dyn WindowFactory,
        options: CreateWindowOptions,
    ) -> Result<WindowKey> {
        let _span = PerfSpan::new("create_window");

        if let Some(id) = options.id.as_deref() {
            match self.windows.get_mut(id) {
                Some(existing) if existing.is_live() => {
                    existing.native.focus();
                    tracing::debug!(target: "horizon_shell::registry", key = id, "window exists, focusing");
                    return Ok(id.to_string());
                }
                Some(_) => {
                    tracing::debug!(target: "horizon_shell::registry", key = id, "replacing destroyed window");
                    self.forget_window(id);
                }
                None => {}
            }
        }

        let anchored = options.bound.is_some_and(|b| b.is_anchored());
        let parent_key = options.window_config.parent.clone();
        let native_parent = if anchored {
            None
        } else {
            parent_key
                .as_deref()
                .and_then(|key| self.windows.get(key))
                .filter(|w| w.is_live())
                .map(|w| w.native.id())
        };
        let modal = !anchored && parent_key.is_some();

        let attributes = options
            .window_config
            .to_attributes(&self.defaults, modal, native_parent);
        let mut native = factory.create(&attributes)?;
        let native_id = native.id();
        let key = options.id.clone().unwrap_or_else(|| generated_key(native_id));

        native.load(&ContentSource::route_with_params(
            options.hash_route.clone(),
            options.params.as_ref(),
        ));

        tracing::debug!(
            target: "horizon_shell::registry",
            key = %key,
            native_id = %native_id,
            kind = %options.kind.unwrap_or_default(),
            modal,
            "window created"
        );

        if let Some(name) = &options.export_name {
            self.exports.insert(name.clone(), key.clone());
        }
        if key == MAIN_WINDOW_KEY && self.main.is_none() {
            self.main = Some(key.clone());
        }
        self.by_native.insert(native_id, key.clone());
        self.throttles
            .insert(key.clone(), Throttle::new(self.defaults.move_throttle()));
        self.windows.insert(
            key.clone(),
            TrackedWindow {
                native,
                placement: options.kind.unwrap_or_default(),
                bound: options.bound,
                animate: options.window_config.animate,
                follow_move: options.follow_move,
                modal,
                parent: parent_key,
                hash_route: options.hash_route,
                open_links_external: options.open_links_external,
                export_name: options.export_name,
            },
        );

        Ok(key)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Whether a window is registered under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.windows.contains_key(key)
    }

    /// Number of tracked windows.
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Keys of all tracked windows.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.windows.keys().map(String::as_str)
    }

    /// The native window registered under `key`.
    pub fn get(&self, key: &str) -> Option<&dyn NativeWindow> {
        self.windows.get(key).map(|w| &*w.native)
    }

    /// Mutable access to the native window registered under `key`.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut (dyn NativeWindow + 'static)> {
        self.windows.get_mut(key).map(|w| &mut *w.native)
    }

    /// The key of the window with the given native id.
    pub fn key_of(&self, id: NativeWindowId) -> Option<&str> {
        self.by_native.get(&id).map(String::as_str)
    }

    /// The key registered under an export name.
    pub fn key_for_export(&self, name: &str) -> Option<&str> {
        self.exports.get(name).map(String::as_str)
    }

    /// Placement kind of a tracked window.
    pub fn placement_of(&self, key: &str) -> Option<PlacementKind> {
        self.windows.get(key).map(|w| w.placement)
    }

    /// Whether the window was created modal.
    pub fn is_modal(&self, key: &str) -> bool {
        self.windows.get(key).is_some_and(|w| w.modal)
    }

    /// The window `key` follows, if any.
    pub fn follow_parent_of(&self, key: &str) -> Option<&str> {
        self.follow.parent_of(key).map(String::as_str)
    }

    /// The windows following `key`.
    pub fn followers_of(&self, key: &str) -> &[WindowKey] {
        self.follow.followers(key)
    }

    /// The main window's key.
    pub fn main_window(&self) -> Option<&str> {
        self.main.as_deref()
    }

    /// Designate a tracked window as the main window.
    pub fn set_main_window(&mut self, key: &str) -> bool {
        if !self.windows.contains_key(key) {
            return false;
        }
        self.main = Some(key.to_string());
        true
    }

    /// Sizes of the internal tables.
    pub fn tracking_info(&self) -> TrackingInfo {
        TrackingInfo {
            window_count: self.windows.len(),
            relation_count: self.follow.relation_count(),
            throttle_count: self.throttles.len(),
            animation_count: self.animations.len(),
        }
    }

    /// Global link policy.
    pub fn open_links_external(&self) -> bool {
        self.open_links_external
    }

    /// Change the global link policy. Per-window overrides still win.
    pub fn set_open_links_external(&mut self, external: bool) {
        tracing::debug!(target: "horizon_shell::registry", external, "link policy changed");
        self.open_links_external = external;
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// React to a native event on a tracked window.
    ///
    /// Events for unknown windows are ignored.
    pub fn handle_event(&mut self, id: NativeWindowId, event: WindowEvent) {
        let Some(key) = self.by_native.get(&id).cloned() else {
            return;
        };
        tracing::trace!(target: "horizon_shell::registry", key = %key, ?event, "window event");

        match event {
            WindowEvent::ReadyToShow => self.reveal(&key),
            WindowEvent::Moved => self.on_moved(&key),
            WindowEvent::Blurred => self.broadcast_blur(&key),
            WindowEvent::Closed => self.on_closed(&key),
            WindowEvent::Resized
            | WindowEvent::Focused
            | WindowEvent::EnterFullScreen
            | WindowEvent::LeaveFullScreen
            | WindowEvent::Hidden
            | WindowEvent::Minimized => {}
        }
    }

    /// Run every timer due at the clock's current time.
    pub fn process_timers(&mut self) {
        let now = self.clock.now();
        for id in self.timers.process_expired(now) {
            match self.tasks.get(&id).cloned() {
                Some(TimerTask::MoveBroadcast(key)) => {
                    self.tasks.remove(&id);
                    let due = self
                        .throttles
                        .get_mut(&key)
                        .is_some_and(|t| t.complete(id, now));
                    if due {
                        self.broadcast_move(&key);
                    }
                }
                Some(TimerTask::RevealTick(key)) => self.advance_reveal(&key),
                None => {}
            }
        }
    }

    /// When the registry next needs [`process_timers`](Self::process_timers).
    pub fn next_timer_deadline(&mut self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    fn reveal(&mut self, key: &str) {
        self.position_window(key, true);
        if let Some(window) = self.windows.get_mut(key)
            && window.is_live()
        {
            window.native.show();
        }
    }

    fn on_moved(&mut self, key: &str) {
        if !self.follow.has_followers(key) {
            return;
        }
        let now = self.clock.now();
        let Some(throttle) = self.throttles.get_mut(key) else {
            return;
        };
        match throttle.request(now, &mut self.timers) {
            ThrottleDecision::Invoke => self.broadcast_move(key),
            ThrottleDecision::Scheduled(id) => {
                self.tasks.insert(id, TimerTask::MoveBroadcast(key.to_string()));
            }
            ThrottleDecision::Coalesced => {}
        }
    }

    fn broadcast_move(&mut self, key: &str) {
        let followers = self.follow.followers(key).to_vec();
        tracing::trace!(target: "horizon_shell::registry", parent = key, count = followers.len(), "repositioning followers");
        for child in followers {
            self.position_window(&child, false);
        }
    }

    fn broadcast_blur(&mut self, key: &str) {
        let Some(window) = self.windows.get(key) else {
            return;
        };
        let payload = WindowBlurPayload {
            hash_route: window.hash_route.clone(),
            id: window.native.id(),
        };
        let payload = match serde_json::to_value(&payload) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(target: "horizon_shell::registry", %err, "failed to encode blur payload");
                return;
            }
        };
        for window in self.windows.values_mut().filter(|w| w.is_live()) {
            window.native.send(channels::WINDOW_BLUR, &payload);
        }
    }

    fn on_closed(&mut self, key: &str) {
        let was_main = self.main.as_deref() == Some(key);
        if let Some(window) = self.forget_window(key) {
            teardown(window);
        }
        tracing::debug!(target: "horizon_shell::registry", key, was_main, "window closed");
        if was_main {
            self.destroy_all();
        }
    }

    /// Destroy every tracked window and clear all state.
    pub fn destroy_all(&mut self) {
        let count = self.windows.len();
        for (_, window) in self.windows.drain() {
            teardown(window);
        }
        self.by_native.clear();
        self.exports.clear();
        self.follow.clear();
        self.throttles.clear();
        self.animations.clear();
        self.timers.clear();
        self.tasks.clear();
        self.main = None;
        tracing::debug!(target: "horizon_shell::registry", count, "all windows destroyed");
    }

    /// Remove every trace of `key`, returning the window if it was tracked.
    fn forget_window(&mut self, key: &str) -> Option<TrackedWindow> {
        self.follow.remove_window(key);
        if let Some(mut throttle) = self.throttles.remove(key) {
            throttle.cancel(&mut self.timers);
        }
        if let Some(animation) = self.animations.remove(key) {
            let _ = self.timers.stop(animation.timer);
        }
        self.tasks.retain(|_, task| match task {
            TimerTask::MoveBroadcast(k) | TimerTask::RevealTick(k) => k.as_str() != key,
        });

        let window = self.windows.remove(key)?;
        self.by_native.remove(&window.native.id());
        if let Some(name) = &window.export_name
            && self.exports.get(name).is_some_and(|k| k == key)
        {
            self.exports.remove(name);
        }
        if self.main.as_deref() == Some(key) {
            self.main = None;
        }
        Some(window)
    }

    // =========================================================================
    // Positioning
    // =========================================================================

    /// Recompute and apply the position of `key` relative to its reference
    /// window. Nothing happens when no reference window is available.
    fn position_window(&mut self, key: &str, use_animate: bool) {
        let Some(fallback) = self.reference_for(key) else {
            tracing::trace!(target: "horizon_shell::registry", key, "no reference window");
            return;
        };

        let Some(window) = self.windows.get(key) else {
            return;
        };
        let reference = if window.follow_move && !window.modal {
            self.follow.add(&fallback, key).unwrap_or(fallback)
        } else {
            fallback
        };

        let Some(parent_bounds) = self
            .windows
            .get(&reference)
            .filter(|w| w.is_live())
            .map(|w| w.native.bounds())
        else {
            return;
        };

        let Some(window) = self.windows.get(key) else {
            return;
        };
        let own = window.native.bounds();
        let size = window.bound.map_or(own.size(), |b| b.size_or(own.size()));
        let offset = window.bound.map(|b| b.offset()).unwrap_or_default();
        let resize = window.bound.is_some_and(|b| b.overrides_size());
        let kind = window.placement;
        let animate = window.animate.filter(|_| use_animate);

        let display_right = if kind.needs_display_clamp() {
            self.display_right_edge(own)
        } else {
            None
        };
        let origin = placement::anchored_position(kind, parent_bounds, size, offset, display_right);
        let target = Rect::from_parts(origin, size);

        tracing::trace!(target: "horizon_shell::registry", key, reference = %reference, %kind, ?target, "positioning window");

        match animate {
            Some(spec) => self.start_reveal(key, target, spec, resize),
            None => {
                self.cancel_reveal(key);
                if let Some(window) = self.windows.get_mut(key) {
                    apply_frame(
                        &mut *window.native,
                        &TweenFrame {
                            bounds: target,
                            opacity: 1.0,
                            finished: true,
                        },
                        resize,
                        false,
                    );
                }
            }
        }
    }

    /// The window `key` is positioned against: its follow parent, else its
    /// logical parent, else the focused window, else the main window.
    fn reference_for(&self, key: &str) -> Option<WindowKey> {
        if let Some(parent) = self.follow.parent_of(key) {
            return Some(parent.clone());
        }
        let window = self.windows.get(key)?;
        let usable = |k: &&str| *k != key && self.windows.get(*k).is_some_and(|w| w.is_live());

        window
            .parent
            .as_deref()
            .filter(usable)
            .or_else(|| self.focused_key().filter(usable))
            .or_else(|| self.main.as_deref().filter(usable))
            .map(str::to_string)
    }

    fn focused_key(&self) -> Option<&str> {
        self.windows
            .iter()
            .find(|(_, w)| w.is_live() && w.native.is_focused())
            .map(|(k, _)| k.as_str())
    }

    fn display_right_edge(&self, rect: Rect) -> Option<i32> {
        match self.displays.display_matching(rect) {
            Ok(display) => Some(display.bounds.right()),
            Err(err) => {
                tracing::warn!(target: "horizon_shell::registry", %err, "display lookup failed, not clamping");
                None
            }
        }
    }

    // =========================================================================
    // Reveal animation
    // =========================================================================

    fn start_reveal(&mut self, key: &str, target: Rect, spec: AnimateSpec, resize: bool) {
        self.cancel_reveal(key);

        let interval = spec
            .duration
            .map_or(self.defaults.animation_tick(), Duration::from_millis);
        let offset = (
            spec.offset_x.unwrap_or(self.defaults.animation_offset_x),
            spec.offset_y.unwrap_or(self.defaults.animation_offset_y),
        );
        let tween = RevealTween::new(target, offset, interval, resize);

        let Some(window) = self.windows.get_mut(key) else {
            return;
        };
        apply_frame(&mut *window.native, &tween.initial_frame(), resize, true);

        let timer = self.timers.start_repeating(self.clock.now(), interval);
        self.tasks.insert(timer, TimerTask::RevealTick(key.to_string()));
        self.animations
            .insert(key.to_string(), RevealAnimation { tween, timer });
        tracing::trace!(target: "horizon_shell::registry", key, ?interval, "reveal started");
    }

    fn advance_reveal(&mut self, key: &str) {
        let Some(animation) = self.animations.get_mut(key) else {
            return;
        };
        let frame = animation.tween.tick();
        let resize = animation.tween.resizes();
        let timer = animation.timer;

        match self.windows.get_mut(key).filter(|w| w.is_live()) {
            Some(window) => apply_frame(&mut *window.native, &frame, resize, true),
            None => {
                self.finish_reveal(key, timer);
                return;
            }
        }
        if frame.finished {
            self.finish_reveal(key, timer);
        }
    }

    fn finish_reveal(&mut self, key: &str, timer: TimerId) {
        let _ = self.timers.stop(timer);
        self.tasks.remove(&timer);
        self.animations.remove(key);
    }

    /// Stop a running reveal, leaving the window fully opaque.
    fn cancel_reveal(&mut self, key: &str) {
        let Some(animation) = self.animations.remove(key) else {
            return;
        };
        let _ = self.timers.stop(animation.timer);
        self.tasks.remove(&animation.timer);
        if let Some(window) = self.windows.get_mut(key)
            && window.is_live()
        {
            window.native.set_opacity(1.0);
        }
    }

    // =========================================================================
    // Resizing
    // =========================================================================

    /// Resize a window while keeping its placement anchor fixed.
    ///
    /// Returns `false` when no live window matches the id.
    pub fn update_window_bounds(&mut self, request: &UpdateWindowBounds) -> bool {
        let Some(key) = self.resolve_key(&request.id) else {
            tracing::debug!(target: "horizon_shell::registry", id = %request.id, "resize for unknown window");
            return false;
        };
        let Some(window) = self.windows.get(&key).filter(|w| w.is_live()) else {
            return false;
        };

        let current = window.native.bounds();
        let kind = window.placement;
        let width = request.bounds.width.map(px_extent);
        let height = request.bounds.height.map(px_extent);
        let display_right = if kind.needs_display_clamp() {
            self.display_right_edge(current)
        } else {
            None
        };
        let next = placement::resize_preserving_anchor(kind, current, width, height, display_right);

        if let Some(window) = self.windows.get_mut(&key) {
            window.native.set_bounds(next, false);
        }
        tracing::trace!(target: "horizon_shell::registry", key = %key, ?next, "window resized");
        true
    }

    /// Accept either a registry key or a raw native id.
    fn resolve_key(&self, id: &str) -> Option<WindowKey> {
        if self.windows.contains_key(id) {
            return Some(id.to_string());
        }
        let generated = generated_key(id.parse().ok()?);
        self.windows.contains_key(&generated).then_some(generated)
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Decide on a new-window request (`window.open`, `target=_blank`).
    pub fn handle_open_request(&mut self, id: NativeWindowId, url: &str) -> NavigationAction {
        self.route_link(id, url)
    }

    /// Decide on an in-place navigation.
    pub fn handle_will_navigate(&mut self, id: NativeWindowId, url: &str) -> NavigationAction {
        self.route_link(id, url)
    }

    fn route_link(&mut self, id: NativeWindowId, url: &str) -> NavigationAction {
        let key = self.by_native.get(&id).cloned();
        match navigation::classify(url) {
            LinkTarget::External(target) => {
                self.open_external(target);
                NavigationAction::Deny
            }
            LinkTarget::Internal(target) => {
                if let Some(window) = key.as_deref().and_then(|k| self.windows.get_mut(k)) {
                    window.native.load(&ContentSource::Url(target.to_string()));
                }
                NavigationAction::Deny
            }
            LinkTarget::Unmarked(target) => {
                let per_window = key
                    .as_deref()
                    .and_then(|k| self.windows.get(k))
                    .and_then(|w| w.open_links_external);
                if navigation::opens_externally(per_window, Some(self.open_links_external)) {
                    self.open_external(target);
                    NavigationAction::Deny
                } else {
                    NavigationAction::Allow
                }
            }
        }
    }

    fn open_external(&self, url: &str) {
        tracing::debug!(target: "horizon_shell::registry", url, "opening link externally");
        if let Err(err) = self.opener.open_external(url) {
            tracing::warn!(target: "horizon_shell::registry", url, %err, "failed to open link");
        }
    }
}

impl WindowLookup for WindowRegistry {
    fn window(&self, id: NativeWindowId) -> Option<&dyn NativeWindow> {
        self.by_native.get(&id).and_then(|key| self.get(key))
    }
}

/// Strip listeners and destroy.
fn teardown(mut window: TrackedWindow) {
    window.native.detach_listeners();
    if window.is_live() {
        window.native.destroy();
    }
}

/// Apply a frame: full bounds when resizing, position otherwise.
fn apply_frame(native: &mut dyn NativeWindow, frame: &TweenFrame, resize: bool, with_opacity: bool) {
    if with_opacity {
        native.set_opacity(frame.opacity);
    }
    if resize {
        native.set_bounds(frame.bounds, false);
    } else {
        native.set_position(Point::new(frame.bounds.x, frame.bounds.y), false);
    }
}
