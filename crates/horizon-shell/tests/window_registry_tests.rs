//! Tests for window creation, anchored placement and follow-move tracking.

use std::rc::Rc;
use std::time::Duration;

use horizon_shell::headless::{HeadlessFactory, HeadlessHandle, RecordingOpener, StaticDisplays};
use horizon_shell::window::{
    Bound, CreateWindowOptions, PlacementKind, UpdateWindowBounds, WindowConfig,
};
use horizon_shell::{Display, ManualClock, Rect, Shell, ShellConfig, WindowEvent};

const MAIN_BOUNDS: Rect = Rect {
    x: 100,
    y: 100,
    width: 800,
    height: 600,
};

struct Harness {
    shell: Shell,
    factory: HeadlessFactory,
    clock: ManualClock,
    opener: RecordingOpener,
}

impl Harness {
    fn new() -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let clock = ManualClock::new();
        let opener = RecordingOpener::new();
        let displays = StaticDisplays::single(Display::new(
            Rect::new(0, 0, 1920, 1080),
            Rect::new(0, 0, 1920, 1040),
        ));
        let shell = Shell::with_clock(
            ShellConfig::default(),
            Rc::new(clock.clone()),
            Rc::new(displays),
            Box::new(opener.clone()),
        );
        Self {
            shell,
            factory: HeadlessFactory::new(),
            clock,
            opener,
        }
    }

    /// Create a window and deliver its ready-to-show event.
    fn open(&mut self, options: CreateWindowOptions) -> (String, HeadlessHandle) {
        let key = self
            .shell
            .create_window(&mut self.factory, options)
            .expect("window creation failed");
        let handle = self.factory.last().expect("no window created").clone();
        self.shell.handle_window_event(handle.id(), WindowEvent::ReadyToShow);
        (key, handle)
    }

    /// Open the main window at [`MAIN_BOUNDS`]; it stays the only focused window.
    fn open_main(&mut self) -> HeadlessHandle {
        let (_, main) = self.open(CreateWindowOptions::new().with_id("main"));
        main.set_bounds_external(MAIN_BOUNDS);
        main
    }

    /// Open a secondary window, then drop its focus so `main` stays the
    /// positioning reference for windows opened later.
    fn open_secondary(&mut self, options: CreateWindowOptions) -> (String, HeadlessHandle) {
        let (key, handle) = self.open(options);
        handle.set_focused(false);
        (key, handle)
    }

    fn advance(&mut self, ms: u64) {
        self.clock.advance(Duration::from_millis(ms));
        self.shell.process_timers();
    }
}

fn sized(width: f64, height: f64) -> WindowConfig {
    WindowConfig::new().with_size(width, height)
}

#[test]
fn test_right_top_out_sits_beside_main() {
    let mut h = Harness::new();
    h.open_main();

    let (_, panel) = h.open_secondary(
        CreateWindowOptions::new()
            .with_config(sized(300.0, 200.0))
            .with_kind(PlacementKind::RightTopOut)
            .with_bound(Bound::at(10.0, 20.0)),
    );

    assert_eq!(panel.bounds(), Rect::new(890, 120, 300, 200));
    assert!(panel.is_visible());
}

#[test]
fn test_outward_resize_keeps_anchor_edge() {
    let mut h = Harness::new();
    h.open_main();
    let (key, panel) = h.open_secondary(
        CreateWindowOptions::new()
            .with_config(sized(300.0, 200.0))
            .with_kind(PlacementKind::RightTopOut)
            .with_bound(Bound::at(10.0, 20.0)),
    );

    let request: UpdateWindowBounds = serde_json::from_value(serde_json::json!({
        "id": key,
        "bounds": { "width": 400, "height": 260 }
    }))
    .unwrap();
    assert!(h.shell.registry_mut().update_window_bounds(&request));

    // Grows leftwards; a top variant keeps its y.
    assert_eq!(panel.bounds(), Rect::new(790, 120, 400, 260));
}

#[test]
fn test_center_resize_grows_around_center() {
    let mut h = Harness::new();
    h.open_main();
    let (key, dialog) = h.open_secondary(
        CreateWindowOptions::new()
            .with_id("dialog")
            .with_config(sized(300.0, 200.0))
            .with_kind(PlacementKind::Center),
    );
    assert_eq!(dialog.bounds(), Rect::new(350, 300, 300, 200));

    let request: UpdateWindowBounds = serde_json::from_value(serde_json::json!({
        "id": key,
        "bounds": { "width": 400, "height": 300 }
    }))
    .unwrap();
    assert!(h.shell.registry_mut().update_window_bounds(&request));
    assert_eq!(dialog.bounds(), Rect::new(300, 250, 400, 300));
}

#[test]
fn test_resize_by_raw_native_id() {
    let mut h = Harness::new();
    h.open_main();
    let (key, popup) = h.open_secondary(
        CreateWindowOptions::new()
            .with_export_name("popup")
            .with_config(sized(200.0, 100.0))
            .with_kind(PlacementKind::LeftTopIn),
    );
    assert_eq!(h.shell.registry().key_for_export("popup"), Some(key.as_str()));
    assert_eq!(popup.bounds(), Rect::new(100, 100, 200, 100));

    let request: UpdateWindowBounds = serde_json::from_value(serde_json::json!({
        "id": popup.id().to_string(),
        "bounds": { "height": 150 }
    }))
    .unwrap();
    assert!(h.shell.registry_mut().update_window_bounds(&request));
    assert_eq!(popup.bounds(), Rect::new(100, 100, 200, 150));
}

#[test]
fn test_resize_unknown_window_is_rejected() {
    let mut h = Harness::new();
    h.open_main();
    let request: UpdateWindowBounds = serde_json::from_value(serde_json::json!({
        "id": "nope",
        "bounds": { "width": 10 }
    }))
    .unwrap();
    assert!(!h.shell.registry_mut().update_window_bounds(&request));
}

#[test]
fn test_create_with_same_id_focuses_existing() {
    let mut h = Harness::new();
    h.open_main();

    let first = h
        .shell
        .create_window(&mut h.factory, CreateWindowOptions::new().with_id("about"))
        .unwrap();
    let about = h.factory.last().unwrap().clone();
    let second = h
        .shell
        .create_window(&mut h.factory, CreateWindowOptions::new().with_id("about"))
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(h.factory.created_count(), 2);
    assert_eq!(about.focus_count(), 1);
    assert_eq!(h.shell.registry().len(), 2);
}

#[test]
fn test_follower_move_is_throttled() {
    let mut h = Harness::new();
    let main = h.open_main();
    let (key, follower) = h.open_secondary(
        CreateWindowOptions::new()
            .with_config(sized(300.0, 200.0))
            .with_kind(PlacementKind::RightTopOut)
            .with_follow_move(true),
    );
    assert_eq!(h.shell.registry().follow_parent_of(&key), Some("main"));
    assert_eq!(follower.bounds().origin(), horizon_shell::Point::new(900, 100));

    // Leading edge runs immediately.
    main.set_bounds_external(MAIN_BOUNDS.translated(50, 0));
    h.shell.handle_window_event(main.id(), WindowEvent::Moved);
    assert_eq!(follower.bounds().x, 950);

    // A burst inside the window collapses into one trailing run.
    h.advance(10);
    main.set_bounds_external(MAIN_BOUNDS.translated(100, 0));
    h.shell.handle_window_event(main.id(), WindowEvent::Moved);
    h.advance(10);
    main.set_bounds_external(MAIN_BOUNDS.translated(150, 0));
    h.shell.handle_window_event(main.id(), WindowEvent::Moved);
    assert_eq!(follower.bounds().x, 950);

    h.advance(29);
    assert_eq!(follower.bounds().x, 950);
    h.advance(1);
    assert_eq!(follower.bounds().x, 1050);
    assert_eq!(h.shell.next_timer_deadline(), None);
}

#[test]
fn test_main_close_destroys_everything() {
    let mut h = Harness::new();
    let main = h.open_main();
    let (_, dialog) = h.open_secondary(
        CreateWindowOptions::new()
            .with_config(sized(300.0, 200.0))
            .with_kind(PlacementKind::Center),
    );
    let (_, follower) = h.open_secondary(
        CreateWindowOptions::new()
            .with_config(sized(300.0, 200.0))
            .with_kind(PlacementKind::RightTopOut)
            .with_follow_move(true),
    );
    assert_eq!(h.shell.registry().tracking_info().relation_count, 1);

    h.shell.handle_window_event(main.id(), WindowEvent::Closed);

    assert!(h.shell.registry().is_empty());
    assert!(dialog.is_destroyed());
    assert!(follower.is_destroyed());
    assert!(!dialog.listeners_attached());
    let info = h.shell.registry().tracking_info();
    assert_eq!(info.window_count, 0);
    assert_eq!(info.relation_count, 0);
    assert_eq!(info.throttle_count, 0);
    assert_eq!(info.animation_count, 0);
}

#[test]
fn test_secondary_close_keeps_main() {
    let mut h = Harness::new();
    h.open_main();
    let (key, dialog) = h.open_secondary(CreateWindowOptions::new().with_kind(PlacementKind::Center));

    h.shell.handle_window_event(dialog.id(), WindowEvent::Closed);

    assert!(!h.shell.registry().contains(&key));
    assert!(h.shell.registry().contains("main"));
}

#[test]
fn test_blur_is_broadcast_to_all_windows() {
    let mut h = Harness::new();
    let main = h.open_main();
    let (_, settings) = h.open_secondary(
        CreateWindowOptions::new()
            .with_route("settings")
            .with_kind(PlacementKind::Center),
    );

    h.shell.handle_window_event(settings.id(), WindowEvent::Blurred);

    let expected = serde_json::json!({ "hashRoute": "settings", "id": settings.id().get() });
    assert_eq!(main.sent_on("window-blur"), [expected.clone()]);
    assert_eq!(settings.sent_on("window-blur"), [expected]);
}

#[test]
fn test_external_links_open_in_browser() {
    let mut h = Harness::new();
    let main = h.open_main();

    let action = h.shell.handle_open_request(main.id(), "https://example.com/docs");
    assert_eq!(action, horizon_shell::window::NavigationAction::Deny);
    assert_eq!(h.opener.opened(), ["https://example.com/docs".to_string()]);
}
