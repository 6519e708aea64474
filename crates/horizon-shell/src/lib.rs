//! Horizon Shell - main-process window management for desktop shells.
//!
//! The shell keeps a registry of content windows, positions new windows
//! relative to a reference window, keeps "follower" windows glued to the
//! window they follow and drives a single shared tooltip window. It does
//! not draw anything: platform windows are reached through the
//! [`NativeWindow`] and [`WindowFactory`] traits, with an in-memory
//! [`headless`] backend and an optional winit backend.
//!
//! Hosts feed native events into [`Shell::handle_window_event`], forward
//! renderer calls to [`Shell::invoke`] and pump [`Shell::process_timers`]
//! whenever [`Shell::next_timer_deadline`] passes.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use horizon_shell::headless::{HeadlessFactory, RecordingOpener, StaticDisplays};
//! use horizon_shell::window::{CreateWindowOptions, PlacementKind};
//! use horizon_shell::{Display, Rect, Shell, ShellConfig, WindowEvent};
//!
//! let screen = Rect::new(0, 0, 1920, 1080);
//! let displays = Rc::new(StaticDisplays::single(Display::new(screen, screen)));
//! let mut shell = Shell::new(ShellConfig::default(), displays, Box::new(RecordingOpener::new()));
//! let mut factory = HeadlessFactory::new();
//!
//! let main = shell
//!     .create_window(&mut factory, CreateWindowOptions::new().with_id("main"))
//!     .unwrap();
//! let panel = shell
//!     .create_window(
//!         &mut factory,
//!         CreateWindowOptions::new()
//!             .with_id("panel")
//!             .with_kind(PlacementKind::RightTopOut)
//!             .with_follow_move(true),
//!     )
//!     .unwrap();
//!
//! // Positioning, and follow registration, happen once the window is ready.
//! let panel_id = factory.last().unwrap().id();
//! shell.handle_window_event(panel_id, WindowEvent::ReadyToShow);
//!
//! assert_eq!(shell.registry().follow_parent_of(&panel), Some(main.as_str()));
//! ```

pub mod backend;
pub mod display;
pub mod error;
pub mod event;
pub mod headless;
pub mod ipc;
pub mod native;
pub mod opener;
pub mod tooltip;
pub mod window;

pub use display::{Display, DisplayQuery};
pub use error::{DisplayError, IpcError, NativeWindowError, Result, ShellError};
pub use event::WindowEvent;
pub use horizon_shell_core::{
    COORD_LIMIT, Clock, ManualClock, Point, Rect, ShellConfig, Size, SystemClock, TooltipDefaults,
    WindowDefaults,
};
pub use ipc::{IpcChannel, Shell};
pub use native::{ContentSource, NativeWindow, NativeWindowId, WindowAttributes, WindowFactory, WindowLevel, WindowLookup};
pub use opener::{ExternalOpener, SystemOpener};
pub use tooltip::{TooltipManager, TooltipPhase};
pub use window::{CreateWindowOptions, PlacementKind, WindowKey, WindowRegistry};
