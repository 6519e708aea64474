//! Core systems for Horizon Shell.
//!
//! This crate provides the windowing-agnostic building blocks used by the
//! `horizon-shell` window registry and tooltip manager:
//!
//! - **Geometry**: points, sizes and rectangles in screen pixels
//! - **Clock**: injectable time source for deterministic timers
//! - **Timers**: cancellable one-shot and repeating timers
//! - **Throttle**: leading + trailing call throttling
//! - **Animation**: the window reveal tween
//! - **Configuration**: TOML-loadable defaults for the whole shell
//!
//! # Timer Example
//!
//! ```
//! use std::time::Duration;
//! use horizon_shell_core::{Clock, ManualClock, TimerManager};
//!
//! let clock = ManualClock::new();
//! let mut timers = TimerManager::new();
//! let id = timers.start_one_shot(clock.now(), Duration::from_millis(120));
//!
//! clock.advance(Duration::from_millis(120));
//! assert_eq!(timers.process_expired(clock.now()), vec![id]);
//! ```

pub mod animation;
mod clock;
pub mod config;
mod error;
pub mod geometry;
pub mod logging;
mod throttle;
mod timer;

pub use animation::{RevealTween, TweenFrame};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ShellConfig, TooltipDefaults, WindowDefaults};
pub use error::{CoreError, Result};
pub use geometry::{COORD_LIMIT, Point, Rect, Size, coord_from_f64};
pub use logging::PerfSpan;
pub use throttle::{Throttle, ThrottleDecision};
pub use timer::{TimerId, TimerKind, TimerManager};
