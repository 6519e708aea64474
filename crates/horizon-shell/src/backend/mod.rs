//! Platform backends.
//!
//! [`crate::headless`] is always available; the winit backend is behind the
//! `winit` feature.

#[cfg(feature = "winit")]
pub mod winit;

#[cfg(feature = "winit")]
pub use self::winit::{MonitorDisplays, Outbound, WinitFactory, WinitWindow, translate_event};
