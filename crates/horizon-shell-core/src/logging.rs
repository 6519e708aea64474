//! Logging facilities for Horizon Shell.
//!
//! Horizon Shell uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! use tracing_subscriber::EnvFilter;
//!
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter(EnvFilter::new("horizon_shell=debug"))
//!         .init();
//!
//!     // Your application code...
//! }
//! ```

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core framework target.
    pub const CORE: &str = "horizon_shell_core";
    /// Timer system target.
    pub const TIMER: &str = "horizon_shell_core::timer";
    /// Configuration loading target.
    pub const CONFIG: &str = "horizon_shell_core::config";
    /// Window registry and positioner target.
    pub const REGISTRY: &str = "horizon_shell::registry";
    /// Tooltip manager target.
    pub const TOOLTIP: &str = "horizon_shell::tooltip";
    /// IPC boundary target.
    pub const IPC: &str = "horizon_shell::ipc";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// This is useful for tracking the duration of operations.
#[derive(Debug)]
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::debug_span!(target: "horizon_shell::perf", "perf", operation = name);
        Self {
            _span: span.entered(),
        }
    }
}

/// Macros for common tracing patterns.
///
/// These are thin wrappers around the `tracing` macros with consistent
/// target naming.
#[macro_export]
macro_rules! shell_trace {
    ($($arg:tt)*) => {
        tracing::trace!(target: "horizon_shell_core", $($arg)*)
    };
}

#[macro_export]
macro_rules! shell_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: "horizon_shell_core", $($arg)*)
    };
}
