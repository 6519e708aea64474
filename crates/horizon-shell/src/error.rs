//! Error types for Horizon Shell.

use horizon_shell_core::CoreError;

/// Result type alias for shell operations.
pub type Result<T> = std::result::Result<T, ShellError>;

/// Errors raised by the window registry and tooltip manager.
///
/// Only [`ShellError::UnknownPlacement`] is a caller contract violation.
/// Geometry and display failures never surface here; they are logged and
/// the affected operation is skipped.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    /// A placement kind name that is not one of the nine known kinds.
    #[error("Unknown placement kind '{0}'")]
    UnknownPlacement(String),

    /// The native window could not be created.
    #[error("Failed to create window: {0}")]
    WindowCreation(#[from] NativeWindowError),

    /// Core error (configuration, timers).
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Errors reported by a native window backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NativeWindowError {
    /// Window creation failed.
    #[error("window creation failed: {0}")]
    CreationFailed(String),
    /// The backend cannot perform this operation.
    #[error("operation not supported by this backend: {0}")]
    Unsupported(&'static str),
    /// The window has already been destroyed.
    #[error("window has been destroyed")]
    Destroyed,
}

/// Errors reported by the display capability.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DisplayError {
    /// No display is connected.
    #[error("no displays available")]
    NoDisplays,
    /// The platform query failed.
    #[error("display query failed: {0}")]
    QueryFailed(String),
}

/// Errors raised at the IPC dispatch boundary.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    /// The channel name is not one this shell handles.
    #[error("Unknown IPC channel '{0}'")]
    UnknownChannel(String),

    /// The payload does not have the shape the channel expects.
    #[error("Invalid payload for '{channel}': {source}")]
    InvalidPayload {
        channel: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The handler failed.
    #[error(transparent)]
    Shell(#[from] ShellError),
}
