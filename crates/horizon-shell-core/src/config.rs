//! Shell configuration.
//!
//! All tunables of the window registry and the tooltip manager live in
//! [`ShellConfig`]. Every field has a default, so a configuration file only
//! needs to name the values it changes:
//!
//! ```
//! use horizon_shell_core::ShellConfig;
//!
//! let config = ShellConfig::from_toml_str(r#"
//! [windows]
//! default_width = 1024
//! open_links_external = false
//!
//! [tooltip]
//! hide_delay_ms = 200
//! "#).unwrap();
//!
//! assert_eq!(config.windows.default_width, 1024);
//! assert_eq!(config.windows.default_height, 670);
//! assert_eq!(config.tooltip.hide_delay_ms, 200);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::geometry::Size;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Window creation and positioning defaults.
    pub windows: WindowDefaults,
    /// Tooltip manager tunables.
    pub tooltip: TooltipDefaults,
}

impl ShellConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(target: "horizon_shell_core::config", path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Serialize this configuration to TOML text.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Defaults applied to every window the registry creates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowDefaults {
    /// Default window width.
    pub default_width: i32,
    /// Default window height.
    pub default_height: i32,
    /// Keep new windows above normal windows.
    pub always_on_top: bool,
    /// Hide the menu bar until Alt is pressed.
    pub auto_hide_menu_bar: bool,
    /// Whether windows can be closed by the user.
    pub closable: bool,
    /// Show windows immediately on creation instead of on ready-to-show.
    pub show: bool,
    /// Global default for opening unclassified links in the system browser.
    pub open_links_external: bool,
    /// Minimum interval between follower repositions while a parent moves.
    pub move_throttle_ms: u64,
    /// Default reveal animation tick.
    pub animation_tick_ms: u64,
    /// Default reveal animation starting offset, x.
    pub animation_offset_x: i32,
    /// Default reveal animation starting offset, y.
    pub animation_offset_y: i32,
}

impl WindowDefaults {
    /// Default window size.
    pub fn default_size(&self) -> Size {
        Size::new(self.default_width, self.default_height)
    }

    /// Follower reposition throttle interval.
    pub fn move_throttle(&self) -> Duration {
        Duration::from_millis(self.move_throttle_ms)
    }

    /// Default reveal animation tick.
    pub fn animation_tick(&self) -> Duration {
        Duration::from_millis(self.animation_tick_ms)
    }
}

impl Default for WindowDefaults {
    fn default() -> Self {
        Self {
            default_width: 900,
            default_height: 670,
            always_on_top: true,
            auto_hide_menu_bar: true,
            closable: true,
            show: false,
            open_links_external: true,
            move_throttle_ms: 50,
            animation_tick_ms: 16,
            animation_offset_x: 0,
            animation_offset_y: -50,
        }
    }
}

/// Tooltip manager tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TooltipDefaults {
    /// Grace period before hiding after the pointer leaves.
    pub hide_delay_ms: u64,
    /// Gap between anchor and tooltip.
    pub default_offset: f64,
    /// Maximum tooltip width when the content does not set one.
    pub default_max_width: f64,
    /// Assumed content width before the first size report.
    pub initial_content_width: i32,
    /// Assumed content height before the first size report.
    pub initial_content_height: i32,
    /// Width of the auxiliary window at creation.
    pub window_width: i32,
    /// Height of the auxiliary window at creation.
    pub window_height: i32,
}

impl TooltipDefaults {
    /// Hide grace period.
    pub fn hide_delay(&self) -> Duration {
        Duration::from_millis(self.hide_delay_ms)
    }

    /// Assumed content size before the first report.
    pub fn initial_content_size(&self) -> Size {
        Size::new(self.initial_content_width, self.initial_content_height)
    }

    /// Auxiliary window size at creation.
    pub fn window_size(&self) -> Size {
        Size::new(self.window_width, self.window_height)
    }
}

impl Default for TooltipDefaults {
    fn default() -> Self {
        Self {
            hide_delay_ms: 120,
            default_offset: 10.0,
            default_max_width: 320.0,
            initial_content_width: 220,
            initial_content_height: 40,
            window_width: 240,
            window_height: 60,
        }
    }
}
