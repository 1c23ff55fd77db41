//! Application configuration.
//!
//! The configuration is loaded from
//! `$XDG_CONFIG_HOME/paneldeck/config.json`. Every section and field is
//! optional; a minimal `{}` file is valid and everything falls back to
//! compiled-in defaults, so the file only needs to exist on hosts where a
//! tool lives in a non-standard place or a different settings application
//! should be launched.
//!
//! # Example
//!
//! ```json
//! {
//!   "tools": {
//!     "ddcutil": "/usr/local/bin/ddcutil"
//!   },
//!   "launchers": {
//!     "network_settings": "gnome-control-center wifi",
//!     "bluetooth_settings": "blueman-manager"
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// External tool program names or paths.
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Settings applications launched from the panel menu.
    #[serde(default)]
    pub launchers: LauncherConfig,
}

/// Program names (or absolute paths) of the external tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Monitor control tool.
    pub ddcutil: String,
    /// NetworkManager CLI for the Wi-Fi radio.
    pub nmcli: String,
    /// BlueZ CLI for the Bluetooth radio.
    pub bluetoothctl: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ddcutil: "ddcutil".into(),
            nmcli: "nmcli".into(),
            bluetoothctl: "bluetoothctl".into(),
        }
    }
}

/// Command lines spawned (detached) for the "open settings" commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    pub network_settings: String,
    pub bluetooth_settings: String,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            network_settings: "cinnamon-settings network".into(),
            bluetooth_settings: "blueman-manager".into(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);
