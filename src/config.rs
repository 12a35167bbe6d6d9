//! Host Settings
//!
//! Settings for the host integration (where the configuration document lives,
//! verbosity, config-file watching, logging). These are distinct from the
//! configuration document itself, which the resolver consumes.

mod facade;
mod merge;
mod sources;

pub use facade::SettingsLoader;

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_debounce_ms() -> u64 {
    200
}

fn default_true() -> bool {
    true
}

/// Config-file watching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchSettings {
    /// Reload when the configuration document changes on disk
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Quiet period before a burst of file events triggers one reload
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

/// Host settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostSettings {
    /// Path to the JSON configuration document
    #[serde(default)]
    pub config_path: Option<PathBuf>,

    /// Log every source activation at info level
    #[serde(default)]
    pub verbose: bool,

    #[serde(default)]
    pub watch: WatchSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl HostSettings {
    /// Render as TOML, the settings file format
    pub fn to_toml(&self) -> Result<String, crate::error::ApiError> {
        toml::to_string_pretty(self)
            .map_err(|e| crate::error::ApiError::Serialization(e.to_string()))
    }
}
