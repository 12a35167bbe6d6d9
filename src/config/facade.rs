//! SettingsLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::HostSettings;
use config::ConfigError;
use std::path::{Path, PathBuf};

/// Settings loader facade.
pub struct SettingsLoader;

impl SettingsLoader {
    /// Default settings file (~/.config/osc-sender/settings.toml on Linux)
    pub fn default_settings_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "osc-sender", "osc-sender")
            .map(|dirs| dirs.config_dir().join("settings.toml"))
    }

    /// Load settings from the default file (if present) and environment.
    pub fn load() -> Result<HostSettings, ConfigError> {
        MergeService::load(Self::default_settings_path().as_deref())
    }

    /// Load settings from a specific file, which must exist.
    pub fn load_from_file(path: &Path) -> Result<HostSettings, ConfigError> {
        MergeService::load_from_file(path)
    }
}
