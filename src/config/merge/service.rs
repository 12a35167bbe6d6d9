//! MergeService: orchestrates sources, applies merge policy, deserializes to HostSettings.

use crate::config::sources::{environment, settings_file};
use crate::config::HostSettings;
use config::ConfigError;
use std::path::Path;

use super::builder_with_defaults;

/// Merge service for settings composition.
pub struct MergeService;

impl MergeService {
    /// Load settings from the default file and the environment.
    /// Precedence: defaults (lowest) -> settings file -> environment (highest).
    pub fn load(default_file: Option<&Path>) -> Result<HostSettings, ConfigError> {
        let builder = builder_with_defaults()?;
        let builder = match default_file {
            Some(path) => settings_file::add_to_builder(builder, path, false)?,
            None => builder,
        };
        let builder = environment::add_to_builder(builder)?;

        builder.build()?.try_deserialize()
    }

    /// Load settings from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<HostSettings, ConfigError> {
        let builder = builder_with_defaults()?;
        let builder = settings_file::add_to_builder(builder, path, true)?;
        let builder = environment::add_to_builder(builder)?;

        builder.build()?.try_deserialize()
    }
}
