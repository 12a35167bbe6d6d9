//! Merge policy and service for settings composition.

pub mod service;

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError};

/// Builder seeded with the values every layer may override.
pub(crate) fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    config::Config::builder()
        .set_default("verbose", false)?
        .set_default("watch.enabled", true)?
        .set_default("watch.debounce_ms", 200)
}
