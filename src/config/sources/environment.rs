//! Environment variable source: OSC_SENDER_* prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

/// Add environment variable overlay to builder.
/// Uses OSC_SENDER_ prefix and __ as separator for nested keys,
/// e.g. `OSC_SENDER__WATCH__DEBOUNCE_MS=50`.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let builder = builder.add_source(
        Environment::with_prefix("OSC_SENDER")
            .separator("__")
            .try_parsing(true),
    );
    Ok(builder)
}
