//! Host integration: reading the configuration file, feeding activation events,
//! and reloading on request or on file change.

mod events;
mod loader;
mod runtime;

pub use events::{parse_input_line, HostEvent};
pub use loader::load_config_file;
pub use runtime::{HostRuntime, RuntimeOptions};
