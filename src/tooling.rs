//! Tooling & Integration Layer
//!
//! Command-line entry points over the resolver and host runtime.

pub mod cli;

pub use cli::{Cli, CliContext, Commands, OutputFormat};
