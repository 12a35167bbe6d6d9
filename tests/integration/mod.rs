//! Integration tests for configuration resolution, dispatch, and the CLI

mod cli_contracts;
mod dispatch_scenarios;
mod properties;
mod resolver_scenarios;
mod support;
