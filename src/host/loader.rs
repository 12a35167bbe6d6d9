//! Configuration file loading.

use crate::error::{LoadFailure, ResolveError};
use crate::state::{LoadOutcome, ResolverState};
use std::path::Path;
use tracing::{info, warn};

/// Read, parse, resolve, and install the configuration document at `path`.
///
/// Unreadable files and invalid documents are failed loads; the previously
/// installed snapshot, if any, stays in place.
pub fn load_config_file(state: &ResolverState, path: &Path) -> LoadOutcome {
    let resolved = dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    info!(path = %resolved.display(), "Loading config file");

    let outcome = match std::fs::read_to_string(&resolved) {
        Ok(text) => state.load_json(&text),
        Err(e) => state.fail(LoadFailure::from(ResolveError::MalformedConfiguration(
            format!("\"{}\" is not a readable config file: {}", resolved.display(), e),
        ))),
    };

    match &outcome {
        LoadOutcome::Valid(_) => info!("Config file loaded successfully"),
        LoadOutcome::Invalid(failure) => {
            warn!(errors = failure.diagnostics().len(), "Loading config failed")
        }
    }
    outcome
}
