//! Resolver State
//!
//! Owns the currently installed [`Snapshot`] and the status of the most
//! recent load attempt. A new snapshot is swapped in only after it has fully
//! resolved; readers always see either the old or the new snapshot, never a
//! partial one. A failed load leaves the previous snapshot installed.

use crate::document::ConfigDocument;
use crate::error::LoadFailure;
use crate::resolver::{self, Snapshot};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Status of the most recent load attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    Unloaded,
    Loading,
    Valid,
    Invalid,
}

/// Result of one load attempt
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    Valid(Arc<Snapshot>),
    Invalid(LoadFailure),
}

impl LoadOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, LoadOutcome::Valid(_))
    }

    pub fn failure(&self) -> Option<&LoadFailure> {
        match self {
            LoadOutcome::Valid(_) => None,
            LoadOutcome::Invalid(failure) => Some(failure),
        }
    }

    pub fn into_result(self) -> Result<Arc<Snapshot>, LoadFailure> {
        match self {
            LoadOutcome::Valid(snapshot) => Ok(snapshot),
            LoadOutcome::Invalid(failure) => Err(failure),
        }
    }
}

#[derive(Debug)]
pub struct ResolverState {
    current: RwLock<Option<Arc<Snapshot>>>,
    status: RwLock<LoadStatus>,
    /// Serializes load attempts against each other; dispatch never takes it
    loading: Mutex<()>,
}

impl ResolverState {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
            status: RwLock::new(LoadStatus::Unloaded),
            loading: Mutex::new(()),
        }
    }

    /// Resolve `document` and install it on success
    pub fn load(&self, document: &ConfigDocument) -> LoadOutcome {
        let _guard = self.loading.lock();
        *self.status.write() = LoadStatus::Loading;
        self.finish(resolver::resolve(document))
    }

    /// Parse JSON text, then load it; parse errors are failed loads
    pub fn load_json(&self, text: &str) -> LoadOutcome {
        let _guard = self.loading.lock();
        *self.status.write() = LoadStatus::Loading;
        let outcome = match ConfigDocument::from_json_str(text) {
            Ok(document) => resolver::resolve(&document),
            Err(err) => Err(LoadFailure::from(err)),
        };
        self.finish(outcome)
    }

    /// Record a load that failed before a document existed (unreadable file)
    pub fn fail(&self, failure: LoadFailure) -> LoadOutcome {
        let _guard = self.loading.lock();
        self.finish(Err(failure))
    }

    fn finish(&self, result: Result<Snapshot, LoadFailure>) -> LoadOutcome {
        match result {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                *self.current.write() = Some(Arc::clone(&snapshot));
                *self.status.write() = LoadStatus::Valid;
                info!(
                    messages = snapshot.registry().count_kind(resolver::PayloadKind::Message),
                    bundles = snapshot.registry().count_kind(resolver::PayloadKind::Bundle),
                    sources = snapshot.triggers().len(),
                    destination = %snapshot.destination(),
                    "Configuration installed"
                );
                LoadOutcome::Valid(snapshot)
            }
            Err(failure) => {
                *self.status.write() = LoadStatus::Invalid;
                for diagnostic in failure.diagnostics() {
                    warn!(kind = %diagnostic.kind(), "{}", diagnostic);
                }
                LoadOutcome::Invalid(failure)
            }
        }
    }

    /// The installed snapshot, if any
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.current.read().clone()
    }

    pub fn status(&self) -> LoadStatus {
        *self.status.read()
    }

    /// Whether the most recent load attempt succeeded
    pub fn is_valid(&self) -> bool {
        self.status() == LoadStatus::Valid
    }

    /// Drop the installed snapshot and return to `Unloaded`
    pub fn teardown(&self) {
        let _guard = self.loading.lock();
        *self.current.write() = None;
        *self.status.write() = LoadStatus::Unloaded;
    }
}

impl Default for ResolverState {
    fn default() -> Self {
        Self::new()
    }
}
