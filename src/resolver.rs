//! Configuration Resolver
//!
//! Turns a [`ConfigDocument`] into an immutable [`Snapshot`]: address table,
//! every message and bundle pre-serialized into one combined registry, and the
//! trigger table. Resolution is all-or-nothing; any diagnostic fails the whole
//! load.

pub mod address;
pub mod group;
pub mod message;
pub mod snapshot;
pub mod trigger;

pub use address::AddressTable;
pub use group::GroupResolver;
pub use message::MessageBuilder;
pub use snapshot::{
    Destination, PayloadKind, Registry, ResolvedPayload, Snapshot, MAX_DATAGRAM_SIZE,
};
pub use trigger::TriggerTable;

use crate::document::{ConfigDocument, NamedEntries};
use crate::error::{LoadFailure, ResolveError};
use std::collections::HashSet;
use tracing::{debug, instrument, warn};

/// Resolve a full document into a snapshot
#[instrument(skip_all, fields(host = %document.host, port = document.port))]
pub fn resolve(document: &ConfigDocument) -> Result<Snapshot, LoadFailure> {
    if document.host.trim().is_empty() {
        return Err(ResolveError::MalformedConfiguration("HOST must not be empty".to_string()).into());
    }

    check_duplicates("address", &document.addresses)?;
    check_duplicates("message", &document.messages)?;
    check_duplicates("bundle", &document.bundles)?;
    check_duplicates("source", &document.sources)?;
    check_name_clash(document)?;

    let addresses = AddressTable::from_entries(&document.addresses)?;
    debug!(addresses = addresses.len(), "Address table built");

    let mut registry = Registry::new();
    let builder = MessageBuilder::new(&addresses);
    for (name, definition) in document.messages.iter() {
        let payload = builder.build(name, definition)?;
        registry.insert(name, payload);
    }
    debug!(messages = document.messages.len(), "Messages built");

    GroupResolver::new(&document.bundles).resolve_all(&mut registry)?;
    debug!(bundles = document.bundles.len(), "Bundles resolved");

    for name in registry.oversized(MAX_DATAGRAM_SIZE) {
        warn!(
            name,
            limit = MAX_DATAGRAM_SIZE,
            "Payload exceeds the largest UDP datagram and will fail to send"
        );
    }

    let (triggers, errors) = TriggerTable::from_sources(&document.sources, &registry);
    if !errors.is_empty() {
        return Err(LoadFailure::new(errors));
    }
    debug!(sources = triggers.len(), "Trigger table built");

    let destination = Destination {
        host: document.host.clone(),
        port: document.port,
    };
    Ok(Snapshot::new(destination, addresses, registry, triggers))
}

fn check_duplicates<V>(section: &'static str, entries: &NamedEntries<V>) -> Result<(), ResolveError> {
    match entries.first_duplicate() {
        Some(name) => Err(ResolveError::DuplicateName {
            section,
            name: name.to_string(),
        }),
        None => Ok(()),
    }
}

/// Messages and bundles share one namespace
fn check_name_clash(document: &ConfigDocument) -> Result<(), ResolveError> {
    let messages: HashSet<&str> = document.messages.names().collect();
    match document.bundles.names().find(|name| messages.contains(name)) {
        Some(name) => Err(ResolveError::NameClash {
            name: name.to_string(),
        }),
        None => Ok(()),
    }
}
