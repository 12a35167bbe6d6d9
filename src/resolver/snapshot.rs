//! Resolved payloads, the combined registry, and the configuration snapshot.

use super::address::AddressTable;
use super::trigger::TriggerTable;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Largest payload a single UDP/IPv4 datagram can carry
pub const MAX_DATAGRAM_SIZE: usize = 65_507;

/// Whether a payload came from a message or a bundle definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadKind {
    Message,
    Bundle,
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadKind::Message => f.write_str("message"),
            PayloadKind::Bundle => f.write_str("bundle"),
        }
    }
}

/// Immutable serialized form of one message or bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPayload {
    kind: PayloadKind,
    bytes: Box<[u8]>,
}

impl ResolvedPayload {
    pub fn new(kind: PayloadKind, bytes: Vec<u8>) -> Self {
        Self {
            kind,
            bytes: bytes.into_boxed_slice(),
        }
    }

    pub fn kind(&self) -> PayloadKind {
        self.kind
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Combined message + bundle namespace
///
/// Owns every resolved payload. Names iterate in resolution order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    payloads: HashMap<String, ResolvedPayload>,
    order: Vec<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedPayload> {
        self.payloads.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.payloads.contains_key(name)
    }

    /// Cache a payload under `name`; an existing entry is kept as is
    pub fn insert(&mut self, name: &str, payload: ResolvedPayload) {
        if !self.payloads.contains_key(name) {
            self.order.push(name.to_string());
            self.payloads.insert(name.to_string(), payload);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResolvedPayload)> {
        self.order
            .iter()
            .filter_map(|name| self.payloads.get(name).map(|p| (name.as_str(), p)))
    }

    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }

    pub fn count_kind(&self, kind: PayloadKind) -> usize {
        self.payloads.values().filter(|p| p.kind == kind).count()
    }

    /// Names of payloads larger than `limit` bytes, in resolution order
    pub fn oversized(&self, limit: usize) -> Vec<&str> {
        self.iter()
            .filter(|(_, payload)| payload.bytes().len() > limit)
            .map(|(name, _)| name)
            .collect()
    }
}

/// Transport endpoint payloads are sent to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Destination {
    pub host: String,
    pub port: u16,
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Complete result of one successful load
///
/// Only ever constructed fully resolved; never mutated after construction.
#[derive(Debug, Clone)]
pub struct Snapshot {
    destination: Destination,
    addresses: AddressTable,
    registry: Registry,
    triggers: TriggerTable,
}

impl Snapshot {
    pub(crate) fn new(
        destination: Destination,
        addresses: AddressTable,
        registry: Registry,
        triggers: TriggerTable,
    ) -> Self {
        Self {
            destination,
            addresses,
            registry,
            triggers,
        }
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn addresses(&self) -> &AddressTable {
        &self.addresses
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn triggers(&self) -> &TriggerTable {
        &self.triggers
    }

    /// Resolve a trigger to its target name and payload
    pub fn payload_for_trigger(&self, trigger: &str) -> Option<(&str, &ResolvedPayload)> {
        let target = self.triggers.target(trigger)?;
        self.registry.get(target).map(|payload| (target, payload))
    }
}
