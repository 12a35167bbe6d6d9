//! Configuration Document
//!
//! The parsed form of the JSON configuration consumed by the resolver. The
//! document is purely structural: section maps keep declaration order and
//! keep duplicate keys so that the resolver can report them, and message
//! arguments stay as raw JSON values until the message builder decodes them.

use crate::error::ResolveError;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;

/// Ordered `name -> value` entries of one section, duplicates preserved
#[derive(Debug, Clone, PartialEq)]
pub struct NamedEntries<V>(Vec<(String, V)>);

impl<V> NamedEntries<V> {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First name that appears more than once, in declaration order
    pub fn first_duplicate(&self) -> Option<&str> {
        let mut seen = std::collections::HashSet::with_capacity(self.0.len());
        self.names().find(|name| !seen.insert(*name))
    }
}

impl<V> Default for NamedEntries<V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<V> FromIterator<(String, V)> for NamedEntries<V> {
    fn from_iter<T: IntoIterator<Item = (String, V)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

struct NamedEntriesVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for NamedEntriesVisitor<V> {
    type Value = NamedEntries<V>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of names to definitions")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, V>()? {
            entries.push((key, value));
        }
        Ok(NamedEntries(entries))
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for NamedEntries<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(NamedEntriesVisitor(PhantomData))
    }
}

/// One `MESSAGES` entry
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessageDefinition {
    /// Name of an `ADDRESSES` entry
    #[serde(rename = "ADDRESS")]
    pub address: String,
    /// Loosely-typed arguments, decoded when the message is built
    #[serde(rename = "ARGUMENTS", default)]
    pub arguments: Vec<Value>,
}

/// The full configuration document
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConfigDocument {
    #[serde(rename = "HOST")]
    pub host: String,
    #[serde(rename = "PORT")]
    pub port: u16,
    #[serde(rename = "ADDRESSES")]
    pub addresses: NamedEntries<String>,
    #[serde(rename = "MESSAGES")]
    pub messages: NamedEntries<MessageDefinition>,
    /// Bundle name -> ordered member names
    #[serde(rename = "BUNDLES")]
    pub bundles: NamedEntries<Vec<String>>,
    /// Source (trigger) name -> message or bundle name
    #[serde(rename = "SOURCES")]
    pub sources: NamedEntries<String>,
}

impl ConfigDocument {
    /// Parse a document from JSON text
    pub fn from_json_str(text: &str) -> Result<Self, ResolveError> {
        serde_json::from_str(text).map_err(malformed)
    }

    /// Interpret an already-parsed JSON value as a document
    pub fn from_value(value: Value) -> Result<Self, ResolveError> {
        serde_json::from_value(value).map_err(malformed)
    }
}

fn malformed(err: serde_json::Error) -> ResolveError {
    ResolveError::MalformedConfiguration(err.to_string())
}
