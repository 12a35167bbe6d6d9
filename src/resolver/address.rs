//! Address Table: symbolic address names to OSC address paths.

use crate::document::NamedEntries;
use crate::error::ResolveError;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressTable {
    paths: HashMap<String, String>,
}

impl AddressTable {
    /// Build the table in one pass over the raw entries.
    ///
    /// Paths must be OSC address patterns: starting with `/`, no NUL.
    /// Duplicate names are rejected before this runs, so a repeated name here
    /// simply overwrites.
    pub fn from_entries(entries: &NamedEntries<String>) -> Result<Self, ResolveError> {
        let mut paths = HashMap::with_capacity(entries.len());
        for (name, path) in entries.iter() {
            if !path.starts_with('/') {
                return Err(ResolveError::MalformedConfiguration(format!(
                    "address \"{}\" path \"{}\" must begin with '/'",
                    name, path
                )));
            }
            if path.contains('\0') {
                return Err(ResolveError::MalformedConfiguration(format!(
                    "address \"{}\" path contains a NUL character",
                    name
                )));
            }
            paths.insert(name.to_string(), path.clone());
        }
        Ok(Self { paths })
    }

    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.paths.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
