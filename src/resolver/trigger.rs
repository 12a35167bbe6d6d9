//! Trigger Table: source names to registry names.

use super::snapshot::Registry;
use crate::document::NamedEntries;
use crate::error::ResolveError;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerTable {
    targets: HashMap<String, String>,
}

impl TriggerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one trigger; the target must already be resolved in `registry`
    pub fn register(
        &mut self,
        trigger: &str,
        target: &str,
        registry: &Registry,
    ) -> Result<(), ResolveError> {
        if !registry.contains(target) {
            return Err(ResolveError::UnknownTarget {
                trigger: trigger.to_string(),
                target: target.to_string(),
            });
        }
        self.targets.insert(trigger.to_string(), target.to_string());
        Ok(())
    }

    /// Register every source entry.
    ///
    /// Each entry is validated on its own: invalid entries are returned as
    /// errors while the valid ones are still registered.
    pub fn from_sources(
        sources: &NamedEntries<String>,
        registry: &Registry,
    ) -> (Self, Vec<ResolveError>) {
        let mut table = Self::new();
        let errors = sources
            .iter()
            .filter_map(|(trigger, target)| table.register(trigger, target, registry).err())
            .collect();
        (table, errors)
    }

    pub fn target(&self, trigger: &str) -> Option<&str> {
        self.targets.get(trigger).map(String::as_str)
    }

    /// Triggers that fire `target`, sorted
    pub fn triggers_for(&self, target: &str) -> Vec<&str> {
        let mut triggers: Vec<&str> = self
            .targets
            .iter()
            .filter(|(_, t)| t.as_str() == target)
            .map(|(trigger, _)| trigger.as_str())
            .collect();
        triggers.sort_unstable();
        triggers
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
