//! Group Resolver
//!
//! Resolves bundles whose members reference messages or other bundles,
//! including bundles declared later in the document. Resolution is
//! depth-first and memoized in the combined registry; the depth-first walk
//! runs on an explicit stack so deeply nested bundles cannot overflow the
//! call stack. A bundle reached again while it is still being resolved is a
//! cycle.

use super::snapshot::{PayloadKind, Registry, ResolvedPayload};
use crate::document::NamedEntries;
use crate::error::ResolveError;
use crate::osc::encode_bundle;
use std::collections::{HashMap, HashSet};
use tracing::trace;

/// One bundle whose members are being walked
struct Frame<'a> {
    name: &'a str,
    members: &'a [String],
    next: usize,
}

pub struct GroupResolver<'a> {
    groups: HashMap<&'a str, &'a [String]>,
    order: Vec<&'a str>,
}

impl<'a> GroupResolver<'a> {
    pub fn new(bundles: &'a NamedEntries<Vec<String>>) -> Self {
        let mut groups = HashMap::with_capacity(bundles.len());
        let mut order = Vec::with_capacity(bundles.len());
        for (name, members) in bundles.iter() {
            if groups.insert(name, members.as_slice()).is_none() {
                order.push(name);
            }
        }
        Self { groups, order }
    }

    pub fn is_group(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    /// Resolve every bundle in declaration order
    pub fn resolve_all(&self, registry: &mut Registry) -> Result<(), ResolveError> {
        for name in &self.order {
            if !registry.contains(name) {
                self.build(name, registry)?;
            }
        }
        Ok(())
    }

    /// Resolve bundle `name` and everything it depends on into `registry`.
    ///
    /// Already-cached names return immediately, so calling this again on a
    /// resolved configuration changes nothing.
    pub fn build(&self, name: &str, registry: &mut Registry) -> Result<(), ResolveError> {
        if registry.contains(name) {
            return Ok(());
        }
        let (root, members) = self
            .groups
            .get_key_value(name)
            .map(|(k, v)| (*k, *v))
            .ok_or_else(|| ResolveError::UnresolvedMember {
                group: name.to_string(),
                member: name.to_string(),
            })?;

        let mut in_progress: HashSet<&str> = HashSet::new();
        in_progress.insert(root);
        let mut stack = vec![Frame {
            name: root,
            members,
            next: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            let members = frame.members;
            if let Some(member) = members.get(frame.next) {
                let member = member.as_str();
                if registry.contains(member) {
                    frame.next += 1;
                    continue;
                }
                if in_progress.contains(member) {
                    let start = stack
                        .iter()
                        .position(|f| f.name == member)
                        .unwrap_or(0);
                    let mut path: Vec<String> =
                        stack[start..].iter().map(|f| f.name.to_string()).collect();
                    path.push(member.to_string());
                    return Err(ResolveError::Cycle {
                        name: member.to_string(),
                        path,
                    });
                }
                match self.groups.get_key_value(member) {
                    Some((child, child_members)) => {
                        trace!(bundle = frame.name, dependency = *child, "Resolving forward reference");
                        in_progress.insert(*child);
                        stack.push(Frame {
                            name: *child,
                            members: *child_members,
                            next: 0,
                        });
                    }
                    None => {
                        return Err(ResolveError::UnresolvedMember {
                            group: frame.name.to_string(),
                            member: member.to_string(),
                        });
                    }
                }
            } else if let Some(done) = stack.pop() {
                // A child frame is popped before its parent advances, so every
                // member is cached by now
                let bytes = encode_bundle(
                    done.members
                        .iter()
                        .filter_map(|m| registry.get(m).map(ResolvedPayload::bytes)),
                );
                registry.insert(done.name, ResolvedPayload::new(PayloadKind::Bundle, bytes));
                in_progress.remove(done.name);
                trace!(bundle = done.name, members = done.members.len(), "Bundle resolved");
            }
        }
        Ok(())
    }
}
