//! Registration-time cycle detection.

use std::collections::HashSet;
use std::sync::Arc;

use crate::container::Entry;
use crate::key::TypeKey;

/// Whether `declared` is reachable from `start` along registered dependency edges.
///
/// Only entries that already carry a provider contribute edges, so adding the
/// edge `declared -> start` closes a cycle exactly when this returns `true`.
pub(crate) fn reaches(start: &Arc<Entry>, declared: &TypeKey) -> bool {
    let mut visited: HashSet<TypeKey> = HashSet::new();
    let mut stack: Vec<Arc<Entry>> = vec![start.clone()];

    while let Some(entry) = stack.pop() {
        if entry.key() == declared {
            return true;
        }
        if !visited.insert(*entry.key()) {
            continue;
        }
        if let Some(provider) = entry.provider() {
            for dependency in provider.dependencies() {
                if !visited.contains(dependency.key()) {
                    stack.push(dependency.clone());
                }
            }
        }
    }
    false
}
