use std::collections::HashMap;

use pipette_core::condition::{normalize_name, Condition};

/// Conditions every requester placed on each package during one run.
///
/// Entries are never removed and their condition lists only grow.
#[derive(Debug, Default)]
pub struct LocalRegistry {
    entries: HashMap<String, Vec<Condition>>,
}

impl LocalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Union `conditions` into the entry for `name`, creating it if needed.
    pub fn record(&mut self, name: &str, conditions: &[Condition]) {
        let entry = self.entries.entry(normalize_name(name)).or_default();
        for condition in conditions {
            if !entry.contains(condition) {
                entry.push(condition.clone());
            }
        }
    }

    /// Accumulated conditions, `None` if `name` was never processed.
    pub fn conditions(&self, name: &str) -> Option<&[Condition]> {
        self.entries.get(&normalize_name(name)).map(Vec::as_slice)
    }
}
