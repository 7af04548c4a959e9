//! In-process registry.

use std::collections::{BTreeMap, HashMap};

use super::{ExportedMember, Registry, RegistryError};

/// Registry held in memory. Published members are visible to the next query.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    /// Map of selector -> (member name -> member).
    selectors: HashMap<String, BTreeMap<String, ExportedMember>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Registry for MemoryRegistry {
    fn publish(&mut self, selector: &str, member: ExportedMember) -> Result<(), RegistryError> {
        self.selectors
            .entry(selector.to_string())
            .or_default()
            .insert(member.request.name.clone(), member);
        Ok(())
    }

    fn withdraw(&mut self, selector: &str, name: &str) -> Result<bool, RegistryError> {
        Ok(self
            .selectors
            .get_mut(selector)
            .map(|members| members.remove(name).is_some())
            .unwrap_or(false))
    }

    fn query_all(&self, selector: &str) -> Result<Vec<ExportedMember>, RegistryError> {
        Ok(self
            .selectors
            .get(selector)
            .map(|members| members.values().cloned().collect())
            .unwrap_or_default())
    }
}
