//! Environment assignment: which maps use which asset set

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::FileId;

/// Environment used when the document lists none
pub const FALLBACK_ENVIRONMENT: &str = "green_cave";

/// `{ env_name: [file_id, ...] }`, kept in insertion order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Environments(IndexMap<String, IndexSet<FileId>>);

impl Default for Environments {
    fn default() -> Self {
        let mut envs = IndexMap::new();
        envs.insert("green_cave".to_string(), IndexSet::from([0, 1, 2]));
        envs.insert("blue_cave".to_string(), IndexSet::new());
        Self(envs)
    }
}

impl Environments {
    /// An empty document
    pub fn empty() -> Self {
        Self(IndexMap::new())
    }

    /// Environment names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// File ids listed under an environment
    pub fn members(&self, name: &str) -> Option<&IndexSet<FileId>> {
        self.0.get(name)
    }

    /// Environment that lists `file_id`; the first one wins if several do
    pub fn owner(&self, file_id: FileId) -> Option<&str> {
        self.0
            .iter()
            .find(|(_, ids)| ids.contains(&file_id))
            .map(|(name, _)| name.as_str())
    }

    /// Environment of a map, defaulting unclassified maps to the first
    /// environment (or the fallback name when there are none)
    pub fn environment_of(&self, file_id: FileId) -> &str {
        self.owner(file_id)
            .or_else(|| self.0.keys().next().map(String::as_str))
            .unwrap_or(FALLBACK_ENVIRONMENT)
    }

    /// Assign a map to an environment, removing it from every other one
    pub fn assign(&mut self, file_id: FileId, name: &str) {
        for (env, ids) in self.0.iter_mut() {
            if env != name {
                ids.shift_remove(&file_id);
            }
        }
        self.0.entry(name.to_string()).or_default().insert(file_id);
    }

    /// Rewrite file ids through a renumbering, dropping unmapped ids.
    /// Environments themselves are kept even when they end up empty.
    pub fn renumber(&mut self, mapping: &HashMap<FileId, FileId>) {
        for ids in self.0.values_mut() {
            *ids = ids.iter().filter_map(|id| mapping.get(id).copied()).collect();
        }
    }
}
