use serde::{Deserialize, Serialize};

use crate::model::EntitySummary;

/// Raw catalog in fetch order.
///
/// `generation` increases on every [`CatalogStore::replace`]; derived views
/// compare it to decide whether they are stale.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogStore {
    summaries: Vec<EntitySummary>,
    generation: u64,
}

impl CatalogStore {
    pub fn new(summaries: Vec<EntitySummary>) -> Self {
        let mut store = Self::default();
        store.replace(summaries);
        store
    }

    /// Swap in a whole new listing. Returns the new generation.
    pub fn replace(&mut self, summaries: Vec<EntitySummary>) -> u64 {
        self.summaries = summaries;
        self.generation = self.generation.wrapping_add(1);
        tracing::info!(
            entries = self.summaries.len(),
            generation = self.generation,
            "catalog replaced"
        );
        self.generation
    }

    pub fn raw(&self) -> &[EntitySummary] {
        &self.summaries
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.summaries
            .iter()
            .map(|summary| summary.name.clone())
            .collect()
    }
}
