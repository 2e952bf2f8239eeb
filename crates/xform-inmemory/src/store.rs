//! Concurrent id → transformation map

use crate::config::{ConfigError, InMemoryConfig};
use crate::transformation::InMemoryTransformation;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use xform_core::EntityId;

/// Process-wide map of live transformations
///
/// Every operation is linearizable per key; no external locking needed.
#[derive(Debug, Default)]
pub struct TransformationStore {
    map: DashMap<EntityId, Arc<InMemoryTransformation>>,
}

impl TransformationStore {
    /// Create empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create store sized by `config`
    ///
    /// # Errors
    /// [`ConfigError::InvalidShardAmount`]
    pub fn with_config(config: &InMemoryConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let map = match config.shard_amount {
            Some(shards) => DashMap::with_capacity_and_shard_amount(config.initial_capacity, shards),
            None => DashMap::with_capacity(config.initial_capacity),
        };
        Ok(Self { map })
    }

    /// Insert unless the id is taken; returns whether it was inserted
    pub fn insert_if_absent(&self, transformation: Arc<InMemoryTransformation>) -> bool {
        match self.map.entry(transformation.core().id().clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(transformation);
                true
            }
        }
    }

    /// Transformation by id
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<InMemoryTransformation>> {
        self.map.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// Remove by id
    pub fn remove(&self, id: &str) -> Option<Arc<InMemoryTransformation>> {
        self.map.remove(id).map(|(_, transformation)| transformation)
    }

    /// Remove only if `id` still maps to exactly `transformation`
    pub(crate) fn remove_instance(&self, transformation: &InMemoryTransformation) -> bool {
        self.map
            .remove_if(transformation.core().id().as_str(), |_, stored| {
                std::ptr::eq(Arc::as_ptr(stored), transformation)
            })
            .is_some()
    }

    /// Number of transformations
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether no transformation is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Identifiers currently stored, sorted
    #[must_use]
    pub fn ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<_> = self.map.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        ids
    }
}
