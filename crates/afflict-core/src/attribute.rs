//! Per-entity attribute storage
//!
//! Each entity carries a flat key/value bag. The effect engine is the
//! sole writer of effect-owned keys (presence flags and stack counters);
//! arbitrary external observers may read anything.

use crate::{AttrValue, EntityId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Storage for every entity's attribute bag
///
/// Uses IndexMap to preserve insertion order (deterministic iteration
/// and serialization).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttributeStore {
    entities: IndexMap<EntityId, IndexMap<String, AttrValue>>,
}

impl AttributeStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get an attribute value
    pub fn get(&self, entity: EntityId, key: &str) -> Option<&AttrValue> {
        self.entities.get(&entity).and_then(|attrs| attrs.get(key))
    }

    /// Get a boolean attribute
    pub fn get_bool(&self, entity: EntityId, key: &str) -> Option<bool> {
        self.get(entity, key).and_then(|v| v.as_bool())
    }

    /// Get an integer attribute or a default when absent/mistyped
    pub fn get_int_or(&self, entity: EntityId, key: &str, default: i64) -> i64 {
        self.get(entity, key).and_then(|v| v.as_int()).unwrap_or(default)
    }

    /// Set an attribute, returning the previous value if any
    pub fn set(
        &mut self,
        entity: EntityId,
        key: impl Into<String>,
        value: impl Into<AttrValue>,
    ) -> Option<AttrValue> {
        self.entities
            .entry(entity)
            .or_default()
            .insert(key.into(), value.into())
    }

    /// Remove an attribute, returning the previous value if any
    pub fn clear(&mut self, entity: EntityId, key: &str) -> Option<AttrValue> {
        self.entities
            .get_mut(&entity)
            .and_then(|attrs| attrs.shift_remove(key))
    }

    /// Drop every attribute an entity carries
    pub fn clear_entity(&mut self, entity: EntityId) {
        self.entities.shift_remove(&entity);
    }

    /// Iterate over one entity's attributes
    pub fn iter_entity(&self, entity: EntityId) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entities
            .get(&entity)
            .into_iter()
            .flat_map(|attrs| attrs.iter().map(|(k, v)| (k.as_str(), v)))
    }

    /// Number of attributes stored for an entity
    pub fn entity_len(&self, entity: EntityId) -> usize {
        self.entities.get(&entity).map_or(0, |attrs| attrs.len())
    }
}
