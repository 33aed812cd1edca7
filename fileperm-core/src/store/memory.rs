//! In-memory storage.

use parking_lot::RwLock;
use std::collections::HashMap;

use super::{LevelBackend, ResourceDirectory, ResourceId, ResourceKey, StoredLevel};
use crate::error::StorageError;
use crate::level::Level;

#[derive(Debug, Default)]
struct Inner {
    ids: HashMap<ResourceKey, ResourceId>,
    keys: HashMap<ResourceId, ResourceKey>,
    levels: HashMap<ResourceId, Level>,
    next_id: i64,
}

/// In-memory level rows plus a resource registry.
///
/// Everything is lost when the process exits. Useful for tests and for hosts
/// that keep their own persistence elsewhere.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource, returning its id.
    ///
    /// Registering an existing key returns the id it already has.
    pub fn create_resource(&self, key: ResourceKey) -> ResourceId {
        let mut inner = self.inner.write();
        if let Some(id) = inner.ids.get(&key) {
            return *id;
        }
        inner.next_id += 1;
        let id = ResourceId::new(inner.next_id);
        inner.ids.insert(key.clone(), id);
        inner.keys.insert(id, key);
        id
    }

    /// Forget a resource and its level row.
    pub fn delete_resource(&self, resource: ResourceId) -> bool {
        let mut inner = self.inner.write();
        inner.levels.remove(&resource);
        match inner.keys.remove(&resource) {
            Some(key) => {
                inner.ids.remove(&key);
                true
            }
            None => false,
        }
    }

    /// Number of stored level rows.
    pub fn level_count(&self) -> usize {
        self.inner.read().levels.len()
    }
}

impl LevelBackend for MemoryStore {
    fn read_level(&self, resource: ResourceId) -> Result<Option<Level>, StorageError> {
        Ok(self.inner.read().levels.get(&resource).cloned())
    }

    fn upsert_level(&self, resource: ResourceId, level: &Level) -> Result<(), StorageError> {
        self.inner.write().levels.insert(resource, level.clone());
        Ok(())
    }

    fn delete_level(&self, resource: ResourceId) -> Result<bool, StorageError> {
        Ok(self.inner.write().levels.remove(&resource).is_some())
    }

    fn scan_levels(&self) -> Result<Vec<StoredLevel>, StorageError> {
        let inner = self.inner.read();
        let mut rows: Vec<StoredLevel> = inner
            .levels
            .iter()
            .map(|(resource, level)| StoredLevel {
                resource: *resource,
                level: level.clone(),
            })
            .collect();
        rows.sort_by_key(|row| row.resource);
        Ok(rows)
    }
}

impl ResourceDirectory for MemoryStore {
    fn exists(&self, resource: ResourceId) -> Result<bool, StorageError> {
        Ok(self.inner.read().keys.contains_key(&resource))
    }

    fn lookup(&self, key: &ResourceKey) -> Result<Option<ResourceId>, StorageError> {
        Ok(self.inner.read().ids.get(key).copied())
    }

    fn key_of(&self, resource: ResourceId) -> Result<Option<ResourceKey>, StorageError> {
        Ok(self.inner.read().keys.get(&resource).cloned())
    }
}
