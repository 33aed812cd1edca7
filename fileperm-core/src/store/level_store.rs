//! Request-scoped access to explicit levels.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use super::{LevelBackend, ResourceDirectory, ResourceId};
use crate::error::{LevelError, StorageError};
use crate::level::{Level, LevelCatalog};

/// Reads and writes explicit levels for one unit of work.
///
/// Reads go through a cache owned by this instance. The cache is never shared
/// and is only as fresh as this instance's own reads and writes, so create a
/// new `LevelStore` per request instead of keeping one around.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use fileperm_core::{LevelCatalog, LevelStore, MemoryStore, ResourceKey};
///
/// let storage = Arc::new(MemoryStore::new());
/// let id = storage.create_resource(ResourceKey::file("Plan.pdf"));
/// let store = LevelStore::new(
///     storage.clone(),
///     storage.clone(),
///     LevelCatalog::new(["public", "internal"]),
/// );
///
/// store.set_level(id, "internal").unwrap();
/// assert_eq!(store.get_level(id).unwrap().unwrap(), "internal");
/// ```
pub struct LevelStore {
    backend: Arc<dyn LevelBackend>,
    directory: Arc<dyn ResourceDirectory>,
    catalog: LevelCatalog,
    cache: Mutex<HashMap<ResourceId, Option<Level>>>,
}

impl LevelStore {
    pub fn new(
        backend: Arc<dyn LevelBackend>,
        directory: Arc<dyn ResourceDirectory>,
        catalog: LevelCatalog,
    ) -> Self {
        Self {
            backend,
            directory,
            catalog,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// The explicit level of `resource`, or `None` if none is set.
    ///
    /// A resource that does not exist simply has no level; check existence
    /// separately if it matters. The stored value is returned as-is, even if
    /// it is no longer a configured level.
    pub fn get_level(&self, resource: ResourceId) -> Result<Option<Level>, StorageError> {
        if let Some(cached) = self.cache.lock().get(&resource) {
            return Ok(cached.clone());
        }

        let level = self.backend.read_level(resource)?;
        self.cache.lock().insert(resource, level.clone());
        Ok(level)
    }

    /// Assign `level` to `resource`, replacing any previous level.
    pub fn set_level(&self, resource: ResourceId, level: &str) -> Result<(), LevelError> {
        let level = self.check_write(resource, level)?;
        self.backend.upsert_level(resource, &level)?;
        self.cache.lock().insert(resource, Some(level));
        Ok(())
    }

    /// Like [`set_level`](Self::set_level), also returning the level it replaced.
    ///
    /// The previous value is read before the write, for audit records.
    pub fn replace_level(
        &self,
        resource: ResourceId,
        level: &str,
    ) -> Result<Option<Level>, LevelError> {
        let level = self.check_write(resource, level)?;
        let previous = self.get_level(resource)?;
        self.backend.upsert_level(resource, &level)?;
        self.cache.lock().insert(resource, Some(level));
        Ok(previous)
    }

    /// Remove the explicit level of `resource`. No-op if none is set.
    pub fn remove_level(&self, resource: ResourceId) -> Result<(), StorageError> {
        self.backend.delete_level(resource)?;
        self.cache.lock().insert(resource, None);
        Ok(())
    }

    /// The catalog writes are validated against.
    pub fn catalog(&self) -> &LevelCatalog {
        &self.catalog
    }

    fn check_write(&self, resource: ResourceId, level: &str) -> Result<Level, LevelError> {
        if !self.directory.exists(resource)? {
            return Err(LevelError::ResourceNotFound(resource));
        }
        self.catalog.checked(level)
    }
}

impl std::fmt::Debug for LevelStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LevelStore")
            .field("catalog", &self.catalog)
            .field("cached", &self.cache.lock().len())
            .finish()
    }
}
