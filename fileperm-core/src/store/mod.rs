//! Persisted explicit levels.
//!
//! The only persisted state in this crate is one `(resource id, level)` row
//! per resource. Storage is split across two seams:
//!
//! - **[`LevelBackend`]**: reads and upserts level rows
//! - **[`ResourceDirectory`]**: the host's view of which resources exist
//!
//! [`LevelStore`] combines them with the configured catalog and a cache that
//! lives exactly as long as the store instance. Build a fresh store per
//! request; never keep one around across requests.

mod level_store;
mod memory;

pub use level_store::LevelStore;
pub use memory::MemoryStore;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::StorageError;
use crate::level::Level;

/// Integer namespace identifier supplied by the host.
pub type Namespace = i32;

/// Namespace that file resources live in.
pub const FILE_NAMESPACE: Namespace = 6;

/// Stable identity of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(i64);

impl ResourceId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ResourceId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Identifies a resource by name before its id is known.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceKey {
    pub namespace: Namespace,
    pub key: String,
}

impl ResourceKey {
    pub fn new(namespace: Namespace, key: impl Into<String>) -> Self {
        Self {
            namespace,
            key: key.into(),
        }
    }

    /// Key in the file namespace.
    pub fn file(key: impl Into<String>) -> Self {
        Self::new(FILE_NAMESPACE, key)
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.key)
    }
}

/// One persisted level row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredLevel {
    pub resource: ResourceId,
    pub level: Level,
}

/// Storage for level rows, keyed uniquely by resource id.
///
/// Writes are upserts; implementations must never read-modify-write. Reads
/// return the stored string as-is, even if it is no longer configured.
pub trait LevelBackend: Send + Sync {
    /// The stored level for `resource`, or `None` if no row exists.
    fn read_level(&self, resource: ResourceId) -> Result<Option<Level>, StorageError>;

    /// Insert or replace the row for `resource`.
    fn upsert_level(&self, resource: ResourceId, level: &Level) -> Result<(), StorageError>;

    /// Remove the row for `resource`.
    ///
    /// Returns `true` if a row was removed, `false` if there was none.
    fn delete_level(&self, resource: ResourceId) -> Result<bool, StorageError>;

    /// Every stored row, for reconciliation scans.
    fn scan_levels(&self) -> Result<Vec<StoredLevel>, StorageError>;
}

/// The host's record of which resources exist.
pub trait ResourceDirectory: Send + Sync {
    /// Check if `resource` currently exists.
    fn exists(&self, resource: ResourceId) -> Result<bool, StorageError>;

    /// Resolve a key to an id, reading the latest committed state.
    fn lookup(&self, key: &ResourceKey) -> Result<Option<ResourceId>, StorageError>;

    /// Reverse lookup, for reports.
    fn key_of(&self, resource: ResourceId) -> Result<Option<ResourceKey>, StorageError>;
}
