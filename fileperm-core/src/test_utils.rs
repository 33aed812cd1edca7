//! Test utilities for fileperm
//!
//! This module provides test doubles for the storage and group-lookup seams.
//! Only available with the `test-utils` feature.
//!
//! # Example
//!
//! ```ignore
//! use fileperm_core::test_utils::{sample_config, SpyGroups};
//!
//! let groups = SpyGroups::new(["sysop"]);
//! // ... evaluate with an invalid configuration ...
//! assert_eq!(groups.calls(), 0);
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::config::Config;
use crate::error::StorageError;
use crate::evaluator::GroupSource;
use crate::level::Level;
use crate::service::FilePermissions;
use crate::store::{
    LevelBackend, MemoryStore, ResourceDirectory, ResourceId, ResourceKey, StoredLevel,
};

/// Group source that counts how often it is asked.
#[derive(Debug, Default)]
pub struct SpyGroups {
    groups: Vec<String>,
    calls: AtomicUsize,
}

impl SpyGroups {
    pub fn new<I, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            groups: groups.into_iter().map(Into::into).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of times the groups were looked up.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl GroupSource for SpyGroups {
    fn effective_groups(&self) -> Vec<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.groups.clone()
    }
}

/// Storage where every call fails.
#[derive(Debug, Default)]
pub struct FailingBackend;

impl FailingBackend {
    fn error() -> StorageError {
        StorageError::Backend("connection refused".to_string())
    }
}

impl LevelBackend for FailingBackend {
    fn read_level(&self, _resource: ResourceId) -> Result<Option<Level>, StorageError> {
        Err(Self::error())
    }

    fn upsert_level(&self, _resource: ResourceId, _level: &Level) -> Result<(), StorageError> {
        Err(Self::error())
    }

    fn delete_level(&self, _resource: ResourceId) -> Result<bool, StorageError> {
        Err(Self::error())
    }

    fn scan_levels(&self) -> Result<Vec<StoredLevel>, StorageError> {
        Err(Self::error())
    }
}

impl ResourceDirectory for FailingBackend {
    fn exists(&self, _resource: ResourceId) -> Result<bool, StorageError> {
        Err(Self::error())
    }

    fn lookup(&self, _key: &ResourceKey) -> Result<Option<ResourceId>, StorageError> {
        Err(Self::error())
    }

    fn key_of(&self, _resource: ResourceId) -> Result<Option<ResourceKey>, StorageError> {
        Err(Self::error())
    }
}

/// A valid three-level configuration.
///
/// - levels: `public`, `internal`, `confidential`
/// - `sysop` has `*`, `staff` has `public` + `internal`, `legal` has
///   `confidential`
/// - files default to `internal`
pub fn sample_config() -> Config {
    Config::builder()
        .levels(["public", "internal", "confidential"])
        .grant("sysop", ["*"])
        .grant("staff", ["public", "internal"])
        .grant("legal", ["confidential"])
        .namespace_default(crate::store::FILE_NAMESPACE, "internal")
        .build()
}

/// [`sample_config`] plus a grant naming a level that does not exist.
pub fn broken_config() -> Config {
    Config::builder()
        .levels(["public", "internal", "confidential"])
        .grant("sysop", ["*"])
        .grant("staff", ["public", "internal", "restricted"])
        .namespace_default(crate::store::FILE_NAMESPACE, "internal")
        .build()
}

/// A service over fresh in-memory storage, plus that storage.
pub fn memory_service(config: Config) -> (Arc<MemoryStore>, Arc<FilePermissions>) {
    let storage = Arc::new(MemoryStore::new());
    let service = Arc::new(FilePermissions::with_storage(config, storage.clone()));
    (storage, service)
}

/// A service whose storage fails every call.
pub fn failing_service(config: Config) -> Arc<FilePermissions> {
    Arc::new(FilePermissions::with_storage(config, Arc::new(FailingBackend)))
}
