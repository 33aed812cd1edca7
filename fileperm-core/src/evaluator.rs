//! Access decisions.

use std::sync::Arc;

use crate::config::Config;
use crate::error::StorageError;
use crate::level::Level;
use crate::store::{LevelStore, Namespace, ResourceId};

/// Supplies the effective groups of the user being checked.
///
/// Hosts typically back this with their membership lookup. The evaluator
/// calls it at most once per decision, and not at all when configuration is
/// invalid.
pub trait GroupSource {
    fn effective_groups(&self) -> Vec<String>;
}

impl<S: AsRef<str>> GroupSource for [S] {
    fn effective_groups(&self) -> Vec<String> {
        self.iter().map(|g| g.as_ref().to_string()).collect()
    }
}

impl<S: AsRef<str>, const N: usize> GroupSource for [S; N] {
    fn effective_groups(&self) -> Vec<String> {
        self.as_slice().effective_groups()
    }
}

impl<S: AsRef<str>> GroupSource for Vec<S> {
    fn effective_groups(&self) -> Vec<String> {
        self.as_slice().effective_groups()
    }
}

/// Answers "can this user access this level / resource" for one request.
///
/// Holds one configuration snapshot and one [`LevelStore`], so every decision
/// in a request sees the same configuration, and the read cache dies with
/// the evaluator.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use fileperm_core::{Config, LevelStore, MemoryStore, PermissionEvaluator, ResourceKey};
///
/// let config = Arc::new(
///     Config::builder()
///         .levels(["public", "confidential"])
///         .grant("legal", ["confidential"])
///         .build(),
/// );
/// let storage = Arc::new(MemoryStore::new());
/// let id = storage.create_resource(ResourceKey::file("Contract.pdf"));
///
/// let evaluator = PermissionEvaluator::new(
///     config.clone(),
///     LevelStore::new(storage.clone(), storage.clone(), config.catalog().clone()),
/// );
/// evaluator.store().set_level(id, "confidential").unwrap();
///
/// assert!(evaluator.can_access_resource(&["legal"], id, 6));
/// assert!(!evaluator.can_access_resource(&["user"], id, 6));
/// ```
#[derive(Debug)]
pub struct PermissionEvaluator {
    config: Arc<Config>,
    store: LevelStore,
}

impl PermissionEvaluator {
    pub fn new(config: Arc<Config>, store: LevelStore) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &LevelStore {
        &self.store
    }

    /// Check if any of the user's groups grants `level`.
    ///
    /// Invalid configuration denies immediately, before `groups` is asked for
    /// anything.
    pub fn can_access_level<G: GroupSource + ?Sized>(&self, groups: &G, level: &str) -> bool {
        if self.config.is_invalid() {
            return false;
        }

        let resolver = self.config.grants();
        groups
            .effective_groups()
            .iter()
            .any(|group| resolver.group_grants_level(group, level))
    }

    /// The level governing `resource`: explicit, else namespace default,
    /// else global default, else `None` (unrestricted).
    pub fn effective_level(
        &self,
        resource: ResourceId,
        namespace: Namespace,
    ) -> Result<Option<Level>, StorageError> {
        if let Some(level) = self.store.get_level(resource)? {
            return Ok(Some(level));
        }
        Ok(self.config.resolve_default(namespace))
    }

    /// Check if the user may access `resource`.
    ///
    /// A resource with no effective level is unrestricted and accessible to
    /// everyone, unless the configuration is invalid: then every resource is
    /// denied, unclassified ones included. If the explicit level cannot be
    /// read, access is denied.
    pub fn can_access_resource<G: GroupSource + ?Sized>(
        &self,
        groups: &G,
        resource: ResourceId,
        namespace: Namespace,
    ) -> bool {
        if self.config.is_invalid() {
            return false;
        }

        match self.effective_level(resource, namespace) {
            Ok(None) => true,
            Ok(Some(level)) => self.can_access_level(groups, level.as_str()),
            Err(e) => {
                log::error!(
                    "Denying access to resource {}: failed to read level: {}",
                    resource,
                    e
                );
                false
            }
        }
    }
}
