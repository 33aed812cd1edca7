//! Shared entry point for hosts.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::config::{validate_config, Config, ConfigHandle, ConfigValidity, RawConfig};
use crate::error::LevelError;
use crate::evaluator::PermissionEvaluator;
use crate::level::Level;
use crate::store::{LevelBackend, LevelStore, Namespace, ResourceDirectory, ResourceId};

/// Record of one successful level change, handed to the host's audit log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelChange {
    pub actor: String,
    pub resource: ResourceId,
    pub old_level: Option<Level>,
    pub new_level: Level,
    pub changed_at: DateTime<Utc>,
}

impl LevelChange {
    /// The previous level, or `(none)` when there was none.
    pub fn old_level_label(&self) -> &str {
        self.old_level.as_ref().map_or("(none)", Level::as_str)
    }
}

/// Long-lived policy service.
///
/// Owns the configuration handle and storage, and hands out request-scoped
/// [`PermissionEvaluator`]s and [`LevelStore`]s. Share it behind an `Arc`.
pub struct FilePermissions {
    config: ConfigHandle,
    backend: Arc<dyn LevelBackend>,
    directory: Arc<dyn ResourceDirectory>,
}

impl FilePermissions {
    pub fn new(
        config: ConfigHandle,
        backend: Arc<dyn LevelBackend>,
        directory: Arc<dyn ResourceDirectory>,
    ) -> Self {
        Self {
            config,
            backend,
            directory,
        }
    }

    /// Build from a single storage value implementing both seams.
    pub fn with_storage<S>(config: Config, storage: Arc<S>) -> Self
    where
        S: LevelBackend + ResourceDirectory + 'static,
    {
        Self::new(ConfigHandle::new(config), storage.clone(), storage)
    }

    /// Current configuration snapshot.
    pub fn config(&self) -> Arc<Config> {
        self.config.snapshot()
    }

    /// An evaluator for one request, over the current snapshot.
    pub fn evaluator(&self) -> PermissionEvaluator {
        let config = self.config.snapshot();
        let store = self.store_for(&config);
        PermissionEvaluator::new(config, store)
    }

    /// A level store for one unit of work, validating against the current
    /// snapshot's catalog.
    pub fn level_store(&self) -> LevelStore {
        self.store_for(&self.config.snapshot())
    }

    pub fn backend(&self) -> &Arc<dyn LevelBackend> {
        &self.backend
    }

    pub fn directory(&self) -> &Arc<dyn ResourceDirectory> {
        &self.directory
    }

    /// Swap in configuration built from `raw`.
    ///
    /// Evaluators already handed out keep the snapshot they started with.
    pub fn reload(&self, raw: &RawConfig) -> ConfigValidity {
        let validity = self.config.reload(raw);
        log::info!("Permission configuration reloaded ({})", validity);
        validity
    }

    pub fn resolve_default(&self, namespace: Namespace) -> Option<Level> {
        self.config.snapshot().resolve_default(namespace)
    }

    pub fn validate_config(&self, raw: &RawConfig) -> (bool, Vec<String>) {
        validate_config(raw)
    }

    /// Set the level of `resource`, returning what changed for auditing.
    pub fn change_level(
        &self,
        actor: &str,
        resource: ResourceId,
        level: &str,
    ) -> Result<LevelChange, LevelError> {
        let store = self.level_store();
        let old_level = store.replace_level(resource, level)?;
        Ok(LevelChange {
            actor: actor.to_string(),
            resource,
            old_level,
            new_level: Level::new(level),
            changed_at: Utc::now(),
        })
    }

    fn store_for(&self, config: &Config) -> LevelStore {
        LevelStore::new(
            Arc::clone(&self.backend),
            Arc::clone(&self.directory),
            config.catalog().clone(),
        )
    }
}

impl std::fmt::Debug for FilePermissions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilePermissions")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
