//! Namespace and global default levels.

use std::collections::BTreeMap;

use crate::level::{Level, LevelCatalog};
use crate::store::Namespace;

/// Resolves the level a resource gets when none was set explicitly.
///
/// Resolution order:
/// 1. Namespace-specific default, if it names a configured level
/// 2. Global default, if it names a configured level
/// 3. `None` (explicit selection required)
///
/// A default that names an unknown level is skipped rather than treated as
/// an error, so one bad namespace entry cannot break every other namespace.
#[derive(Debug, Clone, Default)]
pub struct DefaultResolver {
    catalog: LevelCatalog,
    namespace_defaults: BTreeMap<Namespace, String>,
    global_default: Option<String>,
}

impl DefaultResolver {
    pub fn new(
        catalog: LevelCatalog,
        namespace_defaults: BTreeMap<Namespace, String>,
        global_default: Option<String>,
    ) -> Self {
        Self {
            catalog,
            namespace_defaults,
            global_default,
        }
    }

    /// Resolve the default level for `namespace`.
    pub fn resolve_default(&self, namespace: Namespace) -> Option<Level> {
        if let Some(level) = self.namespace_defaults.get(&namespace) {
            if self.catalog.is_valid_level(level) {
                return Some(Level::new(level.as_str()));
            }
        }

        self.global_default
            .as_deref()
            .filter(|level| self.catalog.is_valid_level(level))
            .map(Level::new)
    }

    /// The configured global default, whether or not it is usable.
    pub fn global_default(&self) -> Option<&str> {
        self.global_default.as_deref()
    }

    /// The configured namespace defaults, whether or not they are usable.
    pub fn namespace_defaults(&self) -> &BTreeMap<Namespace, String> {
        &self.namespace_defaults
    }
}
