//! Configuration snapshot and reload handle.
//!
//! A [`Config`] is built once from [`RawConfig`], validated, and never
//! mutated. Components borrow it; reload means building a new snapshot and
//! swapping the `Arc` inside a [`ConfigHandle`].
//!
//! # Example
//!
//! ```rust
//! use fileperm_core::{Config, ConfigValidity};
//!
//! let config = Config::builder()
//!     .levels(["public", "internal", "public"])
//!     .grant("sysop", ["*"])
//!     .grant("staff", ["public", "internal"])
//!     .namespace_default(6, "internal")
//!     .build();
//!
//! assert_eq!(config.validity(), ConfigValidity::Valid);
//! assert_eq!(config.catalog().len(), 2);
//! assert_eq!(config.resolve_default(6).unwrap(), "internal");
//! ```

mod raw;
mod validate;

pub use raw::{ConfigBuilder, RawConfig, DEFAULT_LEVELS};
pub use validate::{validate, ConfigIssue, ValidationReport};

use parking_lot::RwLock;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use crate::defaults::DefaultResolver;
use crate::grant::{GrantResolver, GrantSet, GroupGrant, LevelGroupMap};
use crate::level::{Level, LevelCatalog};
use crate::store::Namespace;

/// Whether the loaded configuration is usable.
///
/// `Invalid` makes every access decision deny, regardless of grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigValidity {
    #[default]
    Valid,
    Invalid,
}

impl ConfigValidity {
    pub fn is_invalid(self) -> bool {
        self == ConfigValidity::Invalid
    }
}

impl std::fmt::Display for ConfigValidity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigValidity::Valid => write!(f, "valid"),
            ConfigValidity::Invalid => write!(f, "invalid"),
        }
    }
}

/// Validate raw configuration: `(is_valid, messages)`.
///
/// `is_valid` is true only when `messages` is empty.
pub fn validate_config(raw: &RawConfig) -> (bool, Vec<String>) {
    let report = validate(raw);
    (report.is_valid(), report.messages())
}

/// Immutable configuration snapshot.
#[derive(Debug)]
pub struct Config {
    catalog: LevelCatalog,
    grants: GrantResolver,
    defaults: DefaultResolver,
    validity: ConfigValidity,
    issues: Vec<ConfigIssue>,
}

impl Config {
    /// Start building a configuration in code.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Validate `raw`, log every problem, and build the snapshot.
    ///
    /// Never fails: an invalid configuration still produces a snapshot, one
    /// that denies everything.
    pub fn from_raw(raw: &RawConfig) -> Self {
        let report = validate(raw);
        report.log();
        Self::assemble(raw, report)
    }

    /// Load from a `.toml`/`.json` file.
    ///
    /// An unreadable file yields a fail-closed snapshot.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match RawConfig::from_path(path) {
            Ok(raw) => Self::from_raw(&raw),
            Err(e) => {
                let issue = ConfigIssue::Unreadable(format!("{}: {}", path.display(), e));
                log::warn!("Invalid configuration - {}", issue);
                Self::fail_closed(vec![issue])
            }
        }
    }

    /// A snapshot with no levels that denies every decision.
    pub fn fail_closed(issues: Vec<ConfigIssue>) -> Self {
        Self {
            catalog: LevelCatalog::empty(),
            grants: GrantResolver::default(),
            defaults: DefaultResolver::default(),
            validity: ConfigValidity::Invalid,
            issues,
        }
    }

    /// Build components leniently: whatever is well-typed is kept.
    fn assemble(raw: &RawConfig, report: ValidationReport) -> Self {
        let catalog = match &raw.levels {
            Value::Array(items) => LevelCatalog::new(items.iter().filter_map(Value::as_str)),
            _ => LevelCatalog::empty(),
        };

        let grants = match &raw.group_grants {
            Value::Object(table) => table
                .iter()
                .filter_map(|(group, levels)| {
                    let levels = levels.as_array()?;
                    let entries = levels.iter().filter_map(Value::as_str);
                    Some(GroupGrant::new(group.as_str(), GrantSet::from_entries(entries)))
                })
                .collect(),
            _ => Vec::new(),
        };

        let namespace_defaults: BTreeMap<Namespace, String> = match &raw.namespace_defaults {
            Value::Object(table) => table
                .iter()
                .filter_map(|(key, level)| {
                    let namespace = key.trim().parse::<Namespace>().ok()?;
                    Some((namespace, level.as_str()?.to_string()))
                })
                .collect(),
            _ => BTreeMap::new(),
        };

        let global_default = raw.default_level.as_str().map(str::to_string);

        Self {
            grants: GrantResolver::new(catalog.clone(), grants),
            defaults: DefaultResolver::new(catalog.clone(), namespace_defaults, global_default),
            catalog,
            validity: report.validity(),
            issues: report.issues().to_vec(),
        }
    }

    pub fn catalog(&self) -> &LevelCatalog {
        &self.catalog
    }

    pub fn grants(&self) -> &GrantResolver {
        &self.grants
    }

    pub fn defaults(&self) -> &DefaultResolver {
        &self.defaults
    }

    pub fn validity(&self) -> ConfigValidity {
        self.validity
    }

    pub fn is_invalid(&self) -> bool {
        self.validity.is_invalid()
    }

    /// Problems found while loading.
    pub fn issues(&self) -> &[ConfigIssue] {
        &self.issues
    }

    /// Configured levels, de-duplicated, in order.
    pub fn levels(&self) -> &[Level] {
        self.catalog.levels()
    }

    pub fn is_valid_level(&self, level: &str) -> bool {
        self.catalog.is_valid_level(level)
    }

    pub fn level_group_map(&self) -> &LevelGroupMap {
        self.grants.level_group_map()
    }

    pub fn resolve_default(&self, namespace: Namespace) -> Option<Level> {
        self.defaults.resolve_default(namespace)
    }
}

/// Shared, swappable reference to the current [`Config`].
///
/// Readers take a snapshot and keep using it for the rest of their unit of
/// work; a concurrent reload never changes a snapshot already handed out.
#[derive(Debug)]
pub struct ConfigHandle {
    current: RwLock<Arc<Config>>,
}

impl ConfigHandle {
    pub fn new(config: Config) -> Self {
        Self {
            current: RwLock::new(Arc::new(config)),
        }
    }

    /// Load from a file; see [`Config::load`].
    pub fn load(path: impl AsRef<Path>) -> Self {
        Self::new(Config::load(path))
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<Config> {
        Arc::clone(&self.current.read())
    }

    /// Swap in a new snapshot, returning the previous one.
    pub fn replace(&self, config: Config) -> Arc<Config> {
        let mut current = self.current.write();
        std::mem::replace(&mut *current, Arc::new(config))
    }

    /// Build a snapshot from `raw` and swap it in.
    pub fn reload(&self, raw: &RawConfig) -> ConfigValidity {
        let config = Config::from_raw(raw);
        let validity = config.validity();
        self.replace(config);
        validity
    }
}
