//! Startup validation of raw configuration.
//!
//! Validation never fails startup. Every problem is collected (not
//! fail-fast) and logged, and any problem at all flips the snapshot to
//! [`ConfigValidity::Invalid`] so every access decision denies.
//!
//! A default naming an unknown level is one of those problems. Resolution
//! still skips such a default, for callers that read defaults directly.

use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;

use super::raw::RawConfig;
use super::ConfigValidity;
use crate::grant::WILDCARD;
use crate::store::Namespace;

/// One problem found in the administrator's configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigIssue {
    /// The configuration file could not be read or parsed at all.
    #[error("configuration could not be loaded: {0}")]
    Unreadable(String),

    #[error("levels must be a non-empty list")]
    LevelsNotList,

    #[error("levels[{index}] must be a non-empty string")]
    LevelNotString { index: usize },

    #[error("group_grants must be a table of group name to level list")]
    GrantsNotTable,

    #[error("grant for group '{group}' must be a list")]
    GrantNotList { group: String },

    #[error("grant for group '{group}' references unknown level '{level}'")]
    GrantUnknownLevel { group: String, level: String },

    #[error("default_level must be a string or absent")]
    DefaultLevelNotString,

    #[error("default_level references unknown level '{level}'")]
    DefaultLevelUnknown { level: String },

    #[error("namespace_defaults must be a table of namespace id to level")]
    NamespaceDefaultsNotTable,

    #[error("namespace_defaults keys must be namespace ids (integers), got '{key}'")]
    NamespaceKeyNotInteger { key: String },

    #[error("namespace_defaults[{namespace}] must be a string")]
    NamespaceDefaultNotString { namespace: Namespace },

    #[error("namespace_defaults[{namespace}] references unknown level '{level}'")]
    NamespaceDefaultUnknown { namespace: Namespace, level: String },
}

/// Outcome of validating one raw configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    issues: Vec<ConfigIssue>,
}

impl ValidationReport {
    pub(crate) fn from_issues(issues: Vec<ConfigIssue>) -> Self {
        Self { issues }
    }

    /// Check if no problem was found.
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn validity(&self) -> ConfigValidity {
        if self.is_valid() {
            ConfigValidity::Valid
        } else {
            ConfigValidity::Invalid
        }
    }

    /// Every problem found, in check order.
    pub fn issues(&self) -> &[ConfigIssue] {
        &self.issues
    }

    /// Human-readable messages for operator logs.
    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }

    /// Log each problem as a warning.
    pub fn log(&self) {
        for issue in &self.issues {
            log::warn!("Invalid configuration - {}", issue);
        }
    }
}

/// Validate raw configuration, accumulating every problem.
///
/// Checks, in order: the level list, grant references, the global default,
/// then namespace defaults.
pub fn validate(raw: &RawConfig) -> ValidationReport {
    let mut issues = Vec::new();

    check_levels(&raw.levels, &mut issues);

    // Every string entry counts for reference checks, even if some other
    // entry made the list invalid.
    let known: HashSet<&str> = match &raw.levels {
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        _ => HashSet::new(),
    };

    check_grants(&raw.group_grants, &known, &mut issues);
    check_default_level(&raw.default_level, &known, &mut issues);
    check_namespace_defaults(&raw.namespace_defaults, &known, &mut issues);

    ValidationReport::from_issues(issues)
}

fn check_levels(levels: &Value, issues: &mut Vec<ConfigIssue>) {
    match levels {
        Value::Array(items) if !items.is_empty() => {
            // One report is enough to flag the list.
            if let Some(index) = items
                .iter()
                .position(|item| !matches!(item, Value::String(s) if !s.is_empty()))
            {
                issues.push(ConfigIssue::LevelNotString { index });
            }
        }
        _ => issues.push(ConfigIssue::LevelsNotList),
    }
}

fn check_grants(grants: &Value, known: &HashSet<&str>, issues: &mut Vec<ConfigIssue>) {
    let table = match grants {
        Value::Null => return,
        Value::Object(table) => table,
        _ => {
            issues.push(ConfigIssue::GrantsNotTable);
            return;
        }
    };

    for (group, levels) in table {
        let Value::Array(levels) = levels else {
            issues.push(ConfigIssue::GrantNotList {
                group: group.clone(),
            });
            continue;
        };

        for level in levels {
            match level.as_str() {
                Some(WILDCARD) => {}
                Some(name) if known.contains(name) => {}
                Some(name) => issues.push(ConfigIssue::GrantUnknownLevel {
                    group: group.clone(),
                    level: name.to_string(),
                }),
                None => issues.push(ConfigIssue::GrantUnknownLevel {
                    group: group.clone(),
                    level: level.to_string(),
                }),
            }
        }
    }
}

fn check_default_level(default: &Value, known: &HashSet<&str>, issues: &mut Vec<ConfigIssue>) {
    match default {
        Value::Null => {}
        Value::String(level) if known.contains(level.as_str()) => {}
        Value::String(level) => issues.push(ConfigIssue::DefaultLevelUnknown {
            level: level.clone(),
        }),
        _ => issues.push(ConfigIssue::DefaultLevelNotString),
    }
}

fn check_namespace_defaults(
    defaults: &Value,
    known: &HashSet<&str>,
    issues: &mut Vec<ConfigIssue>,
) {
    let table = match defaults {
        Value::Null => return,
        Value::Object(table) => table,
        _ => {
            issues.push(ConfigIssue::NamespaceDefaultsNotTable);
            return;
        }
    };

    for (key, level) in table {
        let Ok(namespace) = key.trim().parse::<Namespace>() else {
            issues.push(ConfigIssue::NamespaceKeyNotInteger { key: key.clone() });
            continue;
        };

        match level {
            Value::String(name) if known.contains(name.as_str()) => {}
            Value::String(name) => issues.push(ConfigIssue::NamespaceDefaultUnknown {
                namespace,
                level: name.clone(),
            }),
            _ => issues.push(ConfigIssue::NamespaceDefaultNotString { namespace }),
        }
    }
}
