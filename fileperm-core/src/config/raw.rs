//! Raw, loosely typed administrator configuration.
//!
//! Values are kept as [`serde_json::Value`] so a wrong type surfaces as a
//! validation issue instead of a deserialisation failure.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::path::Path;

use crate::error::ConfigLoadError;
use crate::store::Namespace;

/// Level list used when the administrator configures none at all.
pub const DEFAULT_LEVELS: &[&str] = &["public"];

fn default_levels() -> Value {
    json!(DEFAULT_LEVELS)
}

/// Configuration exactly as the administrator wrote it.
///
/// # Example
///
/// ```rust
/// use fileperm_core::RawConfig;
///
/// let raw = RawConfig::from_toml_str(r#"
///     levels = ["public", "internal", "confidential"]
///     default_level = "public"
///
///     [group_grants]
///     sysop = ["*"]
///     staff = ["public", "internal"]
///
///     [namespace_defaults]
///     6 = "internal"
/// "#).unwrap();
/// assert!(raw.levels.is_array());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawConfig {
    /// Ordered list of level names. Absent means [`DEFAULT_LEVELS`].
    #[serde(default = "default_levels")]
    pub levels: Value,

    /// Table of group name to list of levels (or `*`).
    #[serde(default)]
    pub group_grants: Value,

    /// Global default level, or absent.
    #[serde(default)]
    pub default_level: Value,

    /// Table of namespace id to default level.
    #[serde(default)]
    pub namespace_defaults: Value,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            levels: default_levels(),
            group_grants: Value::Null,
            default_level: Value::Null,
            namespace_defaults: Value::Null,
        }
    }
}

impl RawConfig {
    /// Parse TOML configuration.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigLoadError> {
        Ok(toml::from_str(s)?)
    }

    /// Parse JSON configuration.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigLoadError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Read a `.toml` or `.json` configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&contents),
            Some("json") => Self::from_json_str(&contents),
            _ => Err(ConfigLoadError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Start a typed builder.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Typed construction of a [`RawConfig`].
///
/// The result still goes through validation, so a builder can describe an
/// invalid configuration on purpose.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    levels: Option<Vec<String>>,
    group_grants: Map<String, Value>,
    default_level: Option<String>,
    namespace_defaults: Map<String, Value>,
}

impl ConfigBuilder {
    /// Set the level list.
    pub fn levels<I, S>(mut self, levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.levels = Some(levels.into_iter().map(Into::into).collect());
        self
    }

    /// Grant `group` the given levels (use `"*"` for every level).
    pub fn grant<I, S>(mut self, group: impl Into<String>, levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let levels: Vec<Value> = levels
            .into_iter()
            .map(|l| Value::String(l.into()))
            .collect();
        self.group_grants.insert(group.into(), Value::Array(levels));
        self
    }

    /// Set the global default level.
    pub fn default_level(mut self, level: impl Into<String>) -> Self {
        self.default_level = Some(level.into());
        self
    }

    /// Set the default level for one namespace.
    pub fn namespace_default(mut self, namespace: Namespace, level: impl Into<String>) -> Self {
        self.namespace_defaults
            .insert(namespace.to_string(), Value::String(level.into()));
        self
    }

    /// Produce the raw configuration.
    pub fn build_raw(self) -> RawConfig {
        RawConfig {
            levels: self.levels.map(|l| json!(l)).unwrap_or_else(default_levels),
            group_grants: if self.group_grants.is_empty() {
                Value::Null
            } else {
                Value::Object(self.group_grants)
            },
            default_level: self.default_level.map(Value::String).unwrap_or(Value::Null),
            namespace_defaults: if self.namespace_defaults.is_empty() {
                Value::Null
            } else {
                Value::Object(self.namespace_defaults)
            },
        }
    }

    /// Validate and build the configuration snapshot.
    pub fn build(self) -> super::Config {
        super::Config::from_raw(&self.build_raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_levels_use_default() {
        let raw = RawConfig::from_toml_str("").unwrap();
        assert_eq!(raw.levels, json!(["public"]));
        assert!(raw.group_grants.is_null());
        assert!(raw.default_level.is_null());
        assert!(raw.namespace_defaults.is_null());
    }

    #[test]
    fn test_toml_namespace_keys_are_strings() {
        let raw = RawConfig::from_toml_str(
            r#"
            levels = ["public", "internal"]
            [namespace_defaults]
            6 = "internal"
            "#,
        )
        .unwrap();
        assert_eq!(raw.namespace_defaults["6"], json!("internal"));
    }

    #[test]
    fn test_json_null_levels_kept_as_null() {
        let raw = RawConfig::from_json_str(r#"{"levels": null}"#).unwrap();
        assert!(raw.levels.is_null());
    }

    #[test]
    fn test_wrong_types_survive_parsing() {
        let raw = RawConfig::from_json_str(
            r#"{"levels": ["public", 3], "group_grants": {"user": "public"}, "default_level": 5}"#,
        )
        .unwrap();
        assert_eq!(raw.levels, json!(["public", 3]));
        assert_eq!(raw.group_grants["user"], json!("public"));
        assert_eq!(raw.default_level, json!(5));
    }

    #[test]
    fn test_from_path_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("perms.toml");
        std::fs::write(&toml_path, "levels = [\"a\", \"b\"]").unwrap();
        assert_eq!(RawConfig::from_path(&toml_path).unwrap().levels, json!(["a", "b"]));

        let json_path = dir.path().join("perms.json");
        std::fs::write(&json_path, r#"{"levels": ["c"]}"#).unwrap();
        assert_eq!(RawConfig::from_path(&json_path).unwrap().levels, json!(["c"]));

        let other = dir.path().join("perms.yaml");
        std::fs::write(&other, "levels: []").unwrap();
        assert!(matches!(
            RawConfig::from_path(&other),
            Err(ConfigLoadError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_from_path_missing_file() {
        let result = RawConfig::from_path("/nonexistent/fileperm.toml");
        assert!(matches!(result, Err(ConfigLoadError::Io(_))));
    }

    #[test]
    fn test_builder_produces_raw_values() {
        let raw = RawConfig::builder()
            .levels(["public", "internal"])
            .grant("sysop", ["*"])
            .default_level("public")
            .namespace_default(6, "internal")
            .build_raw();

        assert_eq!(raw.levels, json!(["public", "internal"]));
        assert_eq!(raw.group_grants, json!({"sysop": ["*"]}));
        assert_eq!(raw.default_level, json!("public"));
        assert_eq!(raw.namespace_defaults, json!({"6": "internal"}));
    }
}
