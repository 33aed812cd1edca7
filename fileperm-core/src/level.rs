//! Permission levels and the configured level catalog.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

use crate::error::LevelError;

/// A named classification tag, e.g. `"confidential"`.
///
/// Levels are opaque, case-sensitive strings. Constructing one does not check
/// it against configuration: values read back from storage may be orphaned.
/// Use [`LevelCatalog::checked`] at write boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Level(String);

impl Level {
    /// Wrap a level name without validation.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The level name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the underlying string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Level {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Level {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Level {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Level {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl PartialEq<str> for Level {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Level {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// The ordered, de-duplicated set of configured levels.
///
/// Merged configuration sources can repeat a level; the first occurrence
/// wins and order is otherwise preserved. Empty names are never members.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelCatalog {
    levels: Vec<Level>,
}

impl LevelCatalog {
    /// Build a catalog from configured names.
    pub fn new<I, S>(levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut deduped: Vec<Level> = Vec::new();
        for name in levels {
            let name = name.into();
            if name.is_empty() || deduped.iter().any(|l| l.0 == name) {
                continue;
            }
            deduped.push(Level(name));
        }
        Self { levels: deduped }
    }

    /// An empty catalog. Nothing is valid against it.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Configured levels in first-occurrence order.
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Strict, case-sensitive membership test.
    pub fn is_valid_level(&self, level: &str) -> bool {
        !level.is_empty() && self.levels.iter().any(|l| l.0 == level)
    }

    /// Validate a caller-supplied level for writing.
    pub fn checked(&self, level: &str) -> Result<Level, LevelError> {
        if self.is_valid_level(level) {
            Ok(Level::new(level))
        } else {
            Err(LevelError::invalid(level, &self.levels))
        }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Level> {
        self.levels.iter()
    }
}
