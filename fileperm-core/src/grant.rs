//! Group grants and the level → groups reverse map.
//!
//! A grant gives a group access to a set of levels, either an explicit list
//! or every configured level via the `*` wildcard. The wildcard is kept as a
//! variant rather than expanded at load time, so it always tracks the live
//! level set.

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::level::{Level, LevelCatalog};

/// Literal token that grants every configured level.
pub const WILDCARD: &str = "*";

/// The levels one group is allowed to access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrantSet {
    /// Every configured level (`*`).
    All,

    /// Exactly these levels.
    Levels(Vec<Level>),
}

impl GrantSet {
    /// Build from the configured list. A `*` anywhere in the list wins.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut levels = Vec::new();
        for entry in entries {
            let entry = entry.into();
            if entry == WILDCARD {
                return GrantSet::All;
            }
            levels.push(Level::new(entry));
        }
        GrantSet::Levels(levels)
    }

    /// Check if this grant covers `level`.
    ///
    /// The wildcard matches any string, including levels no longer present in
    /// configuration.
    pub fn grants(&self, level: &str) -> bool {
        match self {
            GrantSet::All => true,
            GrantSet::Levels(levels) => levels.iter().any(|l| l == level),
        }
    }

    /// Check if this is a wildcard grant.
    pub fn is_wildcard(&self) -> bool {
        matches!(self, GrantSet::All)
    }
}

impl std::fmt::Display for GrantSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrantSet::All => write!(f, "{}", WILDCARD),
            GrantSet::Levels(levels) => {
                let names: Vec<&str> = levels.iter().map(Level::as_str).collect();
                write!(f, "[{}]", names.join(", "))
            }
        }
    }
}

/// A group together with what it is granted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupGrant {
    /// Group name as reported by the host's membership lookup.
    pub group: String,

    /// Levels this group may access.
    pub grants: GrantSet,
}

impl GroupGrant {
    pub fn new(group: impl Into<String>, grants: GrantSet) -> Self {
        Self {
            group: group.into(),
            grants,
        }
    }
}

/// Level → groups that grant it, in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelGroupMap {
    entries: Vec<(Level, Vec<String>)>,
}

impl LevelGroupMap {
    /// Groups granting `level`, or `None` if the level is not configured.
    pub fn get(&self, level: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(l, _)| l == level)
            .map(|(_, groups)| groups.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Level, &[String])> {
        self.entries.iter().map(|(l, g)| (l, g.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Selector labels: `level (group, group)` or a bare `level` when no
    /// group grants it. Pairs are `(label, level)`.
    pub fn labels(&self) -> Vec<(String, Level)> {
        self.entries
            .iter()
            .map(|(level, groups)| {
                let label = if groups.is_empty() {
                    level.to_string()
                } else {
                    format!("{} ({})", level, groups.join(", "))
                };
                (label, level.clone())
            })
            .collect()
    }
}

/// Answers grant questions against one configuration snapshot.
#[derive(Debug, Default)]
pub struct GrantResolver {
    catalog: LevelCatalog,
    grants: Vec<GroupGrant>,
    level_groups: OnceLock<LevelGroupMap>,
}

impl GrantResolver {
    pub fn new(catalog: LevelCatalog, grants: Vec<GroupGrant>) -> Self {
        Self {
            catalog,
            grants,
            level_groups: OnceLock::new(),
        }
    }

    /// All configured group grants.
    pub fn grants(&self) -> &[GroupGrant] {
        &self.grants
    }

    /// The grant set for `group`, if the group is configured.
    pub fn grant_for(&self, group: &str) -> Option<&GrantSet> {
        self.grants
            .iter()
            .find(|g| g.group == group)
            .map(|g| &g.grants)
    }

    /// Check if `group` grants `level` (wildcard or exact match).
    pub fn group_grants_level(&self, group: &str, level: &str) -> bool {
        self.grant_for(group)
            .map(|grants| grants.grants(level))
            .unwrap_or(false)
    }

    /// Reverse map of every configured level to the groups granting it.
    ///
    /// Computed on first use and then reused for the life of the snapshot.
    pub fn level_group_map(&self) -> &LevelGroupMap {
        self.level_groups.get_or_init(|| {
            let entries = self
                .catalog
                .iter()
                .map(|level| {
                    let groups = self
                        .grants
                        .iter()
                        .filter(|g| g.grants.grants(level.as_str()))
                        .map(|g| g.group.clone())
                        .collect();
                    (level.clone(), groups)
                })
                .collect();
            LevelGroupMap { entries }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> GrantResolver {
        GrantResolver::new(
            LevelCatalog::new(["public", "internal", "confidential"]),
            vec![
                GroupGrant::new("sysop", GrantSet::from_entries(["*"])),
                GroupGrant::new("staff", GrantSet::from_entries(["public", "internal"])),
                GroupGrant::new("viewer", GrantSet::from_entries(Vec::<String>::new())),
            ],
        )
    }

    #[test]
    fn test_grant_set_wildcard_anywhere() {
        let set = GrantSet::from_entries(["public", "*"]);
        assert!(set.is_wildcard());
        assert!(set.grants("anything"));
    }

    #[test]
    fn test_grant_set_exact_match() {
        let set = GrantSet::from_entries(["public"]);
        assert!(set.grants("public"));
        assert!(!set.grants("Public"));
        assert!(!set.grants("internal"));
    }

    #[test]
    fn test_grant_set_display() {
        assert_eq!(GrantSet::All.to_string(), "*");
        assert_eq!(
            GrantSet::from_entries(["public", "internal"]).to_string(),
            "[public, internal]"
        );
    }

    #[test]
    fn test_wildcard_expands_to_every_level() {
        let resolver = resolver();
        let map = resolver.level_group_map();
        assert!(map.get("confidential").unwrap().contains(&"sysop".to_string()));
        assert!(map.get("public").unwrap().contains(&"sysop".to_string()));
    }

    #[test]
    fn test_level_group_map_order_and_contents() {
        let resolver = resolver();
        let map = resolver.level_group_map();

        let levels: Vec<&str> = map.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(levels, vec!["public", "internal", "confidential"]);

        assert_eq!(map.get("public").unwrap(), &["sysop", "staff"]);
        assert_eq!(map.get("internal").unwrap(), &["sysop", "staff"]);
        assert_eq!(map.get("confidential").unwrap(), &["sysop"]);
        assert!(map.get("secret").is_none());
    }

    #[test]
    fn test_level_group_map_is_memoized() {
        let resolver = resolver();
        let first = resolver.level_group_map() as *const LevelGroupMap;
        let second = resolver.level_group_map() as *const LevelGroupMap;
        assert_eq!(first, second);
    }

    #[test]
    fn test_group_grants_level() {
        let resolver = resolver();
        assert!(resolver.group_grants_level("sysop", "confidential"));
        assert!(resolver.group_grants_level("staff", "internal"));
        assert!(!resolver.group_grants_level("staff", "confidential"));
        assert!(!resolver.group_grants_level("viewer", "public"));
        assert!(!resolver.group_grants_level("nobody", "public"));
    }

    #[test]
    fn test_labels() {
        let resolver = GrantResolver::new(
            LevelCatalog::new(["public", "secret"]),
            vec![
                GroupGrant::new("user", GrantSet::from_entries(["public"])),
                GroupGrant::new("sysop", GrantSet::All),
            ],
        );
        let labels = resolver.level_group_map().labels();
        assert_eq!(labels[0].0, "public (user, sysop)");
        assert_eq!(labels[1].0, "secret (sysop)");

        let bare = GrantResolver::new(LevelCatalog::new(["public"]), vec![]);
        assert_eq!(bare.level_group_map().labels()[0].0, "public");
    }
}
