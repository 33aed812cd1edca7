//! Orphaned level detection and repair.
//!
//! Stored levels are never re-validated on read, so removing a level from
//! configuration leaves rows behind that name it. These functions find such
//! rows and rewrite them to a configured level.

use std::str::FromStr;
use thiserror::Error;

use crate::error::{LevelError, StorageError};
use crate::level::{Level, LevelCatalog};
use crate::service::FilePermissions;
use crate::store::{LevelBackend, ResourceDirectory, ResourceId, ResourceKey};

/// A stored level that is not in the current catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrphanedLevel {
    pub resource: ResourceId,
    /// `None` if the directory no longer knows the resource.
    pub key: Option<ResourceKey>,
    pub level: Level,
}

/// Errors from reconciliation.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("invalid fix format '{0}', expected old_level:new_level")]
    InvalidFixFormat(String),

    #[error("target level \"{level}\" is not a valid level. Valid levels: {}", valid.join(", "))]
    InvalidTarget { level: String, valid: Vec<String> },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Level(#[from] LevelError),
}

/// A rewrite rule `old_level:new_level`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelFix {
    pub from: String,
    pub to: String,
}

impl FromStr for LevelFix {
    type Err = ReconcileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((from, to)) if !from.is_empty() && !to.is_empty() => Ok(Self {
                from: from.to_string(),
                to: to.to_string(),
            }),
            _ => Err(ReconcileError::InvalidFixFormat(s.to_string())),
        }
    }
}

/// Outcome of [`repair`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// Orphans whose level matched the fix.
    pub matched: usize,
    pub updated: Vec<ResourceId>,
    /// Resources that no longer exist.
    pub skipped: Vec<ResourceId>,
}

/// Scan every stored row for levels missing from `catalog`.
pub fn find_orphans(
    backend: &dyn LevelBackend,
    directory: &dyn ResourceDirectory,
    catalog: &LevelCatalog,
) -> Result<Vec<OrphanedLevel>, StorageError> {
    let mut orphans = Vec::new();
    for row in backend.scan_levels()? {
        if catalog.is_valid_level(row.level.as_str()) {
            continue;
        }
        orphans.push(OrphanedLevel {
            key: directory.key_of(row.resource)?,
            resource: row.resource,
            level: row.level,
        });
    }
    Ok(orphans)
}

/// Rewrite every orphan whose level is `fix.from` to `fix.to`.
///
/// The target must be a configured level. Orphans with other levels are left
/// alone.
pub fn repair(
    service: &FilePermissions,
    orphans: &[OrphanedLevel],
    fix: &LevelFix,
) -> Result<RepairReport, ReconcileError> {
    let store = service.level_store();
    if !store.catalog().is_valid_level(&fix.to) {
        return Err(ReconcileError::InvalidTarget {
            level: fix.to.clone(),
            valid: store.catalog().iter().map(|l| l.to_string()).collect(),
        });
    }

    let mut report = RepairReport::default();
    for orphan in orphans.iter().filter(|o| o.level == fix.from.as_str()) {
        report.matched += 1;
        match store.set_level(orphan.resource, &fix.to) {
            Ok(()) => report.updated.push(orphan.resource),
            Err(LevelError::ResourceNotFound(id)) => {
                log::warn!("Skipping resource {}: it no longer exists", id);
                report.skipped.push(id);
            }
            Err(e) => return Err(e.into()),
        }
    }

    log::info!(
        "Rewrote {} orphaned level(s) from \"{}\" to \"{}\"",
        report.updated.len(),
        fix.from,
        fix.to
    );
    Ok(report)
}
