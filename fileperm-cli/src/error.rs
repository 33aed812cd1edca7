//! CLI-specific error types

use fileperm_core::{LevelError, ReconcileError, StorageError};
use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    /// Setting a level was rejected or failed
    #[error("{0}")]
    Level(#[from] LevelError),

    /// Level storage failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Orphan repair failed
    #[error("{0}")]
    Reconcile(#[from] ReconcileError),

    /// SQLite error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A schema migration failed
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Serializing output failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error (filesystem, stdout, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration failed validation
    #[error("Configuration is invalid ({0} problem(s)); all access will be denied")]
    InvalidConfig(usize),

    /// The named resource does not exist
    #[error("Resource {0} not found")]
    UnknownResource(String),
}
