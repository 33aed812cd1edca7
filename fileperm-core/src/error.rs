//! Error types for fileperm
//!
//! Each subsystem has its own error enum; [`Error`] flattens them into the
//! categories a host actually branches on.
//!
//! Invalid configuration is deliberately absent from the request-path errors:
//! it only ever shows up as a fail-closed [`crate::ConfigValidity`] plus
//! operator log lines.

use thiserror::Error;

use crate::level::Level;
use crate::store::ResourceId;

/// Persistence layer failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    /// Reading a level or resource row failed.
    #[error("failed to read from level storage: {0}")]
    Read(String),

    /// Writing or deleting a level row failed.
    #[error("failed to write to level storage: {0}")]
    Write(String),

    /// The backend itself is unusable (connection, schema, task join).
    #[error("level storage unavailable: {0}")]
    Backend(String),
}

/// Errors returned to callers that attempt to change a resource's level.
///
/// Both validation variants are safe to show to the acting user.
#[derive(Debug, Error)]
pub enum LevelError {
    /// The resource has no stable identity yet (or never existed).
    #[error("cannot set permission level: resource {0} does not exist")]
    ResourceNotFound(ResourceId),

    /// The requested level is not in the configured level set.
    #[error("invalid permission level: {level}. Valid levels: {}", valid.join(", "))]
    InvalidLevel {
        /// The rejected value
        level: String,
        /// Levels that would have been accepted
        valid: Vec<String>,
    },

    /// The write reached storage and storage failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl LevelError {
    pub(crate) fn invalid(level: &str, valid: &[Level]) -> Self {
        LevelError::InvalidLevel {
            level: level.to_string(),
            valid: valid.iter().map(|l| l.to_string()).collect(),
        }
    }
}

/// Errors reading a configuration file from disk.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    /// The file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML.
    #[error("failed to parse TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// The file is not valid JSON.
    #[error("failed to parse JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// The file extension is neither `.toml` nor `.json`.
    #[error("unsupported configuration format: {0}")]
    UnsupportedFormat(String),
}

/// Top-level error type for fileperm operations
///
/// - [`Error::ResourceNotFound`] / [`Error::InvalidLevel`] - caller mistakes, show them
/// - [`Error::Storage`] - persistence failed, report a generic failure
/// - [`Error::Config`] - configuration file could not be loaded
/// - [`Error::Other`] - everything from the supplemental modules
#[derive(Debug, Error)]
pub enum Error {
    /// Target resource does not exist
    #[error("resource not found: {0}")]
    ResourceNotFound(ResourceId),

    /// Level not in the configured set
    #[error("invalid level: {0}")]
    InvalidLevel(String),

    /// Storage failure
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Returns true if the caller supplied something invalid
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::ResourceNotFound(_) | Self::InvalidLevel(_))
    }

    /// Returns true if persistence failed
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

impl From<LevelError> for Error {
    fn from(err: LevelError) -> Self {
        match err {
            LevelError::ResourceNotFound(id) => Error::ResourceNotFound(id),
            LevelError::InvalidLevel { level, .. } => Error::InvalidLevel(level),
            LevelError::Storage(e) => Error::Storage(e),
        }
    }
}

impl From<ConfigLoadError> for Error {
    fn from(err: ConfigLoadError) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<crate::upload::UploadError> for Error {
    fn from(err: crate::upload::UploadError) -> Self {
        match err {
            crate::upload::UploadError::InvalidLevel(level) => Error::InvalidLevel(level),
            other => Error::Other(other.to_string()),
        }
    }
}

impl From<crate::reconcile::ReconcileError> for Error {
    fn from(err: crate::reconcile::ReconcileError) -> Self {
        match err {
            crate::reconcile::ReconcileError::Storage(e) => Error::Storage(e),
            crate::reconcile::ReconcileError::Level(e) => e.into(),
            other => Error::Other(other.to_string()),
        }
    }
}

/// Result type alias for fileperm operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_lists_valid_levels() {
        let err = LevelError::invalid(
            "secret",
            &[Level::new("public"), Level::new("internal")],
        );
        assert_eq!(
            err.to_string(),
            "invalid permission level: secret. Valid levels: public, internal"
        );
    }

    #[test]
    fn test_resource_not_found_display() {
        let err = LevelError::ResourceNotFound(ResourceId::new(42));
        assert_eq!(
            err.to_string(),
            "cannot set permission level: resource 42 does not exist"
        );
    }

    #[test]
    fn test_level_error_flattens() {
        let err: Error = LevelError::ResourceNotFound(ResourceId::new(7)).into();
        assert!(err.is_user_error());
        assert!(!err.is_storage());

        let err: Error = LevelError::Storage(StorageError::Write("disk full".into())).into();
        assert!(err.is_storage());
        assert!(!err.is_user_error());
    }

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::Read("locked".into());
        assert_eq!(err.to_string(), "failed to read from level storage: locked");
    }
}
