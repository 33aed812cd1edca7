//! Level selection for new uploads.

use thiserror::Error;

use crate::config::Config;
use crate::error::StorageError;
use crate::level::Level;
use crate::store::{LevelStore, ResourceId, FILE_NAMESPACE};

/// Where an upload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadSource {
    /// An interactive form that offered the user a level selector.
    Form,
    /// A programmatic upload with no selector.
    Api,
}

/// Reasons an upload is rejected.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The submitted level is not configured.
    #[error("invalid permission level: {0}")]
    InvalidLevel(String),

    /// No level was chosen and no default applies.
    #[error("a permission level must be selected")]
    LevelRequired,

    /// Reading the existing level failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Decide which level a new upload gets.
///
/// Returns the level to assign once the file exists, or `None` when the file
/// is stored without one (API uploads with no default configured).
///
/// An empty string counts as "nothing selected".
pub fn verify_upload_level(
    config: &Config,
    requested: Option<&str>,
    source: UploadSource,
) -> Result<Option<Level>, UploadError> {
    match requested.filter(|level| !level.is_empty()) {
        Some(level) => {
            if config.is_valid_level(level) {
                Ok(Some(Level::new(level)))
            } else {
                Err(UploadError::InvalidLevel(level.to_string()))
            }
        }
        None => match config.resolve_default(FILE_NAMESPACE) {
            Some(default) => Ok(Some(default)),
            None if source == UploadSource::Form => Err(UploadError::LevelRequired),
            None => Ok(None),
        },
    }
}

/// Level to pre-select when re-uploading over an existing file.
///
/// Only returns the current level if it is still configured.
pub fn reupload_default(
    store: &LevelStore,
    resource: ResourceId,
) -> Result<Option<Level>, UploadError> {
    let existing = store.get_level(resource)?;
    Ok(existing.filter(|level| store.catalog().is_valid_level(level.as_str())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{LevelBackend, MemoryStore, ResourceKey};
    use std::sync::Arc;

    fn config(with_default: bool) -> Config {
        let builder = Config::builder().levels(["public", "internal"]);
        if with_default {
            builder.namespace_default(FILE_NAMESPACE, "internal").build()
        } else {
            builder.build()
        }
    }

    #[test]
    fn test_explicit_valid_level() {
        let level =
            verify_upload_level(&config(false), Some("public"), UploadSource::Form).unwrap();
        assert_eq!(level.unwrap(), "public");
    }

    #[test]
    fn test_explicit_invalid_level_rejected() {
        for source in [UploadSource::Form, UploadSource::Api] {
            let err = verify_upload_level(&config(true), Some("secret"), source).unwrap_err();
            assert!(matches!(err, UploadError::InvalidLevel(ref l) if l == "secret"));
        }
    }

    #[test]
    fn test_empty_uses_default() {
        let level = verify_upload_level(&config(true), Some(""), UploadSource::Form).unwrap();
        assert_eq!(level.unwrap(), "internal");
        let level = verify_upload_level(&config(true), None, UploadSource::Api).unwrap();
        assert_eq!(level.unwrap(), "internal");
    }

    #[test]
    fn test_empty_without_default() {
        let err = verify_upload_level(&config(false), None, UploadSource::Form).unwrap_err();
        assert!(matches!(err, UploadError::LevelRequired));

        let level = verify_upload_level(&config(false), Some(""), UploadSource::Api).unwrap();
        assert!(level.is_none());
    }

    #[test]
    fn test_reupload_default_only_if_still_valid() {
        let storage = Arc::new(MemoryStore::new());
        let kept = storage.create_resource(ResourceKey::file("kept"));
        let orphan = storage.create_resource(ResourceKey::file("orphan"));
        let blank = storage.create_resource(ResourceKey::file("blank"));
        storage.upsert_level(kept, &Level::new("internal")).unwrap();
        storage.upsert_level(orphan, &Level::new("retired")).unwrap();

        let store = LevelStore::new(
            storage.clone(),
            storage,
            config(false).catalog().clone(),
        );
        assert_eq!(reupload_default(&store, kept).unwrap().unwrap(), "internal");
        assert!(reupload_default(&store, orphan).unwrap().is_none());
        assert!(reupload_default(&store, blank).unwrap().is_none());
    }
}
