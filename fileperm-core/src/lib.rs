//! # fileperm
//!
//! A fail-closed, level-based access policy engine for files.
//!
//! Administrators configure an ordered set of levels (`public`, `internal`,
//! `confidential`, ...), which groups may access which levels, and optional
//! default levels per namespace. Each resource carries at most one explicit
//! level; its *effective* level is the explicit one, else the namespace
//! default, else the global default, else none (unrestricted).
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use fileperm_core::{Config, FilePermissions, MemoryStore, ResourceKey};
//!
//! let config = Config::builder()
//!     .levels(["public", "internal", "confidential"])
//!     .grant("sysop", ["*"])
//!     .grant("staff", ["public", "internal"])
//!     .build();
//!
//! let storage = Arc::new(MemoryStore::new());
//! let service = FilePermissions::with_storage(config, storage.clone());
//!
//! let id = storage.create_resource(ResourceKey::file("Budget.xlsx"));
//! service.change_level("admin", id, "confidential").unwrap();
//!
//! // One evaluator per request
//! let evaluator = service.evaluator();
//! assert!(evaluator.can_access_resource(&["sysop"], id, 6));
//! assert!(!evaluator.can_access_resource(&["staff"], id, 6));
//! ```
//!
//! ## Fail-closed configuration
//!
//! Configuration is validated once when it is loaded. Structural problems
//! (bad level list, grants naming unknown levels) mark the snapshot
//! [`ConfigValidity::Invalid`], and every access decision then denies without
//! looking at groups at all. Loading never panics or errors out of the host.
//!
//! ## Feature Flags
//!
//! - `test-utils` - test doubles in [`test_utils`]

pub mod config;
pub mod defaults;
pub mod deferred;
pub mod enforcement;
pub mod error;
pub mod evaluator;
pub mod grant;
pub mod level;
pub mod reconcile;
pub mod service;
pub mod store;
pub mod upload;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use config::{
    validate_config, Config, ConfigBuilder, ConfigHandle, ConfigIssue, ConfigValidity, RawConfig,
    ValidationReport,
};
pub use defaults::DefaultResolver;
pub use deferred::{DeferredWriter, LevelAssignment, PendingAssignments, WorkerStats};
pub use enforcement::{AccessDenied, AccessSurface, EmbedOutcome, EmbedRender, Enforcer};
pub use error::{ConfigLoadError, Error, LevelError, Result, StorageError};
pub use evaluator::{GroupSource, PermissionEvaluator};
pub use grant::{GrantResolver, GrantSet, GroupGrant, LevelGroupMap, WILDCARD};
pub use level::{Level, LevelCatalog};
pub use reconcile::{LevelFix, OrphanedLevel, ReconcileError, RepairReport};
pub use service::{FilePermissions, LevelChange};
pub use store::{
    LevelBackend, LevelStore, MemoryStore, Namespace, ResourceDirectory, ResourceId, ResourceKey,
    StoredLevel, FILE_NAMESPACE,
};
pub use upload::{UploadError, UploadSource};
