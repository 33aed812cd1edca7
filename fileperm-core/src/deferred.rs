//! Post-commit level assignment.
//!
//! A level chosen while a resource is being created cannot be written yet:
//! the resource may not have a committed id. The creating code collects
//! intents in [`PendingAssignments`] and, once its transaction has committed,
//! hands them to a [`DeferredWriter`]. A worker task re-resolves each
//! resource by key and writes the level, or drops the intent if the resource
//! still isn't visible. Failures are logged and never reach the code that
//! created the resource.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use fileperm_core::deferred::{spawn_assignment_worker, PendingAssignments};
//! use fileperm_core::{Config, FilePermissions, MemoryStore, ResourceKey};
//!
//! # tokio_test::block_on(async {
//! let storage = Arc::new(MemoryStore::new());
//! let config = Config::builder().levels(["public", "internal"]).build();
//! let service = Arc::new(FilePermissions::with_storage(config, storage.clone()));
//! let (writer, worker) = spawn_assignment_worker(service);
//!
//! let mut pending = PendingAssignments::new();
//! pending.push(ResourceKey::file("Plan.pdf"), "internal");
//! storage.create_resource(ResourceKey::file("Plan.pdf"));
//! pending.commit(&writer);
//!
//! drop(writer);
//! let stats = worker.await.unwrap();
//! assert_eq!(stats.applied, 1);
//! # });
//! ```

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::LevelError;
use crate::level::Level;
use crate::service::FilePermissions;
use crate::store::ResourceKey;

/// Intent to give the resource named `key` the level `level`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelAssignment {
    pub key: ResourceKey,
    pub level: Level,
}

/// Assignments collected during a creating transaction.
///
/// Call [`commit`](Self::commit) after the transaction commits. Dropping
/// without committing (rollback) discards them.
#[derive(Debug, Default)]
pub struct PendingAssignments {
    items: Vec<LevelAssignment>,
}

impl PendingAssignments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: ResourceKey, level: impl Into<Level>) {
        self.items.push(LevelAssignment {
            key,
            level: level.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Hand every assignment to the worker. Returns how many were queued.
    pub fn commit(mut self, writer: &DeferredWriter) -> usize {
        std::mem::take(&mut self.items)
            .into_iter()
            .filter(|assignment| writer.enqueue(assignment.clone()))
            .count()
    }
}

impl Drop for PendingAssignments {
    fn drop(&mut self) {
        if !self.items.is_empty() {
            log::debug!(
                "Discarding {} uncommitted level assignment(s)",
                self.items.len()
            );
        }
    }
}

/// Sending side of the assignment queue. Cheap to clone.
#[derive(Debug, Clone)]
pub struct DeferredWriter {
    tx: mpsc::UnboundedSender<LevelAssignment>,
}

impl DeferredWriter {
    /// Queue an assignment. Returns false if the worker has stopped.
    pub fn enqueue(&self, assignment: LevelAssignment) -> bool {
        match self.tx.send(assignment) {
            Ok(()) => true,
            Err(mpsc::error::SendError(assignment)) => {
                log::error!(
                    "Failed to queue permission level for {}: worker stopped",
                    assignment.key
                );
                false
            }
        }
    }
}

/// What happened to one assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOutcome {
    Applied,
    /// The resource was not visible.
    Dropped,
    Failed,
}

/// Totals reported when the worker exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub applied: usize,
    pub dropped: usize,
    pub failed: usize,
}

impl WorkerStats {
    fn record(&mut self, outcome: AssignmentOutcome) {
        match outcome {
            AssignmentOutcome::Applied => self.applied += 1,
            AssignmentOutcome::Dropped => self.dropped += 1,
            AssignmentOutcome::Failed => self.failed += 1,
        }
    }
}

/// Apply one assignment synchronously.
///
/// Looks the resource up again by key, so a resource created after the
/// intent was recorded is found. Never returns an error; failures are logged.
pub fn apply_assignment(
    service: &FilePermissions,
    assignment: &LevelAssignment,
) -> AssignmentOutcome {
    let resource = match service.directory().lookup(&assignment.key) {
        Ok(Some(resource)) => resource,
        Ok(None) => {
            log::warn!(
                "Dropping permission level for {}: resource not found",
                assignment.key
            );
            return AssignmentOutcome::Dropped;
        }
        Err(e) => {
            log::error!(
                "Failed to set permission level on {}: {}",
                assignment.key,
                e
            );
            return AssignmentOutcome::Failed;
        }
    };

    match service
        .level_store()
        .set_level(resource, assignment.level.as_str())
    {
        Ok(()) => AssignmentOutcome::Applied,
        Err(LevelError::ResourceNotFound(_)) => {
            log::warn!(
                "Dropping permission level for {}: resource disappeared",
                assignment.key
            );
            AssignmentOutcome::Dropped
        }
        Err(e) => {
            log::error!(
                "Failed to set permission level on {}: {}",
                assignment.key,
                e
            );
            AssignmentOutcome::Failed
        }
    }
}

/// Start the worker that applies queued assignments.
///
/// The worker runs until every [`DeferredWriter`] clone is dropped, then
/// returns its totals. Storage calls run on the blocking pool.
pub fn spawn_assignment_worker(
    service: Arc<FilePermissions>,
) -> (DeferredWriter, JoinHandle<WorkerStats>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<LevelAssignment>();

    let handle = tokio::spawn(async move {
        let mut stats = WorkerStats::default();
        while let Some(assignment) = rx.recv().await {
            let service = Arc::clone(&service);
            let outcome =
                tokio::task::spawn_blocking(move || apply_assignment(&service, &assignment)).await;
            match outcome {
                Ok(outcome) => stats.record(outcome),
                Err(e) => {
                    log::error!("Permission level task failed: {}", e);
                    stats.failed += 1;
                }
            }
        }
        log::debug!(
            "Level assignment worker stopped: {} applied, {} dropped, {} failed",
            stats.applied,
            stats.dropped,
            stats.failed
        );
        stats
    });

    (DeferredWriter { tx }, handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::{LevelBackend, MemoryStore};

    fn service() -> (Arc<MemoryStore>, Arc<FilePermissions>) {
        let storage = Arc::new(MemoryStore::new());
        let config = Config::builder().levels(["public", "internal"]).build();
        let service = Arc::new(FilePermissions::with_storage(config, storage.clone()));
        (storage, service)
    }

    #[test]
    fn test_apply_assignment_outcomes() {
        let (storage, service) = service();
        let key = ResourceKey::file("a");
        let assignment = LevelAssignment {
            key: key.clone(),
            level: Level::new("internal"),
        };

        assert_eq!(apply_assignment(&service, &assignment), AssignmentOutcome::Dropped);

        let id = storage.create_resource(key.clone());
        assert_eq!(apply_assignment(&service, &assignment), AssignmentOutcome::Applied);
        assert_eq!(storage.read_level(id).unwrap().unwrap(), "internal");

        let invalid = LevelAssignment {
            key,
            level: Level::new("secret"),
        };
        assert_eq!(apply_assignment(&service, &invalid), AssignmentOutcome::Failed);
        assert_eq!(storage.read_level(id).unwrap().unwrap(), "internal");
    }

    #[test]
    fn test_uncommitted_assignments_are_discarded() {
        let mut pending = PendingAssignments::new();
        pending.push(ResourceKey::file("a"), "public");
        assert_eq!(pending.len(), 1);
        drop(pending);
    }

    #[tokio::test]
    async fn test_worker_applies_and_drops() {
        let (storage, service) = service();
        let (writer, worker) = spawn_assignment_worker(service);

        let created = storage.create_resource(ResourceKey::file("created"));
        let mut pending = PendingAssignments::new();
        pending.push(ResourceKey::file("created"), "internal");
        pending.push(ResourceKey::file("never-created"), "public");
        assert_eq!(pending.commit(&writer), 2);

        drop(writer);
        let stats = worker.await.unwrap();
        assert_eq!(
            stats,
            WorkerStats {
                applied: 1,
                dropped: 1,
                failed: 0
            }
        );
        assert_eq!(storage.read_level(created).unwrap().unwrap(), "internal");
    }

    #[tokio::test]
    async fn test_enqueue_after_worker_stopped() {
        let (_, service) = service();
        let (writer, worker) = spawn_assignment_worker(service);
        worker.abort();
        let _ = worker.await;

        let queued = writer.enqueue(LevelAssignment {
            key: ResourceKey::file("a"),
            level: Level::new("public"),
        });
        assert!(!queued);
    }
}
