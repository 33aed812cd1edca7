use fileperm_core::deferred::spawn_assignment_worker;
use fileperm_core::test_utils::{failing_service, memory_service, sample_config, FailingBackend};
use fileperm_core::{
    upload, ConfigHandle, FilePermissions, MemoryStore, PendingAssignments, ResourceKey,
    UploadSource, WorkerStats, FILE_NAMESPACE,
};
use std::sync::Arc;

#[tokio::test]
async fn test_upload_flow_applies_default_after_commit() {
    let (storage, service) = memory_service(sample_config());
    let (writer, worker) = spawn_assignment_worker(service.clone());

    let config = service.config();
    let level = upload::verify_upload_level(&config, Some(""), UploadSource::Form)
        .unwrap()
        .unwrap();

    let key = ResourceKey::file("Upload.png");
    let mut pending = PendingAssignments::new();
    pending.push(key.clone(), level);

    // The resource becomes visible when the creating transaction commits
    let id = storage.create_resource(key);
    pending.commit(&writer);

    drop(writer);
    let stats = worker.await.unwrap();
    assert_eq!(stats.applied, 1);

    let evaluator = service.evaluator();
    assert_eq!(
        evaluator.effective_level(id, FILE_NAMESPACE).unwrap().unwrap(),
        "internal"
    );
}

#[tokio::test]
async fn test_rolled_back_creation_writes_nothing() {
    let (storage, service) = memory_service(sample_config());
    let (writer, worker) = spawn_assignment_worker(service);

    let mut pending = PendingAssignments::new();
    pending.push(ResourceKey::file("Rolled.png"), "confidential");
    drop(pending);

    drop(writer);
    let stats = worker.await.unwrap();
    assert_eq!(stats.applied + stats.dropped + stats.failed, 0);
    assert_eq!(storage.level_count(), 0);
}

#[tokio::test]
async fn test_invisible_resource_is_dropped_not_retried() {
    let (storage, service) = memory_service(sample_config());
    let (writer, worker) = spawn_assignment_worker(service);

    let mut pending = PendingAssignments::new();
    pending.push(ResourceKey::file("Ghost.png"), "public");
    pending.commit(&writer);

    drop(writer);
    let stats = worker.await.unwrap();
    assert_eq!(stats.dropped, 1);
    assert_eq!(storage.level_count(), 0);
}

#[tokio::test]
async fn test_lookup_failure_is_counted_not_propagated() {
    let (writer, worker) = spawn_assignment_worker(failing_service(sample_config()));

    let mut pending = PendingAssignments::new();
    pending.push(ResourceKey::file("Broken.png"), "public");
    assert_eq!(pending.commit(&writer), 1);

    drop(writer);
    let stats = worker.await.unwrap();
    assert_eq!(
        stats,
        WorkerStats {
            applied: 0,
            dropped: 0,
            failed: 1
        }
    );
}

#[tokio::test]
async fn test_write_failure_is_counted_and_worker_keeps_going() {
    // Resources resolve, but every level write fails
    let directory = Arc::new(MemoryStore::new());
    directory.create_resource(ResourceKey::file("First.png"));
    let service = Arc::new(FilePermissions::new(
        ConfigHandle::new(sample_config()),
        Arc::new(FailingBackend),
        directory,
    ));
    let (writer, worker) = spawn_assignment_worker(service);

    let mut pending = PendingAssignments::new();
    pending.push(ResourceKey::file("First.png"), "internal");
    pending.push(ResourceKey::file("Missing.png"), "internal");
    assert_eq!(pending.commit(&writer), 2);

    drop(writer);
    let stats = worker.await.unwrap();
    assert_eq!(
        stats,
        WorkerStats {
            applied: 0,
            dropped: 1,
            failed: 1
        }
    );
}
