mod common;

use common::temp_context;
use fileperm_cli::SqliteStore;
use fileperm_core::test_utils::{broken_config, sample_config, FailingBackend, SpyGroups};
use fileperm_core::{Config, FilePermissions, LevelBackend, Level, ResourceId, ResourceKey};
use std::sync::Arc;

#[test]
fn test_levels_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("levels.db");

    let id = {
        let store = Arc::new(SqliteStore::open(&path).unwrap());
        let id = store.create_resource(&ResourceKey::file("Plan.pdf")).unwrap();
        let service = FilePermissions::with_storage(sample_config(), store);
        service.change_level("alice", id, "confidential").unwrap();
        id
    };

    let store = Arc::new(SqliteStore::open(&path).unwrap());
    let service = FilePermissions::with_storage(sample_config(), store);
    assert_eq!(
        service.level_store().get_level(id).unwrap().unwrap(),
        "confidential"
    );
}

#[test]
fn test_two_services_over_one_database_agree() {
    let (_dir, ctx) = temp_context();
    let id = ctx.store.create_resource(&ResourceKey::file("Shared.pdf")).unwrap();

    let other = FilePermissions::with_storage(sample_config(), ctx.store.clone());
    let stale = other.evaluator();
    assert_eq!(
        stale.effective_level(id, 6).unwrap().unwrap(),
        "internal"
    );

    ctx.service.change_level("alice", id, "confidential").unwrap();
    assert_eq!(
        other.evaluator().effective_level(id, 6).unwrap().unwrap(),
        "confidential"
    );
}

#[test]
fn test_sqlite_backed_fail_closed() {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let id = store.create_resource(&ResourceKey::file("Plan.pdf")).unwrap();
    store.upsert_level(id, &Level::new("public")).unwrap();

    let service = FilePermissions::with_storage(broken_config(), store);
    let groups = SpyGroups::new(["sysop"]);
    assert!(!service.evaluator().can_access_resource(&groups, id, 6));
    assert_eq!(groups.calls(), 0);
}

#[test]
fn test_storage_failure_denies_access() {
    let service = FilePermissions::with_storage(sample_config(), Arc::new(FailingBackend));
    let groups = SpyGroups::new(["sysop"]);

    assert!(!service
        .evaluator()
        .can_access_resource(&groups, ResourceId::new(1), 6));
    assert!(service.evaluator().effective_level(ResourceId::new(1), 6).is_err());
}

#[test]
fn test_storage_failure_on_write_propagates() {
    let service =
        FilePermissions::with_storage(Config::builder().build(), Arc::new(FailingBackend));
    let err = service
        .change_level("alice", ResourceId::new(1), "public")
        .unwrap_err();
    assert!(matches!(err, fileperm_core::LevelError::Storage(_)));
}
