use fileperm_core::test_utils::{broken_config, memory_service, sample_config, SpyGroups};
use fileperm_core::{
    AccessSurface, Config, Enforcer, LevelBackend, Level, ResourceKey, FILE_NAMESPACE,
};

#[test]
fn test_fail_closed_never_consults_groups() {
    let (storage, service) = memory_service(broken_config());
    let id = storage.create_resource(ResourceKey::file("Secret.pdf"));
    storage.upsert_level(id, &Level::new("public")).unwrap();

    let evaluator = service.evaluator();
    let groups = SpyGroups::new(["sysop", "staff"]);

    for level in ["public", "internal", "confidential", "*", "Public", ""] {
        assert!(!evaluator.can_access_level(&groups, level));
    }
    assert!(!evaluator.can_access_resource(&groups, id, FILE_NAMESPACE));
    assert_eq!(groups.calls(), 0);
}

#[test]
fn test_wildcard_tracks_live_level_set() {
    let config = sample_config();
    let map = config.level_group_map();
    assert!(map.get("confidential").unwrap().contains(&"sysop".to_string()));
    // Configuration order: sysop is granted before legal
    assert_eq!(map.get("confidential").unwrap(), &["sysop", "legal"]);
    assert_eq!(map.get("public").unwrap(), &["sysop", "staff"]);
}

#[test]
fn test_unrestricted_fallback_with_no_groups() {
    let config = Config::builder()
        .levels(["public", "internal"])
        .grant("staff", ["internal"])
        .build();
    assert!(!config.is_invalid());
    assert!(config.resolve_default(FILE_NAMESPACE).is_none());
    let (storage, service) = memory_service(config);
    let id = storage.create_resource(ResourceKey::file("Plain.txt"));

    let none: Vec<String> = Vec::new();
    assert!(service.evaluator().can_access_resource(&none, id, FILE_NAMESPACE));
}

#[test]
fn test_namespace_default_wins_over_global() {
    let config = Config::builder()
        .levels(["public", "internal"])
        .default_level("public")
        .namespace_default(6, "internal")
        .build();
    assert_eq!(config.resolve_default(6).unwrap(), "internal");
    assert_eq!(config.resolve_default(0).unwrap(), "public");
}

#[test]
fn test_invalid_namespace_default_falls_through_to_global() {
    let config = Config::builder()
        .levels(["public", "internal"])
        .default_level("public")
        .namespace_default(6, "removed")
        .build();
    assert!(config.is_invalid());
    assert_eq!(config.resolve_default(6).unwrap(), "public");
}

#[test]
fn test_misspelled_default_denies_unlabelled_files() {
    let config = Config::builder()
        .levels(["public", "confidential"])
        .grant("sysop", ["*"])
        .default_level("confidentail")
        .build();
    assert!(config.is_invalid());
    let (storage, service) = memory_service(config);
    let id = storage.create_resource(ResourceKey::file("Unlabelled.pdf"));

    let evaluator = service.evaluator();
    let none: Vec<String> = Vec::new();
    assert!(evaluator.effective_level(id, FILE_NAMESPACE).unwrap().is_none());
    assert!(!evaluator.can_access_resource(&none, id, FILE_NAMESPACE));
    assert!(!evaluator.can_access_resource(&["sysop"], id, FILE_NAMESPACE));
}

#[test]
fn test_every_surface_gives_same_answer() {
    let (storage, service) = memory_service(sample_config());
    let explicit = storage.create_resource(ResourceKey::file("Explicit.pdf"));
    let defaulted = storage.create_resource(ResourceKey::file("Defaulted.pdf"));
    service.change_level("admin", explicit, "confidential").unwrap();

    let evaluator = service.evaluator();
    let enforcer = Enforcer::new(&evaluator);
    let users: [&[&str]; 4] = [&[], &["staff"], &["legal"], &["sysop"]];

    for groups in users {
        for id in [explicit, defaulted] {
            let expected = evaluator.can_access_resource(groups, id, FILE_NAMESPACE);
            for surface in AccessSurface::ALL {
                assert_eq!(
                    enforcer.check(surface, groups, id, FILE_NAMESPACE).is_ok(),
                    expected,
                    "{:?} disagreed for {:?} on {}",
                    surface,
                    groups,
                    id
                );
            }
        }
    }
}

#[test]
fn test_duplicate_levels_deduplicated_in_order() {
    let config = Config::builder()
        .levels(["public", "internal", "public"])
        .build();
    let names: Vec<&str> = config.levels().iter().map(|l| l.as_str()).collect();
    assert_eq!(names, vec!["public", "internal"]);
    assert!(!config.is_valid_level("Public"));
    assert!(!config.is_valid_level("pub"));
}
