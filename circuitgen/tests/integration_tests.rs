//! Integration tests for the circuit operations over the SQLite store

use circuitgen::prelude::*;
use circuitgen::{CircuitDraft, CircuitPatch, StoreError};
use std::path::PathBuf;
use tempfile::TempDir;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load<T: serde::de::DeserializeOwned>(name: &str) -> T {
    let text = std::fs::read_to_string(fixture_path(name)).expect("Should read fixture");
    serde_json::from_str(&text).expect("Should parse fixture")
}

fn sqlite_service() -> (CircuitService<SqliteStore>, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::default().with_database_path(temp_dir.path().join("circuits.db"));
    let store = SqliteStore::new(&config.database_path).unwrap();
    (CircuitService::new(store, config), temp_dir)
}

#[test]
fn test_create_and_get() {
    let (service, _temp) = sqlite_service();
    let draft: CircuitDraft = load("blinky.json");

    let created = service.create(draft.clone()).expect("Valid circuit should be stored");
    assert!(created.id > 0);
    assert!(created.updated_at.is_none());
    assert_eq!(created.components, draft.components);
    assert_eq!(created.connections, draft.connections);
    assert_eq!(created.metadata, draft.metadata);
    assert!(created.is_public);

    let fetched = service.get(created.id).unwrap().expect("Should find circuit");
    assert_eq!(fetched, created);
}

#[test]
fn test_create_rejections_leave_store_untouched() {
    let (service, _temp) = sqlite_service();

    let err = service.create(load("dangling_connection.json")).unwrap_err();
    assert!(matches!(
        err,
        CircuitError::Validation(ValidationError::DanglingConnectionReference(ref id)) if id == "c3"
    ));

    let err = service.create(load("duplicate_ids.json")).unwrap_err();
    assert!(matches!(
        err,
        CircuitError::Validation(ValidationError::DuplicateComponentId(_))
    ));

    assert!(service.list(0, None, false).unwrap().is_empty());
}

#[test]
fn test_create_empty_circuit_with_stray_connections() {
    let (service, _temp) = sqlite_service();
    let draft = CircuitDraft::new("Scratch")
        .with_connection(Connection::new("w1", ("nothing", "1"), ("here", "2")));

    let created = service.create(draft).expect("Empty component list is always valid");
    assert_eq!(created.connections.len(), 1);
}

#[test]
fn test_update_name_only() {
    let (service, _temp) = sqlite_service();
    let created = service.create(load("blinky.json")).unwrap();

    let patch: CircuitPatch = load("rename_patch.json");
    let updated = service.update(created.id, patch).unwrap().expect("Should exist");

    assert_eq!(updated.name, "Blinky v2");
    assert_eq!(updated.components, created.components);
    assert_eq!(updated.connections, created.connections);
    assert_eq!(updated.metadata, created.metadata);
    assert_eq!(updated.is_public, created.is_public);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at.is_some());

    let stored = service.get(created.id).unwrap().unwrap();
    assert_eq!(stored, updated);
}

#[test]
fn test_update_revalidates_mixed_old_and_new() {
    let (service, _temp) = sqlite_service();
    let created = service.create(load("blinky.json")).unwrap();

    // New connections against the stored components.
    let patch: CircuitPatch = load("rewire_patch.json");
    let err = service.update(created.id, patch).unwrap_err();
    assert!(matches!(
        err,
        CircuitError::Validation(ValidationError::DanglingConnectionReference(ref id)) if id == "missing"
    ));

    // Dropping a component that stored connections still reference.
    let patch = CircuitPatch {
        components: Some(created.components[..2].to_vec()),
        ..Default::default()
    };
    let err = service.update(created.id, patch).unwrap_err();
    assert!(matches!(
        err,
        CircuitError::Validation(ValidationError::DanglingConnectionReference(ref id)) if id == "led1"
    ));

    let stored = service.get(created.id).unwrap().unwrap();
    assert_eq!(stored, created, "Rejected updates must not be persisted");
}

#[test]
fn test_update_replaces_sequences_wholesale() {
    let (service, _temp) = sqlite_service();
    let created = service.create(load("blinky.json")).unwrap();

    let patch = CircuitPatch {
        connections: Some(vec![]),
        is_public: Some(false),
        ..Default::default()
    };
    let updated = service.update(created.id, patch).unwrap().unwrap();
    assert!(updated.connections.is_empty());
    assert_eq!(updated.components.len(), 4);
    assert!(!updated.is_public);
}

#[test]
fn test_update_missing_is_not_an_error() {
    let (service, _temp) = sqlite_service();
    let patch = CircuitPatch {
        name: Some("whatever".to_string()),
        ..Default::default()
    };
    assert!(service.update(404, patch).unwrap().is_none());
}

#[test]
fn test_duplicate_is_private_copy() {
    let (service, _temp) = sqlite_service();
    let original = service.create(load("blinky.json")).unwrap();
    assert!(original.is_public);

    let copy = service.duplicate(original.id, None).unwrap().expect("Should exist");
    assert_ne!(copy.id, original.id);
    assert_eq!(copy.name, "Blinky (Copy)");
    assert!(!copy.is_public);
    assert_eq!(copy.description, original.description);
    assert_eq!(copy.components, original.components);
    assert_eq!(copy.connections, original.connections);
    assert_eq!(copy.metadata, original.metadata);

    let named = service
        .duplicate(original.id, Some("Blinky fork".to_string()))
        .unwrap()
        .unwrap();
    assert_eq!(named.name, "Blinky fork");
    assert!(!named.is_public);

    assert!(service.duplicate(9999, None).unwrap().is_none());
}

#[test]
fn test_duplicate_does_not_revalidate() {
    let store = MemoryStore::new();
    // Written straight to the store, bypassing the service checks.
    let broken = store
        .insert(
            CircuitDraft::new("Legacy")
                .with_component(Component::new("a", ComponentKind::Wire, "A"))
                .with_connection(Connection::new("w1", ("a", "1"), ("gone", "1")))
                .into(),
        )
        .unwrap();
    let service = CircuitService::new(store, Config::default());

    let copy = service.duplicate(broken.id, None).unwrap().unwrap();
    assert_eq!(copy.connections, broken.connections);
}

#[test]
fn test_export() {
    let (service, _temp) = sqlite_service();
    let created = service.create(load("blinky.json")).unwrap();

    let export = service.export(created.id).unwrap().expect("Should exist");
    assert_eq!(export.name, created.name);
    assert_eq!(export.description, created.description);
    assert_eq!(export.components, created.components);
    assert_eq!(export.connections, created.connections);
    assert_eq!(export.metadata, created.metadata);

    let json = serde_json::to_value(&export).unwrap();
    for key in ["name", "description", "components", "connections", "metadata", "exported_at"] {
        assert!(json.get(key).is_some(), "export should carry '{}'", key);
    }
    assert!(json.get("id").is_none());
    assert!(json.get("is_public").is_none());

    assert!(service.export(12345).unwrap().is_none());
    assert_eq!(service.get(created.id).unwrap().unwrap(), created);
}

#[test]
fn test_delete() {
    let (service, _temp) = sqlite_service();
    let created = service.create(load("blinky.json")).unwrap();

    assert!(service.delete(created.id).unwrap());
    assert!(!service.delete(created.id).unwrap());
    assert!(service.get(created.id).unwrap().is_none());
}

#[test]
fn test_list_public_only() {
    let (service, _temp) = sqlite_service();
    service.create(CircuitDraft::new("private")).unwrap();
    let public = service.create(CircuitDraft::new("shared").public(true)).unwrap();

    let listed = service.list(0, None, true).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, public.id);
    assert_eq!(service.list(0, None, false).unwrap().len(), 2);
}

#[test]
fn test_store_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("circuits.db");

    let id = {
        let service = CircuitService::new(SqliteStore::new(&path).unwrap(), Config::default());
        service.create(load("blinky.json")).unwrap().id
    };

    let store = SqliteStore::open(&path).unwrap();
    let found = store.find(id).unwrap().expect("Should persist across connections");
    assert_eq!(found.name, "Blinky");
    assert!(matches!(
        store.save(&circuitgen::Circuit { id: id + 1, ..found }),
        Err(StoreError::Missing(_))
    ));
}
