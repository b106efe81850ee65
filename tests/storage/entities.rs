//! Integration tests for entity lifecycle
//!
//! Tests creation, destruction, id recycling, and pool growth.

use menagerie_foundation::{Composite, EntityId, ErrorKind};
use menagerie_storage::{ComponentDef, EntityStore, StoreConfig};

// =============================================================================
// Creation
// =============================================================================

#[test]
fn create_returns_distinct_live_ids() {
    let mut store = EntityStore::new();
    let ids: Vec<_> = (0..5).map(|_| store.create()).collect();

    for (i, id) in ids.iter().enumerate() {
        assert!(store.exists(*id));
        assert!(!ids[i + 1..].contains(id));
    }
    assert_eq!(store.len(), 5);
}

#[test]
fn new_entity_has_no_components() {
    let mut store = EntityStore::new();
    let id = store.create();
    assert_eq!(store.component_names(id), Some(vec![]));
    assert_eq!(store.get_component(id, "anything"), None);
}

#[test]
fn entities_iterate_in_id_order() {
    let mut store = EntityStore::new();
    let a = store.create();
    let b = store.create();
    let c = store.create();
    store.destroy(b).unwrap();

    let live: Vec<_> = store.entities().collect();
    assert_eq!(live, vec![a, c]);
}

// =============================================================================
// Destruction
// =============================================================================

#[test]
fn destroy_twice_is_an_error() {
    let mut store = EntityStore::new();
    let id = store.create();
    store.destroy(id).unwrap();

    let err = store.destroy(id).unwrap_err();
    assert_eq!(err.kind, ErrorKind::EntityNotFound(id));
}

#[test]
fn destroy_releases_every_composite() {
    let mut store = EntityStore::new();
    for name in ["hp", "mana"] {
        store
            .register_component(name, ComponentDef::new(Composite::record).with_pool_size(2))
            .unwrap();
    }
    let id = store.create();
    store.add_component(id, "hp").unwrap();
    store.add_component(id, "mana").unwrap();
    assert_eq!(store.pool_stats("hp").unwrap().available, 1);

    store.destroy(id).unwrap();
    assert_eq!(store.pool_stats("hp").unwrap().available, 2);
    assert_eq!(store.pool_stats("mana").unwrap().available, 2);
}

#[test]
fn reads_on_missing_entity_are_empty() {
    let store = EntityStore::new();
    let ghost = EntityId(12);
    assert!(!store.exists(ghost));
    assert!(!store.has_component(ghost, "hp"));
    assert_eq!(store.get_component(ghost, "hp"), None);
    assert_eq!(store.component_names(ghost), None);
}

#[test]
fn mutations_on_missing_entity_fail() {
    let mut store = EntityStore::new();
    store
        .register_component("hp", ComponentDef::new(Composite::record))
        .unwrap();
    let ghost = EntityId(12);

    for err in [
        store.set_component(ghost, "name", "x").unwrap_err(),
        store.add_component(ghost, "hp").unwrap_err(),
        store.remove_component(ghost, "name").unwrap_err(),
    ] {
        assert_eq!(err.kind, ErrorKind::EntityNotFound(ghost));
    }
}

// =============================================================================
// Recycling
// =============================================================================

#[test]
fn destroyed_records_are_reused_before_growth() {
    let mut store = EntityStore::with_config(StoreConfig::new().with_entity_pool_size(4)).unwrap();
    let ids: Vec<_> = (0..4).map(|_| store.create()).collect();
    assert_eq!(store.entity_pool_stats().available, 0);

    for id in &ids {
        store.destroy(*id).unwrap();
    }
    for _ in 0..4 {
        store.create();
    }
    assert_eq!(store.entity_pool_stats().capacity, 4);
}

#[test]
fn entity_pool_doubles_when_exhausted() {
    let mut store = EntityStore::new();
    for _ in 0..5 {
        store.create();
    }
    let stats = store.entity_pool_stats();
    assert_eq!(stats.capacity, 8);
    assert_eq!(stats.available, 3);
}

#[test]
fn recycled_entity_starts_clean() {
    let mut store = EntityStore::new();
    let id = store.create();
    store.set_component(id, "name", "old").unwrap();
    store.destroy(id).unwrap();

    let again = store.create();
    assert_eq!(again, id);
    assert!(!store.has_component(again, "name"));
    assert!(store.find("name").is_empty());
}
