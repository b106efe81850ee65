//! Integration tests for live searches
//!
//! Tests registration, initial scans, and result maintenance on every change.

use menagerie_foundation::{Composite, EntityId, ErrorKind};
use menagerie_storage::{ComponentDef, EntityStore};

fn sorted(ids: &[EntityId]) -> Vec<EntityId> {
    let mut ids = ids.to_vec();
    ids.sort();
    ids
}

#[test]
fn alive_search_follows_hp() {
    let mut store = EntityStore::new();
    store
        .register_component(
            "hp",
            ComponentDef::new(|| Composite::record().with("value", 0)),
        )
        .unwrap();
    store.register_search("alive", &["hp"]).unwrap();

    let id = store.create();
    store
        .add_component(id, "hp")
        .unwrap()
        .borrow_mut()
        .set("value", 10);
    assert_eq!(store.find("alive"), &[id]);

    store.remove_component(id, "hp").unwrap();
    assert_eq!(store.find("alive"), &[] as &[EntityId]);
}

#[test]
fn duplicate_registration_is_rejected() {
    let mut store = EntityStore::new();
    store.register_search("movers", &["x", "dx"]).unwrap();

    let err = store.register_search("movers", &["y"]).unwrap_err();
    assert_eq!(
        err.kind,
        ErrorKind::SearchAlreadyRegistered("movers".to_string())
    );
    assert_eq!(store.search_components("movers"), Some(vec!["x", "dx"]));
}

#[test]
fn empty_search_is_rejected() {
    let mut store = EntityStore::new();
    let err = store.register_search("nothing", &[]).unwrap_err();
    assert_eq!(err.kind, ErrorKind::EmptySearch("nothing".to_string()));
}

#[test]
fn repeated_components_count_once() {
    let mut store = EntityStore::new();
    store.register_search("twice", &["x", "x"]).unwrap();
    assert_eq!(store.search_components("twice"), Some(vec!["x"]));

    let id = store.create();
    store.set_component(id, "x", 1).unwrap();
    assert_eq!(store.find("twice"), &[id]);
}

#[test]
fn late_registration_sees_existing_entities() {
    let mut store = EntityStore::new();
    let ids: Vec<_> = (0..12).map(|_| store.create()).collect();
    for (i, &id) in ids.iter().enumerate() {
        if i % 2 == 0 {
            store.set_component(id, "even", true).unwrap();
        }
        if i % 3 == 0 {
            store.set_component(id, "third", true).unwrap();
        }
    }

    store.register_search("sixth", &["even", "third"]).unwrap();
    assert_eq!(store.find("sixth"), &[ids[0], ids[6]]);
    assert_eq!(store.find("even").len(), 6);
    assert_eq!(store.find("third").len(), 4);
}

#[test]
fn every_component_gets_its_own_search() {
    let mut store = EntityStore::new();
    let id = store.create();
    store.set_component(id, "name", "jimmy").unwrap();

    assert_eq!(store.search_components("name"), Some(vec!["name"]));
    assert_eq!(store.find("name"), &[id]);
}

#[test]
fn multi_component_results_track_every_change() {
    let mut store = EntityStore::new();
    store
        .register_component("body", ComponentDef::new(Composite::record))
        .unwrap();
    store.register_search("physical", &["body", "mass"]).unwrap();

    let a = store.create();
    let b = store.create();
    store.add_component(a, "body").unwrap();
    store.set_component(a, "mass", 2.0).unwrap();
    store.set_component(b, "mass", 1.0).unwrap();
    assert_eq!(store.find("physical"), &[a]);

    store.add_component(b, "body").unwrap();
    assert_eq!(sorted(store.find("physical")), vec![a, b]);

    store.set_component(a, "mass", 3.0).unwrap();
    assert_eq!(store.find("physical").len(), 2, "overwrite keeps membership");

    store.destroy(a).unwrap();
    assert_eq!(store.find("physical"), &[b]);

    store.set_component(b, "mass", menagerie_foundation::Value::Unset).unwrap();
    assert!(store.find("physical").is_empty());
    assert_eq!(store.find("body"), &[b]);
}

#[test]
fn results_are_in_qualification_order() {
    let mut store = EntityStore::new();
    let a = store.create();
    let b = store.create();
    let c = store.create();
    for id in [c, a, b] {
        store.set_component(id, "tag", true).unwrap();
    }
    assert_eq!(store.find("tag"), &[c, a, b]);
}

#[test]
fn unknown_search_finds_nothing() {
    let store = EntityStore::new();
    assert!(store.find("ghosts").is_empty());
    assert_eq!(store.search_components("ghosts"), None);
}
