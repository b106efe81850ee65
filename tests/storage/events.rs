//! Integration tests for add and remove events
//!
//! Tests listener ordering, payloads, and listeners that change the store.

use std::cell::RefCell;
use std::rc::Rc;

use menagerie_foundation::{Composite, EntityId, Value};
use menagerie_storage::{ComponentDef, EntityStore};

type Log = Rc<RefCell<Vec<String>>>;

fn logger(log: &Log, label: &'static str) -> impl Fn(&mut EntityStore, EntityId, &str, &Value) + 'static {
    let log = log.clone();
    move |_, id, name, value| {
        log.borrow_mut().push(format!("{label} {id} {name}={value}"));
    }
}

#[test]
fn add_fires_once_per_appearance() {
    let log = Log::default();
    let mut store = EntityStore::new();
    store.on_add_component("score", logger(&log, "add"));
    let id = store.create();

    store.set_component(id, "score", 1).unwrap();
    store.set_component(id, "score", 2).unwrap();
    store.remove_component(id, "score").unwrap();
    store.set_component(id, "score", 3).unwrap();

    assert_eq!(
        *log.borrow(),
        vec!["add Entity(0) score=1", "add Entity(0) score=3"]
    );
}

#[test]
fn remove_reports_last_value() {
    let log = Log::default();
    let mut store = EntityStore::new();
    store.on_remove_component("score", logger(&log, "remove"));
    let id = store.create();

    store.set_component(id, "score", 1).unwrap();
    store.set_component(id, "score", 2).unwrap();
    store.set_component(id, "score", Value::Unset).unwrap();

    assert_eq!(*log.borrow(), vec!["remove Entity(0) score=2"]);
}

#[test]
fn listeners_only_hear_their_component() {
    let log = Log::default();
    let mut store = EntityStore::new();
    store.on_add_component("a", logger(&log, "add"));
    let id = store.create();

    store.set_component(id, "b", 1).unwrap();
    assert!(log.borrow().is_empty());
}

#[test]
fn destroy_reports_each_component_in_order() {
    let log = Log::default();
    let mut store = EntityStore::new();
    for name in ["first", "second", "third"] {
        store.on_remove_component(name, logger(&log, "remove"));
    }
    let id = store.create();
    store.set_component(id, "second", 2).unwrap();
    store.set_component(id, "first", 1).unwrap();
    store.set_component(id, "third", 3).unwrap();

    store.destroy(id).unwrap();
    assert_eq!(
        *log.borrow(),
        vec![
            "remove Entity(0) second=2",
            "remove Entity(0) first=1",
            "remove Entity(0) third=3",
        ]
    );
}

#[test]
fn remove_listener_sees_populated_composite() {
    let log = Log::default();
    let mut store = EntityStore::new();
    store
        .register_component(
            "hp",
            ComponentDef::new(|| Composite::record().with("value", 0)).with_reset(|hp| {
                hp.set("value", 0);
            }),
        )
        .unwrap();
    store.on_remove_component("hp", logger(&log, "remove"));
    let id = store.create();
    store
        .add_component(id, "hp")
        .unwrap()
        .borrow_mut()
        .set("value", 42);

    store.remove_component(id, "hp").unwrap();
    assert_eq!(*log.borrow(), vec!["remove Entity(0) hp={value: 42}"]);
}

#[test]
fn listener_registered_during_dispatch_waits_for_next_event() {
    let log = Log::default();
    let mut store = EntityStore::new();
    let inner = log.clone();
    store.on_add_component("tag", move |store, _, _, _| {
        let inner = inner.clone();
        store.on_add_component("tag", move |_, id, _, _| {
            inner.borrow_mut().push(format!("late {id}"));
        });
    });

    let a = store.create();
    store.set_component(a, "tag", true).unwrap();
    assert!(log.borrow().is_empty());

    let b = store.create();
    store.set_component(b, "tag", true).unwrap();
    assert_eq!(*log.borrow(), vec![format!("late {b}")]);
}

#[test]
fn cascading_listeners() {
    let mut store = EntityStore::new();
    store.on_add_component("burning", |store, id, _, _| {
        store.set_component(id, "smoking", true).unwrap();
    });
    store.on_remove_component("burning", |store, id, _, _| {
        store.remove_component(id, "smoking").unwrap();
    });
    store.register_search("visible", &["smoking"]).unwrap();

    let id = store.create();
    store.set_component(id, "burning", true).unwrap();
    assert_eq!(store.find("visible"), &[id]);

    store.remove_component(id, "burning").unwrap();
    assert!(store.find("visible").is_empty());
}

#[test]
fn listener_removing_same_component_sees_consistent_store() {
    let mut store = EntityStore::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    store.on_remove_component("shield", move |store, id, _, _| {
        // Still on the entity, already out of the searches
        sink.borrow_mut()
            .push((store.has_component(id, "shield"), store.find("shield").len()));
        store.remove_component(id, "shield").unwrap();
    });

    let id = store.create();
    store.set_component(id, "shield", 5).unwrap();
    store.remove_component(id, "shield").unwrap();

    assert_eq!(*seen.borrow(), vec![(true, 0)]);
    assert!(!store.has_component(id, "shield"));
}
