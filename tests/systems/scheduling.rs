//! Integration tests for system scheduling
//!
//! Tests per-entity systems, run counting, and timings.

use std::time::Duration;

use menagerie_foundation::{Composite, Value};
use menagerie_storage::{ComponentDef, EntityStore};
use menagerie_systems::Scheduler;

fn number(store: &EntityStore, id: menagerie_foundation::EntityId, field: &str) -> f64 {
    store
        .get_component(id, "body")
        .and_then(|body| {
            body.as_composite()
                .and_then(|c| c.borrow().get(field).and_then(Value::as_number))
        })
        .unwrap_or_default()
}

fn world() -> EntityStore {
    let mut store = EntityStore::new();
    store
        .register_component(
            "body",
            ComponentDef::new(|| Composite::record().with("x", 0.0).with("dx", 0.0)).with_reset(
                |body| {
                    body.set("x", 0.0);
                    body.set("dx", 0.0);
                },
            ),
        )
        .unwrap();
    store.register_search("moving", &["body"]).unwrap();
    store
}

#[test]
fn movement_system_integrates_velocity() {
    let mut store = world();
    let id = store.create();
    {
        let body = store.add_component(id, "body").unwrap();
        body.borrow_mut().set("dx", 4.0);
    }

    let mut scheduler = Scheduler::new();
    scheduler.add_each("movement", "moving", |store, id, elapsed: &f64| {
        let Some(Value::Composite(body)) = store.get_component(id, "body") else {
            return;
        };
        let mut body = body.borrow_mut();
        let x = body.get("x").and_then(Value::as_number).unwrap_or_default();
        let dx = body.get("dx").and_then(Value::as_number).unwrap_or_default();
        body.set("x", x + dx * elapsed);
    });

    for _ in 0..4 {
        scheduler.run(&mut store, &0.25);
    }

    assert!((number(&store, id, "x") - 4.0).abs() < f64::EPSILON);
    assert_eq!(scheduler.runs(), 4);
}

#[test]
fn systems_see_changes_from_earlier_systems() {
    let mut store = world();
    store.register_search("spawners", &["spawner"]).unwrap();
    let spawner = store.create();
    store.set_component(spawner, "spawner", true).unwrap();

    let mut scheduler = Scheduler::new();
    scheduler.add_each("spawn", "spawners", |store, _, _: &()| {
        let child = store.create();
        store.add_component(child, "body").unwrap();
    });
    scheduler.add("count", |store, _: &()| {
        let moving = i64::try_from(store.find("moving").len()).unwrap();
        let first = store.entities().next().unwrap();
        store.set_component(first, "seen", moving).unwrap();
    });

    scheduler.run(&mut store, &());
    scheduler.run(&mut store, &());

    assert_eq!(store.find("moving").len(), 2);
    assert_eq!(store.get_component(spawner, "seen"), Some(Value::Int(2)));
}

#[test]
fn reaper_destroys_matches_without_skipping() {
    let mut store = world();
    for _ in 0..10 {
        let id = store.create();
        store.add_component(id, "body").unwrap();
    }

    let mut scheduler = Scheduler::new();
    scheduler.add_each("reaper", "moving", |store, id, _: &()| {
        store.destroy(id).unwrap();
    });
    scheduler.run(&mut store, &());

    assert!(store.is_empty());
    assert_eq!(store.pool_stats("body").unwrap().available, 16);
}

#[test]
fn timings_follow_registration_order() {
    let mut store = world();
    let mut scheduler = Scheduler::new();
    scheduler.add("first", |_, _: &()| {});
    scheduler.add_each("second", "moving", |_, _, _: &()| {});
    scheduler.run(&mut store, &());

    let names: Vec<_> = scheduler.timings().into_iter().map(|t| t.name).collect();
    assert_eq!(names, vec!["first", "second"]);

    scheduler.reset_timings();
    assert!(scheduler.timings().iter().all(|t| t.time == Duration::ZERO));
}
