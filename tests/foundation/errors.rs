//! Integration tests for error types
//!
//! Tests that error messages name what went wrong and what to do instead.

use menagerie_foundation::{EntityId, Error, ErrorKind};

#[test]
fn unregistered_component_suggests_registration() {
    let msg = Error::unregistered_component("hp").to_string();
    assert!(msg.contains("\"hp\""));
    assert!(msg.contains("register_component"));
}

#[test]
fn composite_value_suggests_add_component() {
    let err = Error::new(ErrorKind::CompositeValue {
        component: "hp".to_string(),
    });
    assert!(err.to_string().contains("add_component"));
}

#[test]
fn composite_in_place_names_entity_and_component() {
    let err = Error::new(ErrorKind::CompositeInPlace {
        entity: EntityId(7),
        component: "hp".to_string(),
    });
    let msg = err.to_string();
    assert!(msg.contains("Entity(7)"));
    assert!(msg.contains("\"hp\""));
    assert!(msg.contains("remove it"));
}

#[test]
fn entity_errors_show_ids() {
    assert_eq!(
        Error::entity_not_found(EntityId(3)).to_string(),
        "entity not found: Entity(3)"
    );
    assert_eq!(
        Error::from(ErrorKind::DuplicateEntity(EntityId(5))).to_string(),
        "duplicate entity in load: Entity(5)"
    );
}

#[test]
fn errors_compare_by_kind() {
    assert_eq!(
        Error::search_already_registered("alive"),
        Error::new(ErrorKind::SearchAlreadyRegistered("alive".into()))
    );
    assert_ne!(Error::invalid_pool_size(0), Error::invalid_pool_size(1));
}

#[test]
fn error_is_std_error() {
    fn assert_error<E: std::error::Error + Send + Sync + 'static>(_: &E) {}
    assert_error(&Error::invalid_pool_size(0));
}
