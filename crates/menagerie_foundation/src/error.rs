//! Error types for the Menagerie store.
//!
//! Uses `thiserror` for ergonomic error definition. Every error is a
//! configuration or usage mistake reported synchronously at the offending
//! call; nothing is retried.

use thiserror::Error;

use crate::entity::EntityId;

/// Result type for Menagerie operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Menagerie operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind }
    }

    /// Creates an invalid pool size error.
    #[must_use]
    pub fn invalid_pool_size(size: usize) -> Self {
        Self::new(ErrorKind::InvalidPoolSize(size))
    }

    /// Creates an unregistered component error.
    #[must_use]
    pub fn unregistered_component(component: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnregisteredComponent(component.into()))
    }

    /// Creates an entity not found error.
    #[must_use]
    pub fn entity_not_found(id: EntityId) -> Self {
        Self::new(ErrorKind::EntityNotFound(id))
    }

    /// Creates a search already registered error.
    #[must_use]
    pub fn search_already_registered(search: impl Into<String>) -> Self {
        Self::new(ErrorKind::SearchAlreadyRegistered(search.into()))
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// A pool was given an initial size of zero.
    #[error("pool size must be greater than zero, got {0}")]
    InvalidPoolSize(usize),

    /// A composite component was added without a registration.
    #[error(
        "component {0:?} has not been registered; call register_component before add_component"
    )]
    UnregisteredComponent(String),

    /// A component name was registered twice.
    #[error("component {0:?} is already registered")]
    ComponentAlreadyRegistered(String),

    /// `set_component` was handed a composite value.
    #[error(
        "set_component({component:?}) only accepts primitive values; use add_component and populate the returned value"
    )]
    CompositeValue {
        /// The component being set.
        component: String,
    },

    /// `set_component` targeted a component currently holding a composite.
    #[error(
        "component {component:?} on {entity} holds a composite value; remove it before setting a primitive"
    )]
    CompositeInPlace {
        /// The entity being modified.
        entity: EntityId,
        /// The component being set.
        component: String,
    },

    /// A search name was registered twice.
    #[error("search {0:?} is already registered")]
    SearchAlreadyRegistered(String),

    /// A search was registered with no components.
    #[error("search {0:?} must name at least one component")]
    EmptySearch(String),

    /// The entity is not live.
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),

    /// A loaded snapshot reused a live id or repeated an id within the batch.
    #[error("duplicate entity in load: {0}")]
    DuplicateEntity(EntityId),
}
