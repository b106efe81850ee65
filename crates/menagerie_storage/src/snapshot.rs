//! Plain entity records produced by save and consumed by load.

use std::sync::Arc;

use indexmap::IndexMap;
use menagerie_foundation::{EntityId, Value};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One entity's id and component values.
///
/// Components keep their order; load installs them in that order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EntitySnapshot {
    /// The entity id.
    pub id: EntityId,
    /// Component values by name.
    pub components: IndexMap<Arc<str>, Value>,
}

impl EntitySnapshot {
    /// Creates a snapshot with no components.
    #[must_use]
    pub fn new(id: impl Into<EntityId>) -> Self {
        Self {
            id: id.into(),
            components: IndexMap::new(),
        }
    }

    /// Builder method to add a component value.
    #[must_use]
    pub fn with(mut self, name: impl Into<Arc<str>>, value: impl Into<Value>) -> Self {
        self.components.insert(name.into(), value.into());
        self
    }

    /// Returns a component value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.components.get(name)
    }
}
