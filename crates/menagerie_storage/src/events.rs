//! Component add/remove notifications.
//!
//! Listeners subscribe per event kind and component name and are called in
//! registration order. A listener receives the store mutably and may change
//! it, including triggering further events.
//!
//! During a load, events are collected in an [`EventBatch`] instead of being
//! delivered, then delivered in order once the load finishes.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use menagerie_foundation::{ComponentId, EntityId, Value};

use crate::store::EntityStore;

/// A component event listener: `(store, entity, component name, value)`.
///
/// For removals, `value` is the value the component held before removal.
pub type Listener = Rc<dyn Fn(&mut EntityStore, EntityId, &str, &Value)>;

/// Which change an event reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A component appeared on an entity.
    Add,
    /// A component was removed from an entity.
    Remove,
}

/// A component change.
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentEvent {
    /// Which change occurred.
    pub kind: EventKind,
    /// The entity that changed.
    pub entity: EntityId,
    /// The component that changed.
    pub component: ComponentId,
    /// The component's name.
    pub name: Arc<str>,
    /// The added value, or the value held before removal.
    pub value: Value,
}

impl ComponentEvent {
    /// Returns a copy safe to hold after the component's composite handle
    /// has gone back to its pool.
    ///
    /// Removal events get a detached copy of their value. Add events keep the
    /// live handle so deferred listeners see the populated composite; the
    /// store drops a held add event whose value has left the entity by the
    /// time it would be delivered.
    #[must_use]
    pub fn into_deferred(self) -> Self {
        match self.kind {
            EventKind::Add => self,
            EventKind::Remove => Self {
                value: self.value.detached(),
                ..self
            },
        }
    }
}

/// Events held back for later delivery, in the order they occurred.
#[derive(Clone, Debug, Default)]
pub struct EventBatch {
    events: Vec<ComponentEvent>,
}

impl EventBatch {
    /// Creates an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an event.
    pub fn push(&mut self, event: ComponentEvent) {
        self.events.push(event.into_deferred());
    }

    /// Returns the number of queued events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if no events are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl IntoIterator for EventBatch {
    type Item = ComponentEvent;
    type IntoIter = std::vec::IntoIter<ComponentEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

/// Listener lists keyed by event kind and component.
#[derive(Default)]
pub(crate) struct Listeners {
    lists: HashMap<(EventKind, ComponentId), Vec<Listener>>,
}

impl Listeners {
    pub(crate) fn subscribe(&mut self, kind: EventKind, component: ComponentId, listener: Listener) {
        self.lists.entry((kind, component)).or_default().push(listener);
    }

    /// Returns the listeners for an event, cloned so the caller can hand the
    /// store to them.
    pub(crate) fn for_event(&self, kind: EventKind, component: ComponentId) -> Option<Vec<Listener>> {
        self.lists
            .get(&(kind, component))
            .filter(|list| !list.is_empty())
            .cloned()
    }

    pub(crate) fn count(&self, kind: EventKind, component: ComponentId) -> usize {
        self.lists.get(&(kind, component)).map_or(0, Vec::len)
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.lists.iter().map(|(key, list)| (key, list.len())))
            .finish()
    }
}
