//! The entity store.
//!
//! `EntityStore` is the single owner of every structure that has to agree
//! with every other: the live entity table and its component maps, one pool
//! per composite component, the search result lists, and the listener
//! registry. Each public operation runs to completion and leaves all of them
//! consistent.
//!
//! # Policy
//!
//! Mutating an entity that is not live (`destroy`, `set_component`,
//! `add_component`, `remove_component`) is an `EntityNotFound` error. Reads
//! (`get_component`, `has_component`, `exists`) answer `None` or `false`.
//! Removing a component the entity does not hold is a no-op.

use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use menagerie_foundation::{
    ComponentId, CompositeRef, EntityId, Error, ErrorKind, Interner, Result, SymbolId, Value,
};

use crate::component::{ComponentDef, ComponentRegistry, PoolStats};
use crate::config::StoreConfig;
use crate::entity::EntityTable;
use crate::events::{ComponentEvent, EventBatch, EventKind, Listener, Listeners};
use crate::search::SearchIndex;
use crate::snapshot::EntitySnapshot;

/// In-memory entity-component store with live searches.
///
/// # Example
///
/// ```
/// use menagerie_foundation::{Composite, Value};
/// use menagerie_storage::{ComponentDef, EntityStore};
///
/// let mut store = EntityStore::new();
/// store
///     .register_component("hp", ComponentDef::new(|| Composite::record().with("value", Value::Null)))
///     .unwrap();
/// store.register_search("alive", &["hp"]).unwrap();
///
/// let id = store.create();
/// store.add_component(id, "hp").unwrap().borrow_mut().set("value", 10);
/// assert_eq!(store.find("alive"), &[id]);
///
/// store.remove_component(id, "hp").unwrap();
/// assert!(store.find("alive").is_empty());
/// ```
pub struct EntityStore {
    config: StoreConfig,
    interner: Interner,
    entities: EntityTable,
    components: ComponentRegistry,
    searches: SearchIndex,
    listeners: Listeners,
    // Removals whose listeners are still running
    removing: Vec<(EntityId, ComponentId)>,
    // Destroyed while a removal on them was still in flight
    pending_destroy: HashSet<EntityId>,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore {
    /// Creates an empty store with default pool sizes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: StoreConfig::default(),
            interner: Interner::new(),
            entities: EntityTable::new(),
            components: ComponentRegistry::default(),
            searches: SearchIndex::new(),
            listeners: Listeners::default(),
            removing: Vec::new(),
            pending_destroy: HashSet::new(),
        }
    }

    /// Creates an empty store with the given pool sizes.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPoolSize` if either size is zero.
    pub fn with_config(config: StoreConfig) -> Result<Self> {
        if config.default_component_pool_size == 0 {
            return Err(Error::invalid_pool_size(0));
        }
        let entities = EntityTable::with_pool_size(config.entity_pool_size)?;
        Ok(Self {
            config,
            interner: Interner::new(),
            entities,
            components: ComponentRegistry::default(),
            searches: SearchIndex::new(),
            listeners: Listeners::default(),
            removing: Vec::new(),
            pending_destroy: HashSet::new(),
        })
    }

    /// Returns the store configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // =========================================================================
    // Entity Lifecycle
    // =========================================================================

    /// Creates an entity with no components.
    pub fn create(&mut self) -> EntityId {
        self.entities.spawn()
    }

    /// Destroys an entity.
    ///
    /// Components are removed one at a time, first-added first, each with
    /// its index updates and remove event, before the entity's record goes
    /// back to the pool.
    ///
    /// Called from a remove listener of the same entity, the components
    /// whose removal is still in flight are left to finish; the entity is
    /// despawned when the last of them completes.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` if the entity is not live.
    pub fn destroy(&mut self, id: EntityId) -> Result<()> {
        self.entities.validate(id)?;

        while let Some(component) = self.next_removable(id) {
            self.remove_key(id, component, None)?;
        }

        if self.removing.iter().any(|&(entity, _)| entity == id) {
            self.pending_destroy.insert(id);
        } else if self.entities.exists(id) {
            // A remove listener may already have destroyed it
            self.entities.despawn(id)?;
        }
        Ok(())
    }

    fn next_removable(&self, id: EntityId) -> Option<ComponentId> {
        self.entities.components(id)?.keys().copied().find(|&component| {
            !self.removing.contains(&(id, component))
        })
    }

    /// Checks if an entity is live.
    #[must_use]
    pub fn exists(&self, id: EntityId) -> bool {
        self.entities.exists(id)
    }

    /// Returns the number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if there are no live entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterates over live entity ids in ascending order.
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.iter()
    }

    // =========================================================================
    // Component Registration
    // =========================================================================

    /// Registers a composite component, creating its pool.
    ///
    /// # Errors
    ///
    /// Returns `ComponentAlreadyRegistered` if `name` is registered, or
    /// `InvalidPoolSize` if the pool size is zero.
    pub fn register_component(&mut self, name: &str, def: ComponentDef) -> Result<()> {
        let component = self.interner.intern_component(name);
        let pool_size = def
            .pool_size()
            .unwrap_or(self.config.default_component_pool_size);
        self.components.register(component, name, def, pool_size)?;

        tracing::debug!(component = name, pool_size, "component registered");
        Ok(())
    }

    /// Returns true if `name` is registered as a composite component.
    #[must_use]
    pub fn is_registered(&self, name: &str) -> bool {
        self.interner
            .lookup_component(name)
            .is_some_and(|component| self.components.is_registered(component))
    }

    // =========================================================================
    // Component Access
    // =========================================================================

    /// Gets a component value. Composite values are returned as handles to
    /// the stored composite.
    #[must_use]
    pub fn get_component(&self, id: EntityId, name: &str) -> Option<Value> {
        let component = self.interner.lookup_component(name)?;
        self.entities.components(id)?.get(&component).cloned()
    }

    /// Checks if an entity holds a component.
    #[must_use]
    pub fn has_component(&self, id: EntityId, name: &str) -> bool {
        self.interner.lookup_component(name).is_some_and(|component| {
            self.entities
                .components(id)
                .is_some_and(|components| components.contains_key(&component))
        })
    }

    /// Returns the names of an entity's components in the order they were
    /// added.
    #[must_use]
    pub fn component_names(&self, id: EntityId) -> Option<Vec<&str>> {
        let components = self.entities.components(id)?;
        Some(
            components
                .keys()
                .filter_map(|&component| self.interner.component_name(component))
                .collect(),
        )
    }

    /// Sets a primitive component value.
    ///
    /// Setting [`Value::Unset`] removes the component.
    ///
    /// # Errors
    ///
    /// - `CompositeValue` if `value` is a composite; use
    ///   [`EntityStore::add_component`] instead.
    /// - `EntityNotFound` if the entity is not live.
    /// - `CompositeInPlace` if the entity holds a composite under `name`;
    ///   remove it first.
    pub fn set_component(
        &mut self,
        id: EntityId,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<()> {
        let value = value.into();
        if value.is_composite() {
            return Err(Error::new(ErrorKind::CompositeValue {
                component: name.to_string(),
            }));
        }
        self.entities.validate(id)?;

        if value.is_unset() && self.interner.lookup_component(name).is_none() {
            return Ok(());
        }
        let component = self.interner.intern_component(name);
        self.set_primitive(id, component, value, None)
    }

    /// Adds a composite component and returns it for in-place population.
    ///
    /// If the entity already holds a composite under `name`, that composite
    /// is reset and returned; nothing new is allocated.
    ///
    /// # Errors
    ///
    /// Returns `UnregisteredComponent` if `name` was never registered, or
    /// `EntityNotFound` if the entity is not live.
    pub fn add_component(&mut self, id: EntityId, name: &str) -> Result<CompositeRef> {
        let component = self
            .interner
            .lookup_component(name)
            .filter(|&component| self.components.is_registered(component))
            .ok_or_else(|| Error::unregistered_component(name))?;
        self.add_composite(id, component, None)
    }

    /// Removes a component. Does nothing if the entity does not hold it.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` if the entity is not live.
    pub fn remove_component(&mut self, id: EntityId, name: &str) -> Result<()> {
        self.entities.validate(id)?;
        match self.interner.lookup_component(name) {
            Some(component) => self.remove_key(id, component, None),
            None => Ok(()),
        }
    }

    // =========================================================================
    // Searches
    // =========================================================================

    /// Registers a search over a set of components.
    ///
    /// The result list is filled by scanning live entities once; afterwards
    /// it is kept current by every add and remove. Each listed component
    /// without a search of its own name also gets its single-component
    /// search.
    ///
    /// # Errors
    ///
    /// Returns `SearchAlreadyRegistered` if `name` exists, or `EmptySearch`
    /// if `components` is empty.
    pub fn register_search(&mut self, name: &str, components: &[&str]) -> Result<()> {
        if self.searches.contains(name) {
            return Err(Error::search_already_registered(name));
        }
        let interest: Vec<ComponentId> = components
            .iter()
            .map(|component| self.interner.intern_component(component))
            .collect();
        self.searches.insert(name, &interest)?;
        self.populate(name, &interest);

        for (&component, component_name) in interest.iter().zip(components) {
            if self.searches.ensure_single(component_name, component) {
                self.populate(component_name, &[component]);
            }
        }

        tracing::debug!(
            search = name,
            ?components,
            matched = self.searches.find(name).len(),
            "search registered"
        );
        Ok(())
    }

    /// Returns the entities matching a search, in the order they most
    /// recently qualified. Unknown searches match nothing.
    #[must_use]
    pub fn find(&self, name: &str) -> &[EntityId] {
        self.searches.find(name)
    }

    /// Returns the component names of a registered search.
    #[must_use]
    pub fn search_components(&self, name: &str) -> Option<Vec<&str>> {
        self.searches.components(name).map(|components| {
            components
                .iter()
                .filter_map(|&component| self.interner.component_name(component))
                .collect()
        })
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Subscribes to additions of a component.
    pub fn on_add_component(
        &mut self,
        name: &str,
        listener: impl Fn(&mut EntityStore, EntityId, &str, &Value) + 'static,
    ) {
        self.subscribe(EventKind::Add, name, Rc::new(listener));
    }

    /// Subscribes to removals of a component.
    ///
    /// The listener runs while the value is still readable through the
    /// store (`get_component`, `has_component`), though the entity has
    /// already left the searches. A composite is reset and pooled only after
    /// every listener has returned. Removing the same component again from
    /// inside the listener does nothing.
    pub fn on_remove_component(
        &mut self,
        name: &str,
        listener: impl Fn(&mut EntityStore, EntityId, &str, &Value) + 'static,
    ) {
        self.subscribe(EventKind::Remove, name, Rc::new(listener));
    }

    /// Returns how many listeners are subscribed to an event on a component.
    #[must_use]
    pub fn listener_count(&self, kind: EventKind, name: &str) -> usize {
        self.interner
            .lookup_component(name)
            .map_or(0, |component| self.listeners.count(kind, component))
    }

    fn subscribe(&mut self, kind: EventKind, name: &str, listener: Listener) {
        let component = self.interner.intern_component(name);
        self.listeners.subscribe(kind, component, listener);
    }

    // =========================================================================
    // Save / Load
    // =========================================================================

    /// Captures every live entity in ascending id order.
    ///
    /// Composite values are deep copies, unaffected by later changes.
    #[must_use]
    pub fn save(&self) -> Vec<EntitySnapshot> {
        self.entities
            .iter_components()
            .map(|(id, components)| EntitySnapshot {
                id,
                components: components
                    .iter()
                    .filter_map(|(&component, value)| {
                        self.interner
                            .component_name_shared(component)
                            .map(|name| (name.clone(), value.detached()))
                    })
                    .collect(),
            })
            .collect()
    }

    /// Installs entities from snapshots, keeping their ids.
    ///
    /// Primitive values are set directly. Composite values are added from
    /// their pools and populated by copying each field of the snapshot
    /// value. Search results are updated as each component lands; events are
    /// held back and delivered in order after the last snapshot.
    ///
    /// The batch is checked before anything changes, so a failed load leaves
    /// the store untouched.
    ///
    /// # Errors
    ///
    /// - `DuplicateEntity` if a snapshot id is live or repeats within the batch.
    /// - `UnregisteredComponent` if a composite value names an unregistered
    ///   component.
    pub fn load(&mut self, snapshots: &[EntitySnapshot]) -> Result<()> {
        self.check_load(snapshots)?;
        tracing::debug!(entities = snapshots.len(), "load started");

        let mut batch = EventBatch::new();
        for snapshot in snapshots {
            let id = snapshot.id;
            self.entities.spawn_with_id(id)?;

            for (name, value) in &snapshot.components {
                let component = self.interner.intern_component(name);
                match value {
                    Value::Composite(source) => {
                        let target = self.add_composite(id, component, Some(&mut batch))?;
                        if !CompositeRef::ptr_eq(&target, source) {
                            target.borrow_mut().copy_fields_from(&source.borrow());
                        }
                    }
                    primitive => {
                        self.set_primitive(id, component, primitive.clone(), Some(&mut batch))?;
                    }
                }
            }
        }

        let deferred = batch.len();
        for event in batch {
            // An earlier listener may have removed or replaced the value
            if event.kind == EventKind::Add && !self.still_holds(&event) {
                tracing::trace!(entity = %event.entity, component = %event.name, "stale add event skipped");
                continue;
            }
            self.dispatch(&event);
        }

        tracing::debug!(entities = snapshots.len(), events = deferred, "load finished");
        Ok(())
    }

    fn still_holds(&self, event: &ComponentEvent) -> bool {
        self.entities
            .components(event.entity)
            .and_then(|components| components.get(&event.component))
            .is_some_and(|value| value.is_identical(&event.value))
    }

    fn check_load(&self, snapshots: &[EntitySnapshot]) -> Result<()> {
        let mut seen = HashSet::with_capacity(snapshots.len());
        for snapshot in snapshots {
            if self.entities.exists(snapshot.id) || !seen.insert(snapshot.id) {
                return Err(Error::new(ErrorKind::DuplicateEntity(snapshot.id)));
            }
            for (name, value) in &snapshot.components {
                if value.is_composite() && !self.is_registered(name) {
                    return Err(Error::unregistered_component(name.as_ref()));
                }
            }
        }
        Ok(())
    }

    // =========================================================================
    // Symbols & Introspection
    // =========================================================================

    /// Interns a symbol atom for use as a primitive value.
    pub fn intern_symbol(&mut self, name: &str) -> SymbolId {
        self.interner.intern_symbol(name)
    }

    /// Gets the name of a symbol.
    #[must_use]
    pub fn symbol_name(&self, symbol: SymbolId) -> Option<&str> {
        self.interner.symbol_name(symbol)
    }

    /// Returns the store's interner.
    #[must_use]
    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// Returns capacity and free count of a component's pool.
    #[must_use]
    pub fn pool_stats(&self, name: &str) -> Option<PoolStats> {
        let component = self.interner.lookup_component(name)?;
        self.components.stats(component)
    }

    /// Returns capacity and free count of the entity record pool.
    #[must_use]
    pub fn entity_pool_stats(&self) -> PoolStats {
        PoolStats::from(self.entities.pool())
    }

    // =========================================================================
    // Internal Mutation
    // =========================================================================
    //
    // `batch` is `Some` while a load is collecting events.

    fn set_primitive(
        &mut self,
        id: EntityId,
        component: ComponentId,
        value: Value,
        batch: Option<&mut EventBatch>,
    ) -> Result<()> {
        let components = self
            .entities
            .components(id)
            .ok_or_else(|| Error::entity_not_found(id))?;

        if components.get(&component).is_some_and(Value::is_composite) {
            return Err(Error::new(ErrorKind::CompositeInPlace {
                entity: id,
                component: self.name_of(component).to_string(),
            }));
        }

        if value.is_unset() {
            self.remove_key(id, component, batch)
        } else {
            self.assign(id, component, value, batch)
        }
    }

    fn add_composite(
        &mut self,
        id: EntityId,
        component: ComponentId,
        batch: Option<&mut EventBatch>,
    ) -> Result<CompositeRef> {
        let components = self
            .entities
            .components(id)
            .ok_or_else(|| Error::entity_not_found(id))?;

        if let Some(Value::Composite(existing)) = components.get(&component) {
            let existing = existing.clone();
            self.components.reset(component, &existing);
            return Ok(existing);
        }

        let handle = self
            .components
            .acquire(component)
            .ok_or_else(|| Error::unregistered_component(self.name_of(component)))?;
        self.assign(id, component, Value::Composite(handle.clone()), batch)?;
        Ok(handle)
    }

    /// Stores a value. On the component's first appearance on the entity,
    /// updates the interested searches and emits an add event.
    fn assign(
        &mut self,
        id: EntityId,
        component: ComponentId,
        value: Value,
        batch: Option<&mut EventBatch>,
    ) -> Result<()> {
        let components = self
            .entities
            .components_mut(id)
            .ok_or_else(|| Error::entity_not_found(id))?;

        let first = match components.get(&component) {
            Some(existing) if existing.is_identical(&value) => return Ok(()),
            Some(_) => false,
            None => true,
        };
        components.insert(component, value.clone());
        if !first {
            return Ok(());
        }

        let name = self.shared_name_of(component);
        if self.searches.ensure_single(&name, component) {
            tracing::trace!(search = %name, "implicit search created");
        }
        if let Some(components) = self.entities.components(id) {
            self.searches
                .entity_gained(id, component, |c| components.contains_key(&c));
        }

        self.emit(
            ComponentEvent {
                kind: EventKind::Add,
                entity: id,
                component,
                name,
                value,
            },
            batch,
        );
        Ok(())
    }

    /// Removes a component: out of the searches, remove event while the old
    /// value is still in the map, reset and back to the pool, and finally out
    /// of the map.
    fn remove_key(
        &mut self,
        id: EntityId,
        component: ComponentId,
        batch: Option<&mut EventBatch>,
    ) -> Result<()> {
        let components = self
            .entities
            .components(id)
            .ok_or_else(|| Error::entity_not_found(id))?;

        let Some(old) = components.get(&component).cloned() else {
            return Ok(());
        };
        if self.removing.contains(&(id, component)) {
            return Ok(());
        }

        self.removing.push((id, component));
        self.searches.entity_lost(id, component);

        let name = self.shared_name_of(component);
        self.emit(
            ComponentEvent {
                kind: EventKind::Remove,
                entity: id,
                component,
                name,
                value: old.clone(),
            },
            batch,
        );
        self.removing.retain(|&pending| pending != (id, component));

        if let Value::Composite(handle) = &old {
            self.components.release(component, handle.clone());
        }
        let current = self
            .entities
            .components_mut(id)
            .and_then(|components| components.shift_remove(&component));
        // A listener may have swapped a primitive for a pooled composite
        if let Some(Value::Composite(handle)) = current {
            if !old.is_composite() {
                self.components.release(component, handle);
            }
        }

        let settled = !self.removing.iter().any(|&(entity, _)| entity == id);
        if settled && self.pending_destroy.remove(&id) {
            self.destroy(id)?;
        }
        Ok(())
    }

    fn emit(&mut self, event: ComponentEvent, batch: Option<&mut EventBatch>) {
        match batch {
            Some(batch) => batch.push(event),
            None => self.dispatch(&event),
        }
    }

    fn dispatch(&mut self, event: &ComponentEvent) {
        let Some(listeners) = self.listeners.for_event(event.kind, event.component) else {
            return;
        };
        for listener in listeners {
            listener(&mut *self, event.entity, &event.name, &event.value);
        }
    }

    fn populate(&mut self, name: &str, interest: &[ComponentId]) {
        let results = self
            .entities
            .iter_components()
            .filter(|(_, components)| interest.iter().all(|c| components.contains_key(c)))
            .map(|(id, _)| id)
            .collect();
        self.searches.set_results(name, results);
    }

    fn name_of(&self, component: ComponentId) -> &str {
        self.interner.component_name(component).unwrap_or_default()
    }

    fn shared_name_of(&self, component: ComponentId) -> Arc<str> {
        self.interner
            .component_name_shared(component)
            .cloned()
            .unwrap_or_else(|| Arc::from(""))
    }
}

impl fmt::Debug for EntityStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityStore")
            .field("config", &self.config)
            .field("entities", &self.entities.len())
            .field("components", &self.components.len())
            .field("searches", &self.searches.len())
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}
