//! Entity lifecycle management over a pool of recycled records.
//!
//! The `EntityTable` hands out entity records from a [`Pool`] and tracks which
//! ids are live. A record is given an id the first time it leaves the pool and
//! keeps it across recycling, so destroyed ids come back through `spawn`.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use menagerie_foundation::{ComponentId, EntityId, Error, ErrorKind, Pool, Result, Value};

/// Component values of one entity, in insertion order.
pub(crate) type ComponentMap = IndexMap<ComponentId, Value>;

/// A pooled entity record.
#[derive(Debug, Default)]
pub(crate) struct EntityRecord {
    /// Assigned on first use; kept when the record is recycled.
    id: Option<EntityId>,
    components: ComponentMap,
}

/// Manages entity id allocation and the live entity set.
#[derive(Debug)]
pub struct EntityTable {
    /// Live entities, ordered by id.
    live: BTreeMap<EntityId, EntityRecord>,
    /// Recycled records.
    pool: Pool<EntityRecord>,
    /// Next id to hand to a record that has none.
    next_id: EntityId,
}

impl Default for EntityTable {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityTable {
    /// Creates an empty table with a single-record pool.
    #[must_use]
    pub fn new() -> Self {
        Self {
            live: BTreeMap::new(),
            pool: Pool::new(EntityRecord::default),
            next_id: EntityId(0),
        }
    }

    /// Creates an empty table with `size` pre-built records.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPoolSize` if `size` is zero.
    pub fn with_pool_size(size: usize) -> Result<Self> {
        Ok(Self {
            live: BTreeMap::new(),
            pool: Pool::with_size(EntityRecord::default, size)?,
            next_id: EntityId(0),
        })
    }

    /// Spawns a new entity, returns its ID.
    ///
    /// A recycled record keeps its previous id unless that id has since been
    /// taken by a loaded entity, in which case it gets a fresh one.
    pub fn spawn(&mut self) -> EntityId {
        let mut record = self.pool.acquire();

        let id = match record.id {
            Some(id) if !self.live.contains_key(&id) => id,
            _ => {
                let id = self.next_id;
                self.next_id = id.next();
                record.id = Some(id);
                id
            }
        };

        self.live.insert(id, record);
        id
    }

    /// Spawns an entity with an explicit id.
    ///
    /// The next automatically assigned id is moved past `id`.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateEntity` if `id` is live.
    pub fn spawn_with_id(&mut self, id: EntityId) -> Result<()> {
        if self.live.contains_key(&id) {
            return Err(Error::new(ErrorKind::DuplicateEntity(id)));
        }

        let mut record = self.pool.acquire();
        record.id = Some(id);
        if self.next_id <= id {
            self.next_id = id.next();
        }

        self.live.insert(id, record);
        Ok(())
    }

    /// Destroys an entity and recycles its record.
    ///
    /// Components still on the record are dropped without notification; the
    /// store removes them first.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` if the entity is not live.
    pub fn despawn(&mut self, id: EntityId) -> Result<()> {
        let mut record = self
            .live
            .remove(&id)
            .ok_or_else(|| Error::entity_not_found(id))?;

        debug_assert!(
            record.components.is_empty(),
            "{id} despawned with components still attached"
        );
        record.components.clear();
        self.pool.release(record);

        Ok(())
    }

    /// Checks if an entity is live.
    #[must_use]
    pub fn exists(&self, id: EntityId) -> bool {
        self.live.contains_key(&id)
    }

    /// Validates that an entity is live.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` if the entity is not live.
    pub fn validate(&self, id: EntityId) -> Result<()> {
        if self.exists(id) {
            Ok(())
        } else {
            Err(Error::entity_not_found(id))
        }
    }

    /// Returns the total number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Returns true if there are no live entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Iterates over live entity ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.live.keys().copied()
    }

    /// Returns the id the next fresh record will receive.
    #[must_use]
    pub fn next_id(&self) -> EntityId {
        self.next_id
    }

    /// Returns the record pool.
    #[must_use]
    pub(crate) fn pool(&self) -> &Pool<EntityRecord> {
        &self.pool
    }

    pub(crate) fn components(&self, id: EntityId) -> Option<&ComponentMap> {
        self.live.get(&id).map(|record| &record.components)
    }

    pub(crate) fn components_mut(&mut self, id: EntityId) -> Option<&mut ComponentMap> {
        self.live.get_mut(&id).map(|record| &mut record.components)
    }

    pub(crate) fn iter_components(&self) -> impl Iterator<Item = (EntityId, &ComponentMap)> + '_ {
        self.live.iter().map(|(id, record)| (*id, &record.components))
    }
}
