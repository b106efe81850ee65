//! Composite component registrations and their pools.
//!
//! Every composite component name is registered with a [`ComponentDef`]
//! before use. The registry owns one [`Pool`] of composite handles per
//! registered name and applies the optional reset function on reuse and
//! release.

use std::collections::HashMap;
use std::fmt;

use menagerie_foundation::{ComponentId, Composite, CompositeRef, Error, ErrorKind, Pool, Result};

type Factory = Box<dyn Fn() -> Composite>;
type Reset = Box<dyn Fn(&mut Composite)>;

/// Registration for a composite component.
///
/// # Example
///
/// ```
/// use menagerie_foundation::Composite;
/// use menagerie_storage::ComponentDef;
///
/// let def = ComponentDef::new(|| Composite::record().with("value", 0))
///     .with_reset(|hp| {
///         hp.set("value", 0);
///     })
///     .with_pool_size(32);
/// assert_eq!(def.pool_size(), Some(32));
/// ```
pub struct ComponentDef {
    factory: Factory,
    reset: Option<Reset>,
    pool_size: Option<usize>,
}

impl ComponentDef {
    /// Creates a registration from a factory.
    #[must_use]
    pub fn new(factory: impl Fn() -> Composite + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            reset: None,
            pool_size: None,
        }
    }

    /// Sets the function that restores a composite to a neutral state.
    ///
    /// It runs before a held composite is handed back by `add_component` and
    /// before a removed composite returns to the pool. Without one, reused
    /// composites keep their previous contents.
    #[must_use]
    pub fn with_reset(mut self, reset: impl Fn(&mut Composite) + 'static) -> Self {
        self.reset = Some(Box::new(reset));
        self
    }

    /// Sets the initial pool size.
    #[must_use]
    pub fn with_pool_size(mut self, size: usize) -> Self {
        self.pool_size = Some(size);
        self
    }

    /// Returns the explicit pool size, if any.
    #[must_use]
    pub fn pool_size(&self) -> Option<usize> {
        self.pool_size
    }

    /// Returns true if a reset function is set.
    #[must_use]
    pub fn has_reset(&self) -> bool {
        self.reset.is_some()
    }
}

impl fmt::Debug for ComponentDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDef")
            .field("reset", &self.reset.is_some())
            .field("pool_size", &self.pool_size)
            .finish_non_exhaustive()
    }
}

/// Capacity and free count of a pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolStats {
    /// Objects built so far.
    pub capacity: usize,
    /// Objects ready for reuse.
    pub available: usize,
}

impl<T> From<&Pool<T>> for PoolStats {
    fn from(pool: &Pool<T>) -> Self {
        Self {
            capacity: pool.capacity(),
            available: pool.available(),
        }
    }
}

struct ComponentSlot {
    pool: Pool<CompositeRef>,
    reset: Option<Reset>,
}

impl ComponentSlot {
    fn reset(&self, handle: &CompositeRef) {
        if let Some(reset) = &self.reset {
            reset(&mut handle.borrow_mut());
        }
    }
}

/// Pools and reset functions for registered composite components.
#[derive(Default)]
pub(crate) struct ComponentRegistry {
    slots: HashMap<ComponentId, ComponentSlot>,
}

impl ComponentRegistry {
    /// Registers a component with a pool of `pool_size` prebuilt instances.
    /// The size carried by `def`, if any, is resolved by the caller.
    ///
    /// # Errors
    ///
    /// Returns `ComponentAlreadyRegistered` for a second registration of the
    /// same component, or `InvalidPoolSize` for a zero pool size.
    pub(crate) fn register(
        &mut self,
        component: ComponentId,
        name: &str,
        def: ComponentDef,
        pool_size: usize,
    ) -> Result<()> {
        if self.slots.contains_key(&component) {
            return Err(Error::new(ErrorKind::ComponentAlreadyRegistered(
                name.to_string(),
            )));
        }

        let ComponentDef { factory, reset, .. } = def;
        let pool = Pool::with_size(move || CompositeRef::new(factory()), pool_size)?;

        self.slots.insert(component, ComponentSlot { pool, reset });
        Ok(())
    }

    pub(crate) fn is_registered(&self, component: ComponentId) -> bool {
        self.slots.contains_key(&component)
    }

    /// Takes a composite from the component's pool.
    pub(crate) fn acquire(&mut self, component: ComponentId) -> Option<CompositeRef> {
        self.slots.get_mut(&component).map(|slot| slot.pool.acquire())
    }

    /// Runs the component's reset function, if any.
    pub(crate) fn reset(&self, component: ComponentId, handle: &CompositeRef) {
        if let Some(slot) = self.slots.get(&component) {
            slot.reset(handle);
        }
    }

    /// Resets a composite and returns it to the component's pool.
    pub(crate) fn release(&mut self, component: ComponentId, handle: CompositeRef) {
        if let Some(slot) = self.slots.get_mut(&component) {
            slot.reset(&handle);
            slot.pool.release(handle);
        }
    }

    pub(crate) fn stats(&self, component: ComponentId) -> Option<PoolStats> {
        self.slots.get(&component).map(|slot| PoolStats::from(&slot.pool))
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.slots
                    .iter()
                    .map(|(id, slot)| (id, PoolStats::from(&slot.pool))),
            )
            .finish()
    }
}
