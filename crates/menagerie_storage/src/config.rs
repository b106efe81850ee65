//! Configuration for the entity store.

/// Pool sizing for an [`EntityStore`](crate::EntityStore).
///
/// Sizes are the number of objects built up front; pools double when they
/// run dry, so these only move the first growth step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    /// Initial size of the entity record pool.
    pub entity_pool_size: usize,

    /// Initial pool size for components registered without an explicit size.
    pub default_component_pool_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            entity_pool_size: 1,
            default_component_pool_size: 1,
        }
    }
}

impl StoreConfig {
    /// Creates a configuration with default sizes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the entity pool size.
    #[must_use]
    pub fn with_entity_pool_size(mut self, size: usize) -> Self {
        self.entity_pool_size = size;
        self
    }

    /// Builder method to set the default component pool size.
    #[must_use]
    pub fn with_default_component_pool_size(mut self, size: usize) -> Self {
        self.default_component_pool_size = size;
        self
    }
}
