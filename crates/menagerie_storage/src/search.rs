//! Live search result lists.
//!
//! A search is a named, fixed set of components. The index keeps, per search,
//! the ids of entities holding every component in the set, and a reverse map
//! from component to the searches that mention it. Maintenance on add and
//! remove touches only the searches interested in the changed component.

use std::collections::HashMap;
use std::sync::Arc;

use menagerie_foundation::{ComponentId, EntityId, Error, ErrorKind, Result};

#[derive(Debug)]
struct Search {
    /// Interest set, deduplicated, in registration order.
    components: Vec<ComponentId>,
    /// Matching entities in the order they most recently qualified.
    results: Vec<EntityId>,
}

/// Search result lists and the component-to-search index.
#[derive(Debug, Default)]
pub struct SearchIndex {
    searches: HashMap<Arc<str>, Search>,
    by_component: HashMap<ComponentId, Vec<Arc<str>>>,
}

impl SearchIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if a search with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.searches.contains_key(name)
    }

    /// Registers a search with an empty result list.
    ///
    /// Duplicate components are dropped. Results are filled by the caller
    /// through [`SearchIndex::set_results`].
    ///
    /// # Errors
    ///
    /// Returns `SearchAlreadyRegistered` if the name exists, or `EmptySearch`
    /// if `components` is empty.
    pub fn insert(&mut self, name: &str, components: &[ComponentId]) -> Result<()> {
        if self.contains(name) {
            return Err(Error::search_already_registered(name));
        }
        if components.is_empty() {
            return Err(Error::new(ErrorKind::EmptySearch(name.to_string())));
        }

        let mut interest = Vec::with_capacity(components.len());
        for &component in components {
            if !interest.contains(&component) {
                interest.push(component);
            }
        }

        let name: Arc<str> = name.into();
        for &component in &interest {
            self.by_component
                .entry(component)
                .or_default()
                .push(name.clone());
        }
        self.searches.insert(
            name,
            Search {
                components: interest,
                results: Vec::new(),
            },
        );
        Ok(())
    }

    /// Registers the single-component search named after `component` if no
    /// search has that name. Returns true if one was created.
    pub fn ensure_single(&mut self, name: &str, component: ComponentId) -> bool {
        if self.contains(name) {
            return false;
        }
        self.insert(name, &[component]).is_ok()
    }

    /// Replaces the result list of a registered search.
    pub fn set_results(&mut self, name: &str, results: Vec<EntityId>) {
        if let Some(search) = self.searches.get_mut(name) {
            search.results = results;
        }
    }

    /// Returns the current results of a search, or an empty slice if the
    /// search is unknown.
    #[must_use]
    pub fn find(&self, name: &str) -> &[EntityId] {
        self.searches
            .get(name)
            .map(|search| search.results.as_slice())
            .unwrap_or(&[])
    }

    /// Returns the interest set of a search.
    #[must_use]
    pub fn components(&self, name: &str) -> Option<&[ComponentId]> {
        self.searches
            .get(name)
            .map(|search| search.components.as_slice())
    }

    /// Records that `entity` gained `component`.
    ///
    /// `has` answers whether the entity now holds a given component. The
    /// entity is appended to every interested search it now satisfies.
    pub fn entity_gained(
        &mut self,
        entity: EntityId,
        component: ComponentId,
        has: impl Fn(ComponentId) -> bool,
    ) {
        let Some(names) = self.by_component.get(&component) else {
            return;
        };
        for name in names {
            if let Some(search) = self.searches.get_mut(name) {
                if search.components.iter().all(|&c| has(c)) {
                    search.results.push(entity);
                }
            }
        }
    }

    /// Records that `entity` lost `component`, dropping it from every
    /// interested search.
    pub fn entity_lost(&mut self, entity: EntityId, component: ComponentId) {
        let Some(names) = self.by_component.get(&component) else {
            return;
        };
        for name in names {
            if let Some(search) = self.searches.get_mut(name) {
                if let Some(pos) = search.results.iter().position(|&e| e == entity) {
                    search.results.remove(pos);
                }
            }
        }
    }

    /// Returns the number of registered searches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.searches.len()
    }

    /// Returns true if no searches are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.searches.is_empty()
    }
}
