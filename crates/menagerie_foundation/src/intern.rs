//! String interning for component names and symbol atoms.
//!
//! Component names are interned so per-entity maps and search tables key on
//! small integers. Symbols are opaque atoms that can be stored as primitive
//! component values.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Interned component name.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ComponentId(pub(crate) u32);

impl ComponentId {
    /// Returns the raw index of this component name.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentId({})", self.0)
    }
}

/// Interned symbol atom.
///
/// Symbols compare by identity of their interned name and are treated as
/// primitive values by the store.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SymbolId(pub(crate) u32);

impl SymbolId {
    /// Returns the raw index of this symbol.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolId({})", self.0)
    }
}

/// Interner for component names and symbols.
///
/// Component names and symbols live in separate id spaces over one shared
/// string table. It is not thread-safe.
#[derive(Clone, Debug, Default)]
pub struct Interner {
    /// String storage (shared across components and symbols).
    strings: Vec<Arc<str>>,
    /// Map from string to index.
    string_to_index: HashMap<Arc<str>, u32>,
    /// Component indices into `strings`.
    components: Vec<u32>,
    /// Map from component name to `ComponentId`.
    component_map: HashMap<Arc<str>, ComponentId>,
    /// Symbol indices into `strings`.
    symbols: Vec<u32>,
    /// Map from symbol name to `SymbolId`.
    symbol_map: HashMap<Arc<str>, SymbolId>,
}

impl Interner {
    /// Creates a new empty interner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a string, returning its index.
    fn intern_string(&mut self, s: &str) -> u32 {
        if let Some(&idx) = self.string_to_index.get(s) {
            return idx;
        }

        let idx = u32::try_from(self.strings.len()).expect("too many interned strings");
        let arc: Arc<str> = s.into();
        self.strings.push(arc.clone());
        self.string_to_index.insert(arc, idx);
        idx
    }

    fn shared(&self, idx: u32) -> Option<&Arc<str>> {
        self.strings.get(idx as usize)
    }

    /// Interns a component name, returning its [`ComponentId`].
    ///
    /// # Panics
    ///
    /// Panics if the number of interned component names exceeds `u32::MAX`.
    pub fn intern_component(&mut self, name: &str) -> ComponentId {
        if let Some(&id) = self.component_map.get(name) {
            return id;
        }

        let string_idx = self.intern_string(name);
        let component_idx =
            u32::try_from(self.components.len()).expect("too many component names");
        self.components.push(string_idx);

        let id = ComponentId(component_idx);
        self.component_map.insert(self.strings[string_idx as usize].clone(), id);
        id
    }

    /// Looks up a component name without interning it.
    #[must_use]
    pub fn lookup_component(&self, name: &str) -> Option<ComponentId> {
        self.component_map.get(name).copied()
    }

    /// Gets the name of a component.
    #[must_use]
    pub fn component_name(&self, id: ComponentId) -> Option<&str> {
        self.component_name_shared(id).map(AsRef::as_ref)
    }

    /// Gets the name of a component as a shared string.
    #[must_use]
    pub fn component_name_shared(&self, id: ComponentId) -> Option<&Arc<str>> {
        self.components
            .get(id.0 as usize)
            .and_then(|&idx| self.shared(idx))
    }

    /// Interns a symbol, returning its [`SymbolId`].
    ///
    /// # Panics
    ///
    /// Panics if the number of interned symbols exceeds `u32::MAX`.
    pub fn intern_symbol(&mut self, name: &str) -> SymbolId {
        if let Some(&id) = self.symbol_map.get(name) {
            return id;
        }

        let string_idx = self.intern_string(name);
        let symbol_idx = u32::try_from(self.symbols.len()).expect("too many symbols");
        self.symbols.push(string_idx);

        let id = SymbolId(symbol_idx);
        self.symbol_map.insert(self.strings[string_idx as usize].clone(), id);
        id
    }

    /// Gets the name of a symbol.
    #[must_use]
    pub fn symbol_name(&self, id: SymbolId) -> Option<&str> {
        self.symbols
            .get(id.0 as usize)
            .and_then(|&idx| self.shared(idx))
            .map(AsRef::as_ref)
    }

    /// Returns the number of interned component names.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Returns the number of interned symbols.
    #[must_use]
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }
}
