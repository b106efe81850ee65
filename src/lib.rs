//! Menagerie - In-memory entity-component store with live searches
//!
//! This crate re-exports all layers of the Menagerie system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: menagerie_systems    — Ordered system runner with timings
//! Layer 1: menagerie_storage    — Entity store, component pools, searches, events, snapshots
//! Layer 0: menagerie_foundation — Core types (Value, EntityId, Error), Pool, Interner
//! ```

pub use menagerie_foundation as foundation;
pub use menagerie_storage as storage;
pub use menagerie_systems as systems;
