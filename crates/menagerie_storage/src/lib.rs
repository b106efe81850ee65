//! Entity store, component pools, live searches, and snapshots for Menagerie.
//!
//! This crate provides:
//! - [`EntityStore`] - The store: entities, components, searches, events, save/load
//! - [`EntityTable`] - Entity id allocation over a pool of recycled records
//! - [`ComponentDef`] - Factory, reset, and pool size for a composite component
//! - [`SearchIndex`] - Live result lists for registered searches
//! - [`EntitySnapshot`] - The plain record produced by save and consumed by load
//! - [`StoreConfig`] - Pool sizing defaults

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod component;
pub mod config;
pub mod entity;
pub mod events;
pub mod search;
pub mod snapshot;
pub mod store;

pub use component::{ComponentDef, PoolStats};
pub use config::StoreConfig;
pub use entity::EntityTable;
pub use events::{ComponentEvent, EventBatch, EventKind, Listener};
pub use search::SearchIndex;
pub use snapshot::EntitySnapshot;
pub use store::EntityStore;
