//! Core values, entity identifiers, errors, and reuse pools for Menagerie.
//!
//! This crate provides:
//! - [`Value`] - Primitive-or-composite component values
//! - [`Composite`] / [`CompositeRef`] - Mutable structured values behind shared handles
//! - [`EntityId`] - Entity identifiers
//! - [`Interner`] - Interned component names and symbol atoms
//! - [`Pool`] - Free-list object recycler with doubling growth
//! - [`Error`] - Error types for store configuration and misuse

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod entity;
pub mod error;
pub mod intern;
pub mod pool;
pub mod value;

pub use entity::EntityId;
pub use error::{Error, ErrorKind, Result};
pub use intern::{ComponentId, Interner, SymbolId};
pub use pool::Pool;
pub use value::{Composite, CompositeRef, Value};
