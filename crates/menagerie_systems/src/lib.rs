//! System scheduling for Menagerie.
//!
//! A system is a named function run against the [`EntityStore`] once per
//! frame. The [`Scheduler`] runs them in registration order and keeps a
//! running wall-time total for each.
//!
//! [`EntityStore`]: menagerie_storage::EntityStore

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod scheduler;

pub use scheduler::{Scheduler, SystemTiming};
