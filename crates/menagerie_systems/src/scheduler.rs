//! Ordered system runner with per-system timing.

use std::fmt;
use std::time::{Duration, Instant};

use menagerie_foundation::EntityId;
use menagerie_storage::EntityStore;

type System<A> = Box<dyn FnMut(&mut EntityStore, &A)>;

/// Accumulated wall time of one system.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SystemTiming {
    /// System name
    pub name: String,
    /// Total time spent since creation or the last reset
    pub time: Duration,
}

struct Entry<A> {
    name: String,
    system: System<A>,
    time: Duration,
}

/// Runs systems in registration order.
///
/// `A` is the per-run argument handed to every system, typically the
/// elapsed frame time.
///
/// # Example
///
/// ```
/// use menagerie_storage::EntityStore;
/// use menagerie_systems::Scheduler;
///
/// let mut store = EntityStore::new();
/// let id = store.create();
/// store.set_component(id, "x", 0.0).unwrap();
/// store.set_component(id, "dx", 2.0).unwrap();
/// store.register_search("moving", &["x", "dx"]).unwrap();
///
/// let mut scheduler = Scheduler::new();
/// scheduler.add_each("movement", "moving", |store, id, elapsed: &f64| {
///     let x = store.get_component(id, "x").and_then(|v| v.as_number()).unwrap_or(0.0);
///     let dx = store.get_component(id, "dx").and_then(|v| v.as_number()).unwrap_or(0.0);
///     store.set_component(id, "x", x + dx * elapsed).unwrap();
/// });
///
/// scheduler.run(&mut store, &0.5);
/// assert_eq!(store.get_component(id, "x").and_then(|v| v.as_number()), Some(1.0));
/// assert_eq!(scheduler.runs(), 1);
/// ```
pub struct Scheduler<A> {
    entries: Vec<Entry<A>>,
    runs: u64,
}

impl<A> Default for Scheduler<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Scheduler<A> {
    /// Creates a scheduler with no systems.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            runs: 0,
        }
    }

    /// Adds a system that receives the whole store.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        system: impl FnMut(&mut EntityStore, &A) + 'static,
    ) {
        self.push(name.into(), Box::new(system));
    }

    /// Adds a system that is called once per entity matching `search`.
    ///
    /// The matching ids are copied before the first call, so the system may
    /// add, remove, or destroy freely. An id destroyed earlier in the same
    /// pass is still visited.
    pub fn add_each(
        &mut self,
        name: impl Into<String>,
        search: impl Into<String>,
        mut system: impl FnMut(&mut EntityStore, EntityId, &A) + 'static,
    ) {
        let search = search.into();
        self.push(
            name.into(),
            Box::new(move |store: &mut EntityStore, arg: &A| {
                let ids = store.find(&search).to_vec();
                for id in ids {
                    system(store, id, arg);
                }
            }),
        );
    }

    fn push(&mut self, name: String, system: System<A>) {
        tracing::debug!(system = %name, position = self.entries.len(), "system added");
        self.entries.push(Entry {
            name,
            system,
            time: Duration::ZERO,
        });
    }

    /// Runs every system once, in order.
    pub fn run(&mut self, store: &mut EntityStore, arg: &A) {
        for entry in &mut self.entries {
            let start = Instant::now();
            (entry.system)(store, arg);
            entry.time += start.elapsed();
        }
        self.runs += 1;
        tracing::trace!(runs = self.runs, "systems run");
    }

    /// Returns how many times [`Scheduler::run`] has completed.
    #[must_use]
    pub fn runs(&self) -> u64 {
        self.runs
    }

    /// Returns the accumulated time of each system, in order.
    #[must_use]
    pub fn timings(&self) -> Vec<SystemTiming> {
        self.entries
            .iter()
            .map(|entry| SystemTiming {
                name: entry.name.clone(),
                time: entry.time,
            })
            .collect()
    }

    /// Zeroes every system's accumulated time. The run count is kept.
    pub fn reset_timings(&mut self) {
        for entry in &mut self.entries {
            entry.time = Duration::ZERO;
        }
    }

    /// Returns the number of systems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no systems are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<A> fmt::Debug for Scheduler<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("systems", &self.timings())
            .field("runs", &self.runs)
            .finish()
    }
}
