//! Free-list object recycler.
//!
//! A [`Pool`] hands out objects built by a factory and takes them back for
//! reuse. When the free list runs dry the pool doubles its capacity in one
//! step, so allocation cost is amortized across exhaustion events.
//!
//! The pool does not track which objects are out. Releasing an object twice,
//! or releasing one the caller does not own, puts the same object in two
//! hands. Resetting object state is the caller's job.

use std::fmt;

use crate::error::{Error, Result};

/// A free-list backed object recycler with doubling growth.
pub struct Pool<T> {
    /// Builds fresh objects.
    factory: Box<dyn Fn() -> T>,
    /// Objects available for reuse.
    free: Vec<T>,
    /// Logical size: objects built so far, live or free.
    capacity: usize,
}

impl<T> Pool<T> {
    /// Creates a pool with one pre-built object.
    #[must_use]
    pub fn new(factory: impl Fn() -> T + 'static) -> Self {
        let first = factory();
        Self {
            factory: Box::new(factory),
            free: vec![first],
            capacity: 1,
        }
    }

    /// Creates a pool with `size` pre-built objects.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPoolSize` if `size` is zero.
    pub fn with_size(factory: impl Fn() -> T + 'static, size: usize) -> Result<Self> {
        if size == 0 {
            return Err(Error::invalid_pool_size(size));
        }

        let free = (0..size).map(|_| factory()).collect();
        Ok(Self {
            factory: Box::new(factory),
            free,
            capacity: size,
        })
    }

    /// Takes an object from the pool, growing it if the free list is empty.
    ///
    /// Growth builds the returned object plus `capacity - 1` spares, doubling
    /// the capacity.
    pub fn acquire(&mut self) -> T {
        if let Some(obj) = self.free.pop() {
            return obj;
        }

        let obj = (self.factory)();
        self.free.reserve(self.capacity - 1);
        for _ in 1..self.capacity {
            self.free.push((self.factory)());
        }
        self.capacity *= 2;
        tracing::trace!(capacity = self.capacity, "pool grown");

        obj
    }

    /// Returns an object to the free list.
    pub fn release(&mut self, obj: T) {
        self.free.push(obj);
    }

    /// Returns the logical capacity (objects built so far).
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of objects ready for reuse.
    #[must_use]
    pub fn available(&self) -> usize {
        self.free.len()
    }
}

impl<T> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("capacity", &self.capacity)
            .field("available", &self.free.len())
            .finish_non_exhaustive()
    }
}
