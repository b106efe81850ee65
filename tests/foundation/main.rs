//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: Value, Composite, EntityId, Error, and the object pool.

mod errors;
