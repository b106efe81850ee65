//! Cross-layer integration tests for Menagerie
//!
//! Tests that verify correct interaction between multiple crates.
