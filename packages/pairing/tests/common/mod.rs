//! Shared helpers for pairing integration tests.

pub mod fixtures;

pub use fixtures::*;
