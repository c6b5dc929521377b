//! Integration test utilities for the ingestion engine
//!
//! Wires the real caches, resolver and pipeline over in-process
//! collaborators so end-to-end scenarios run without Redis, PostgreSQL or a
//! transport bridge.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
