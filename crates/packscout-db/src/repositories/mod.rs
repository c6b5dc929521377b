//! Repository implementations
//!
//! PostgreSQL implementation of the catalog sink defined in packscout-core.

mod catalog;
mod error;

pub use catalog::{CatalogCounts, PgCatalogRepository};
