//! # packscout-db
//!
//! PostgreSQL catalog of discovered emoji packs and emoji, implementing the
//! `CatalogSink` port of `packscout-core` with SQLx.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use packscout_db::{create_pool, DatabaseConfig, PgCatalogRepository};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&DatabaseConfig::default()).await?;
//!     let catalog = PgCatalogRepository::new(pool);
//!     catalog.ensure_schema().await?;
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, DatabaseConfig, PgPool};
pub use repositories::{CatalogCounts, PgCatalogRepository};
