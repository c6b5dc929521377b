//! Database models
//!
//! Rows as returned by queries. Conversion into domain records lives in
//! [`crate::mappers`].

mod catalog;

pub use catalog::{CatalogCountsModel, EmojiModel, PackModel};
