//! Pack and emoji rows

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Row of the `emoji_packs` table
#[derive(Debug, Clone, FromRow)]
pub struct PackModel {
    pub pack_id: i64,
    pub short_name: String,
    pub title: String,
    pub discovered_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row of the `emojis` table
#[derive(Debug, Clone, FromRow)]
pub struct EmojiModel {
    pub emoji_id: i64,
    pub pack_id: i64,
    pub description: String,
    pub file_path: String,
    pub discovered_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row count totals of the catalog
#[derive(Debug, Clone, Copy, FromRow)]
pub struct CatalogCountsModel {
    pub packs: i64,
    pub emojis: i64,
}
