//! PostgreSQL implementation of CatalogSink

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::instrument;

use packscout_core::traits::{CatalogSink, RepoResult};
use packscout_core::{EmojiId, EmojiRecord, PackId, PackRecord};

use crate::models::{CatalogCountsModel, EmojiModel, PackModel};

use super::error::map_db_error;

/// Tables created on startup when missing
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS emoji_packs (
    pack_id       BIGINT PRIMARY KEY,
    short_name    TEXT NOT NULL,
    title         TEXT NOT NULL,
    discovered_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at    TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS emojis (
    emoji_id      BIGINT PRIMARY KEY,
    pack_id       BIGINT NOT NULL,
    description   TEXT NOT NULL,
    file_path     TEXT NOT NULL,
    discovered_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at    TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX IF NOT EXISTS emojis_pack_id_idx ON emojis (pack_id);
"#;

/// Row totals of the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogCounts {
    pub packs: i64,
    pub emojis: i64,
}

/// PostgreSQL catalog of discovered packs and emoji
#[derive(Clone)]
pub struct PgCatalogRepository {
    pool: PgPool,
}

impl PgCatalogRepository {
    /// Create a new PgCatalogRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the catalog tables if they do not exist yet
    #[instrument(skip(self))]
    pub async fn ensure_schema(&self) -> RepoResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        tracing::debug!("Catalog schema ready");
        Ok(())
    }

    /// Find a pack by id
    #[instrument(skip(self))]
    pub async fn find_pack(&self, pack_id: PackId) -> RepoResult<Option<PackRecord>> {
        let result = sqlx::query_as::<_, PackModel>(
            r#"
            SELECT pack_id, short_name, title, discovered_at, updated_at
            FROM emoji_packs
            WHERE pack_id = $1
            "#,
        )
        .bind(pack_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(PackRecord::from))
    }

    /// Find an emoji by id
    #[instrument(skip(self))]
    pub async fn find_emoji(&self, emoji_id: EmojiId) -> RepoResult<Option<EmojiRecord>> {
        let result = sqlx::query_as::<_, EmojiModel>(
            r#"
            SELECT emoji_id, pack_id, description, file_path, discovered_at, updated_at
            FROM emojis
            WHERE emoji_id = $1
            "#,
        )
        .bind(emoji_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(EmojiRecord::from))
    }

    /// Count packs and emoji in the catalog
    #[instrument(skip(self))]
    pub async fn counts(&self) -> RepoResult<CatalogCounts> {
        let row = sqlx::query_as::<_, CatalogCountsModel>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM emoji_packs) AS packs,
                (SELECT COUNT(*) FROM emojis) AS emojis
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(CatalogCounts {
            packs: row.packs,
            emojis: row.emojis,
        })
    }
}

#[async_trait]
impl CatalogSink for PgCatalogRepository {
    #[instrument(skip(self), fields(pack_id = %pack.pack_id))]
    async fn upsert_pack(&self, pack: &PackRecord) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO emoji_packs (pack_id, short_name, title, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (pack_id) DO UPDATE
            SET short_name = EXCLUDED.short_name,
                title = EXCLUDED.title,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(pack.pack_id.into_inner())
        .bind(&pack.short_name)
        .bind(&pack.title)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self), fields(emoji_id = %emoji.emoji_id))]
    async fn upsert_emoji(&self, emoji: &EmojiRecord) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO emojis (emoji_id, pack_id, description, file_path, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (emoji_id) DO UPDATE
            SET pack_id = EXCLUDED.pack_id,
                description = EXCLUDED.description,
                file_path = EXCLUDED.file_path,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(emoji.emoji_id.into_inner())
        .bind(emoji.pack_id.into_inner())
        .bind(&emoji.description)
        .bind(&emoji.file_path)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }
}
