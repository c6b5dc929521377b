//! Ingest context - dependency container for the pipeline
//!
//! Holds the transport, the key-value store, the sink and the caches built
//! on top of them. Every component receives its collaborators from here.

use std::sync::Arc;

use packscout_bridge::BridgeClient;
use packscout_cache::{CursorStore, KnownEmojiStore, PackCache, RedisPool};
use packscout_common::{AppConfig, IngestConfig};
use packscout_core::{CatalogSink, ChatTransport, KeyValueStore, MessageStream};
use packscout_db::{create_pool, DatabaseConfig, PgCatalogRepository};

use crate::error::{IngestError, IngestResult};
use crate::halt::HaltedSources;
use crate::pipeline::IngestionPipeline;
use crate::resolver::PackResolver;
use crate::stream;

/// Ingest context containing all dependencies
#[derive(Clone)]
pub struct IngestContext {
    config: IngestConfig,

    // Collaborators
    transport: Arc<dyn ChatTransport>,
    store: Arc<dyn KeyValueStore>,
    sink: Arc<dyn CatalogSink>,

    // Cache stores
    cursors: CursorStore,
    pack_cache: PackCache,
    known: KnownEmojiStore,
}

impl IngestContext {
    /// Create a context over the given collaborators
    pub fn new(
        config: IngestConfig,
        transport: Arc<dyn ChatTransport>,
        store: Arc<dyn KeyValueStore>,
        sink: Arc<dyn CatalogSink>,
    ) -> Self {
        let cursors = CursorStore::new(store.clone());
        let pack_cache = PackCache::new(store.clone());
        let known = KnownEmojiStore::new(store.clone());

        Self {
            config,
            transport,
            store,
            sink,
            cursors,
            pack_cache,
            known,
        }
    }

    /// Connect Redis, PostgreSQL and the transport bridge.
    ///
    /// Fails when the cache does not answer a ping or the catalog schema
    /// cannot be created.
    pub async fn connect(config: &AppConfig) -> IngestResult<Self> {
        let redis = RedisPool::from_config(&config.redis)
            .map_err(|e| IngestError::startup(format!("Redis pool: {e}")))?;
        redis
            .health_check()
            .await
            .map_err(|e| IngestError::startup(format!("Redis unreachable: {e}")))?;
        tracing::info!("Redis connection established");

        let pool = create_pool(&DatabaseConfig::from(&config.database))
            .await
            .map_err(|e| IngestError::startup(format!("PostgreSQL: {e}")))?;
        let catalog = PgCatalogRepository::new(pool);
        catalog.ensure_schema().await?;
        tracing::info!("Database connection established");

        let bridge = BridgeClient::new(&config.bridge)
            .map_err(|e| IngestError::startup(format!("Transport bridge: {e}")))?;

        Ok(Self::new(
            config.ingest.clone(),
            Arc::new(bridge),
            Arc::new(redis),
            Arc::new(catalog),
        ))
    }

    // === Configuration ===

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    // === Collaborators ===

    pub fn transport(&self) -> &Arc<dyn ChatTransport> {
        &self.transport
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    // === Cache Stores ===

    pub fn cursors(&self) -> &CursorStore {
        &self.cursors
    }

    pub fn pack_cache(&self) -> &PackCache {
        &self.pack_cache
    }

    pub fn known(&self) -> &KnownEmojiStore {
        &self.known
    }

    // === Components ===

    /// A resolver bounded by the configured concurrency
    pub fn resolver(&self) -> PackResolver {
        PackResolver::new(
            self.transport.clone(),
            self.pack_cache.clone(),
            self.config.resolve_concurrency,
        )
    }

    /// A fresh pipeline
    pub fn pipeline(&self) -> IngestionPipeline {
        IngestionPipeline::new(
            self.resolver(),
            self.cursors.clone(),
            self.known.clone(),
            self.sink.clone(),
            self.config.mode,
        )
    }

    /// Merged messages of every configured source, in the configured mode.
    ///
    /// Pass the halted set of the pipeline that consumes the stream.
    pub fn message_stream(&self, halted: &HaltedSources) -> MessageStream {
        stream::message_stream(
            self.config.mode,
            &self.transport,
            &self.cursors,
            halted,
            &self.config.sources,
            self.config.cooldown(),
        )
    }
}
