//! # packscout-ingest
//!
//! Ingestion engine: reads messages from chat sources, finds premium emoji
//! packs referenced in them, resolves packs through a cache-aside layer, and
//! hands new discoveries to the catalog.
//!
//! ## Modes
//!
//! - **scrape**: page through the history of every source from its cursor,
//!   with a cooldown between messages
//! - **listen**: follow the live feed of new messages

pub mod context;
pub mod error;
pub mod halt;
pub mod pipeline;
pub mod resolver;
pub mod scanner;
pub mod stream;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use context::IngestContext;
pub use error::{IngestError, IngestResult};
pub use halt::HaltedSources;
pub use pipeline::{IngestStats, IngestionPipeline, MessageOutcome};
pub use resolver::PackResolver;
pub use scanner::{extract_short_names, MessageScanner};
pub use stream::{merge, SourceStream};

use packscout_common::AppConfig;

/// Run ingestion over an assembled context.
///
/// Pings the cache first; the run cannot start without it. Returns once the
/// message stream ends, which only happens in scrape mode. In listen mode a
/// persistence failure ends the run with [`IngestError::SourceHalted`].
pub async fn ingest(context: &IngestContext) -> IngestResult<IngestStats> {
    context.store().ping().await.map_err(|e| {
        tracing::error!(error = %e, "Cache unavailable at startup");
        e
    })?;

    let config = context.config();
    tracing::info!(
        mode = %config.mode,
        sources = ?config.sources,
        cooldown_ms = config.cooldown_ms,
        resolve_concurrency = config.resolve_concurrency,
        "Starting ingestion"
    );

    let mut pipeline = context.pipeline();
    let messages = context.message_stream(&pipeline.halted_sources());
    pipeline.run(messages).await
}

/// Connect every collaborator from configuration and run ingestion
pub async fn run(config: AppConfig) -> IngestResult<IngestStats> {
    let context = IngestContext::connect(&config).await?;
    ingest(&context).await
}
