//! Test environment wiring

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use packscout_cache::MemoryStore;
use packscout_common::{IngestConfig, IngestMode};
use packscout_core::{MessageId, PackId};
use packscout_ingest::testing::{RecordingSink, ScriptedTransport};
use packscout_ingest::{ingest, IngestContext, IngestStats};

/// An ingestion context over in-memory collaborators
pub struct TestEnv {
    pub memory: Arc<MemoryStore>,
    pub transport: Arc<ScriptedTransport>,
    pub sink: Arc<RecordingSink>,
    pub context: IngestContext,
}

impl TestEnv {
    /// Scrape the given sources with no cooldown
    pub fn scrape(transport: ScriptedTransport, sources: &[&str]) -> Self {
        Self::build(
            transport,
            Arc::new(MemoryStore::new()),
            config(IngestMode::Scrape, sources, Duration::ZERO),
        )
    }

    /// Build an environment from explicit parts
    pub fn build(
        transport: ScriptedTransport,
        memory: Arc<MemoryStore>,
        config: IngestConfig,
    ) -> Self {
        let transport = Arc::new(transport);
        let sink = Arc::new(RecordingSink::new());
        let context = IngestContext::new(config, transport.clone(), memory.clone(), sink.clone());

        Self {
            memory,
            transport,
            sink,
            context,
        }
    }

    /// Run one ingestion pass
    pub async fn run(&self) -> anyhow::Result<IngestStats> {
        Ok(ingest(&self.context).await?)
    }

    /// Stored cursor of a source
    pub async fn cursor(&self, source: &str) -> anyhow::Result<MessageId> {
        Ok(self.context.cursors().get(source).await?)
    }

    /// Every id in the known emoji set
    pub fn known_ids(&self) -> BTreeSet<String> {
        self.memory.members("global:emoji_ids")
    }

    /// Pack ids written to the sink, in order
    pub fn upserted_packs(&self) -> Vec<PackId> {
        self.sink.packs().iter().map(|p| p.pack_id).collect()
    }
}

/// Ingestion settings for tests
pub fn config(mode: IngestMode, sources: &[&str], cooldown: Duration) -> IngestConfig {
    IngestConfig {
        mode,
        sources: sources.iter().map(ToString::to_string).collect(),
        cooldown_ms: cooldown.as_millis() as u64,
        resolve_concurrency: 4,
    }
}
