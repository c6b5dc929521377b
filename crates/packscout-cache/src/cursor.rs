//! Per-source resume cursors.
//!
//! Stores the id of the last fully processed message of every source so a
//! restarted backfill continues where it stopped.

use packscout_core::{DomainError, KeyValueStore, MessageId, RepoResult};
use std::sync::Arc;

/// Key prefix for source cursors
const SOURCE_PREFIX: &str = "source:";
/// Key suffix for source cursors
const LAST_PROCESSED_SUFFIX: &str = ":last_processed_id";

/// Durable "last processed message id" per source
#[derive(Clone)]
pub struct CursorStore {
    store: Arc<dyn KeyValueStore>,
}

impl CursorStore {
    /// Create a new cursor store
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Generate the key for a source cursor
    fn cursor_key(source: &str) -> String {
        format!("{SOURCE_PREFIX}{source}{LAST_PROCESSED_SUFFIX}")
    }

    /// Last processed message id of a source, 0 if the source was never seen
    pub async fn get(&self, source: &str) -> RepoResult<MessageId> {
        let key = Self::cursor_key(source);
        match self.store.get(&key).await? {
            Some(raw) => MessageId::parse(&raw).map_err(|e| DomainError::CorruptCacheEntry {
                key,
                reason: e.to_string(),
            }),
            None => Ok(MessageId::default()),
        }
    }

    /// Record `id` as the last processed message of a source.
    ///
    /// Overwrites unconditionally. Callers advance once per message, in
    /// message order, after everything else for that message is done.
    pub async fn advance(&self, source: &str, id: MessageId) -> RepoResult<()> {
        self.store
            .set(&Self::cursor_key(source), &id.to_string())
            .await?;

        tracing::debug!(source = %source, message_id = %id, "Advanced source cursor");

        Ok(())
    }
}
