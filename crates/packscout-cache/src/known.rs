//! Process-wide set of every emoji id ever seen.

use packscout_core::{EmojiId, KeyValueStore, RepoResult};
use std::sync::Arc;

/// Key of the known emoji set
const KNOWN_EMOJI_KEY: &str = "global:emoji_ids";

/// Append-only set of discovered emoji ids
#[derive(Clone)]
pub struct KnownEmojiStore {
    store: Arc<dyn KeyValueStore>,
}

impl KnownEmojiStore {
    /// Create a new known emoji store
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Add ids to the set. Safe to call concurrently from any number of
    /// messages; the set only ever grows.
    pub async fn add(&self, emoji_ids: &[EmojiId]) -> RepoResult<()> {
        if emoji_ids.is_empty() {
            return Ok(());
        }
        let members: Vec<String> = emoji_ids.iter().map(ToString::to_string).collect();
        self.store.set_add(KNOWN_EMOJI_KEY, &members).await
    }

    /// Number of distinct emoji seen so far
    pub async fn count(&self) -> RepoResult<u64> {
        self.store.set_len(KNOWN_EMOJI_KEY).await
    }
}
