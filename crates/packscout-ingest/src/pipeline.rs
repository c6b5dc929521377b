//! Per-message ingestion.
//!
//! For every message: scan it, expand linked packs into their members,
//! resolve the parent pack of every emoji, record all ids as known, upsert
//! the resolved packs and emoji, then advance the source cursor. The cursor
//! only moves once every upsert for the message succeeded.
//!
//! A failed upsert halts the source. In scrape mode its backfill stream stops
//! and the rest of its history is replayed from the cursor after a restart.
//! The live feed cannot replay, so in listen mode the run fails instead.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use futures::future::join_all;
use futures::StreamExt;
use packscout_cache::{CursorStore, KnownEmojiStore};
use packscout_common::IngestMode;
use packscout_core::{
    CatalogSink, DomainError, EmojiId, EmojiPack, EmojiReference, Message, MessageStream, PackId,
    RepoResult,
};
use tracing::instrument;

use crate::error::{IngestError, IngestResult};
use crate::halt::HaltedSources;
use crate::resolver::PackResolver;
use crate::scanner::MessageScanner;

/// Log a progress line every this many processed messages
const PROGRESS_INTERVAL: u64 = 100;

/// Counters of one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub messages_processed: u64,
    /// Messages of halted sources that were already in flight
    pub messages_skipped: u64,
    pub emoji_discovered: u64,
    /// Emoji whose parent pack could not be resolved
    pub emoji_unresolved: u64,
    pub packs_upserted: u64,
    pub emoji_upserted: u64,
    pub sources_halted: u64,
}

/// What happened to a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageOutcome {
    /// Fully handled and the cursor advanced
    Committed {
        emoji: usize,
        packs: usize,
        emoji_upserted: usize,
    },
    /// Persistence failed; the cursor was left alone and the source halted
    Halted,
    /// The source was already halted
    Skipped,
}

/// Drives messages through scanning, resolution and persistence
pub struct IngestionPipeline {
    resolver: PackResolver,
    cursors: CursorStore,
    known: KnownEmojiStore,
    sink: Arc<dyn CatalogSink>,
    mode: IngestMode,
    halted: HaltedSources,
    stats: IngestStats,
}

impl IngestionPipeline {
    pub fn new(
        resolver: PackResolver,
        cursors: CursorStore,
        known: KnownEmojiStore,
        sink: Arc<dyn CatalogSink>,
        mode: IngestMode,
    ) -> Self {
        Self {
            resolver,
            cursors,
            known,
            sink,
            mode,
            halted: HaltedSources::new(),
            stats: IngestStats::default(),
        }
    }

    pub fn stats(&self) -> IngestStats {
        self.stats
    }

    pub fn resolver(&self) -> &PackResolver {
        &self.resolver
    }

    /// Whether a source stopped because of a persistence failure
    pub fn is_halted(&self, source: &str) -> bool {
        self.halted.contains(source)
    }

    /// Handle on the halted set, for the streams feeding this pipeline
    pub fn halted_sources(&self) -> HaltedSources {
        self.halted.clone()
    }

    /// Consume a message stream until it ends.
    ///
    /// Cache failures stop the run, as does a persistence failure in listen
    /// mode; everything else is handled per message.
    pub async fn run(&mut self, mut messages: MessageStream) -> IngestResult<IngestStats> {
        while let Some(message) = messages.next().await {
            let message = message?;
            let before = self.stats.messages_processed;
            self.process_message(&message).await?;

            if progress_due(before, self.stats.messages_processed) {
                self.log_progress("Ingestion progress").await?;
            }
        }

        self.log_progress("Ingestion finished").await?;
        Ok(self.stats)
    }

    /// Handle one message
    #[instrument(skip(self, message), fields(source = %message.source, message_id = %message.id))]
    pub async fn process_message(&mut self, message: &Message) -> IngestResult<MessageOutcome> {
        if self.halted.contains(&message.source) {
            self.stats.messages_skipped += 1;
            tracing::warn!("Source halted, leaving message for the next run");
            return Ok(MessageOutcome::Skipped);
        }

        let references = MessageScanner::scan(message);
        let emoji_ids = self.expand(&references).await?;
        let parents = self.resolve_parents(&emoji_ids).await?;

        let all_ids: Vec<EmojiId> = emoji_ids.iter().copied().collect();
        self.known.add(&all_ids).await?;

        let packs = self.resolve_packs(&parents).await?;

        let upserted = match self.persist(&parents, &packs).await {
            Ok(upserted) => upserted,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    code = e.code(),
                    mode = %self.mode,
                    "Failed to persist discoveries, halting source"
                );
                if self.halted.halt(&message.source) {
                    self.stats.sources_halted += 1;
                }

                return match self.mode {
                    IngestMode::Scrape => Ok(MessageOutcome::Halted),
                    IngestMode::Listen => Err(IngestError::SourceHalted {
                        name: message.source.clone(),
                        error: e,
                    }),
                };
            }
        };

        self.cursors.advance(&message.source, message.id).await?;

        let unresolved = parents.values().filter(|p| p.is_none()).count();
        self.stats.messages_processed += 1;
        self.stats.emoji_discovered += emoji_ids.len() as u64;
        self.stats.emoji_unresolved += unresolved as u64;
        self.stats.packs_upserted += packs.len() as u64;
        self.stats.emoji_upserted += upserted as u64;

        if !emoji_ids.is_empty() {
            tracing::info!(
                emoji = emoji_ids.len(),
                packs = packs.len(),
                unresolved,
                "Processed message"
            );
        }

        Ok(MessageOutcome::Committed {
            emoji: emoji_ids.len(),
            packs: packs.len(),
            emoji_upserted: upserted,
        })
    }

    /// Union of the members of every linked pack and every bare emoji id
    async fn expand(
        &self,
        references: &[EmojiReference],
    ) -> RepoResult<BTreeSet<EmojiId>> {
        let mut emoji_ids: BTreeSet<EmojiId> =
            MessageScanner::emoji_ids(references).into_iter().collect();

        let names = MessageScanner::short_names(references);
        let members = join_all(
            names
                .iter()
                .map(|name| self.resolver.resolve_by_short_name(name)),
        )
        .await;

        for set in members {
            emoji_ids.extend(set?);
        }

        Ok(emoji_ids)
    }

    /// Parent pack of every emoji, `None` where it cannot be resolved
    async fn resolve_parents(
        &self,
        emoji_ids: &BTreeSet<EmojiId>,
    ) -> RepoResult<BTreeMap<EmojiId, Option<PackId>>> {
        let lookups = join_all(emoji_ids.iter().map(|emoji_id| async move {
            let parent = self.resolver.resolve_parent_pack_id(*emoji_id).await?;
            Ok::<_, DomainError>((*emoji_id, parent))
        }))
        .await;

        lookups.into_iter().collect()
    }

    /// Every distinct parent pack, resolved
    async fn resolve_packs(
        &self,
        parents: &BTreeMap<EmojiId, Option<PackId>>,
    ) -> RepoResult<BTreeMap<PackId, EmojiPack>> {
        let pack_ids: BTreeSet<PackId> = parents.values().flatten().copied().collect();

        let packs = join_all(
            pack_ids
                .iter()
                .map(|pack_id| self.resolver.resolve_by_pack_id(*pack_id)),
        )
        .await;

        let mut resolved = BTreeMap::new();
        for pack in packs {
            if let Some(pack) = pack? {
                resolved.insert(pack.id, pack);
            }
        }
        Ok(resolved)
    }

    /// Upsert packs, then emoji; returns the number of emoji written
    async fn persist(
        &self,
        parents: &BTreeMap<EmojiId, Option<PackId>>,
        packs: &BTreeMap<PackId, EmojiPack>,
    ) -> RepoResult<usize> {
        for pack in packs.values() {
            self.sink.upsert_pack(&pack.to_record()).await?;
        }

        let mut upserted = 0;
        for (emoji_id, parent) in parents {
            let Some(pack) = parent.and_then(|pack_id| packs.get(&pack_id)) else {
                continue;
            };
            self.sink.upsert_emoji(&pack.emoji_record(*emoji_id)).await?;
            upserted += 1;
        }

        Ok(upserted)
    }

    async fn log_progress(&self, msg: &str) -> IngestResult<()> {
        let known = self.known.count().await?;
        tracing::info!(
            processed = self.stats.messages_processed,
            skipped = self.stats.messages_skipped,
            emoji_discovered = self.stats.emoji_discovered,
            emoji_unresolved = self.stats.emoji_unresolved,
            packs_upserted = self.stats.packs_upserted,
            emoji_upserted = self.stats.emoji_upserted,
            sources_halted = self.stats.sources_halted,
            known_emoji = known,
            "{msg}"
        );
        Ok(())
    }
}

/// Whether a progress line is due after processed went from `before` to `after`
fn progress_due(before: u64, after: u64) -> bool {
    after != before && after % PROGRESS_INTERVAL == 0
}
