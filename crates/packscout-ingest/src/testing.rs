//! In-process collaborators for tests: a scripted chat transport and a sink
//! that records every upsert.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use packscout_core::{
    CatalogSink, ChatTransport, DomainError, EmojiDocument, EmojiId, EmojiPack, EmojiRecord,
    Message, MessageId, MessageStream, PackId, PackRecord, RepoResult,
};
use parking_lot::Mutex;

/// A call received by [`ScriptedTransport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    Subscribe(Vec<String>),
    Paginate { source: String, after_id: MessageId },
    PackByName(String),
    PackById(PackId),
    Document(EmojiId),
}

/// Chat transport answering from fixed data
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    packs: Mutex<HashMap<PackId, EmojiPack>>,
    documents: Mutex<HashMap<EmojiId, EmojiDocument>>,
    history: Mutex<HashMap<String, Vec<Message>>>,
    live: Mutex<Vec<Message>>,
    failing_names: Mutex<HashSet<String>>,
    calls: Mutex<Vec<TransportCall>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve a pack, and a document pointing at it for every member
    #[must_use]
    pub fn with_pack(self, pack: EmojiPack) -> Self {
        {
            let mut documents = self.documents.lock();
            for emoji_id in &pack.emoji_ids {
                documents.insert(
                    *emoji_id,
                    EmojiDocument {
                        id: *emoji_id,
                        alt: None,
                        pack_id: Some(pack.id),
                    },
                );
            }
        }
        self.packs.lock().insert(pack.id, pack);
        self
    }

    /// Serve a single document
    #[must_use]
    pub fn with_document(self, document: EmojiDocument) -> Self {
        self.documents.lock().insert(document.id, document);
        self
    }

    /// Serve the history of a source
    #[must_use]
    pub fn with_history(self, source: &str, messages: Vec<Message>) -> Self {
        self.history.lock().insert(source.to_string(), messages);
        self
    }

    /// Push messages through the live feed
    #[must_use]
    pub fn with_live(self, messages: Vec<Message>) -> Self {
        self.live.lock().extend(messages);
        self
    }

    /// Make lookups of a short name fail with a transport error
    pub fn fail_pack_name(&self, short_name: &str) {
        self.failing_names.lock().insert(short_name.to_lowercase());
    }

    /// Undo [`Self::fail_pack_name`]
    pub fn heal_pack_name(&self, short_name: &str) {
        self.failing_names.lock().remove(&short_name.to_lowercase());
    }

    /// Every call received so far
    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Pack lookups by name or by id
    pub fn pack_fetches(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, TransportCall::PackByName(_) | TransportCall::PackById(_)))
            .count()
    }

    /// Document lookups
    pub fn document_fetches(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, TransportCall::Document(_)))
            .count()
    }

    fn record(&self, call: TransportCall) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    fn subscribe(&self, sources: &[String]) -> MessageStream {
        self.record(TransportCall::Subscribe(sources.to_vec()));

        let messages: Vec<RepoResult<Message>> = self
            .live
            .lock()
            .iter()
            .filter(|m| sources.contains(&m.source))
            .cloned()
            .map(Ok)
            .collect();

        stream::iter(messages).chain(stream::pending()).boxed()
    }

    fn paginate(&self, source: &str, after_id: MessageId) -> MessageStream {
        self.record(TransportCall::Paginate {
            source: source.to_string(),
            after_id,
        });

        let mut messages: Vec<Message> = self
            .history
            .lock()
            .get(source)
            .map(|history| {
                history
                    .iter()
                    .filter(|m| m.id > after_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        messages.sort_by_key(|m| m.id);

        stream::iter(messages.into_iter().map(Ok)).boxed()
    }

    async fn fetch_pack_by_name(&self, short_name: &str) -> RepoResult<EmojiPack> {
        self.record(TransportCall::PackByName(short_name.to_string()));

        if self.failing_names.lock().contains(&short_name.to_lowercase()) {
            return Err(DomainError::Transport(format!(
                "scripted failure for {short_name}"
            )));
        }

        self.packs
            .lock()
            .values()
            .find(|p| p.short_name.eq_ignore_ascii_case(short_name))
            .cloned()
            .ok_or_else(|| DomainError::pack_name_not_found(short_name))
    }

    async fn fetch_pack_by_id(&self, pack_id: PackId) -> RepoResult<EmojiPack> {
        self.record(TransportCall::PackById(pack_id));

        self.packs
            .lock()
            .get(&pack_id)
            .cloned()
            .ok_or_else(|| DomainError::pack_id_not_found(pack_id))
    }

    async fn fetch_document(&self, emoji_id: EmojiId) -> RepoResult<EmojiDocument> {
        self.record(TransportCall::Document(emoji_id));

        self.documents
            .lock()
            .get(&emoji_id)
            .cloned()
            .ok_or(DomainError::DocumentNotFound(emoji_id))
    }
}

/// Sink keeping every upsert in memory
#[derive(Debug, Default)]
pub struct RecordingSink {
    packs: Mutex<Vec<PackRecord>>,
    emoji: Mutex<Vec<EmojiRecord>>,
    failing: AtomicBool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent upsert fail
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn packs(&self) -> Vec<PackRecord> {
        self.packs.lock().clone()
    }

    pub fn emoji(&self) -> Vec<EmojiRecord> {
        self.emoji.lock().clone()
    }

    fn check(&self) -> RepoResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::Persistence("scripted sink failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogSink for RecordingSink {
    async fn upsert_pack(&self, pack: &PackRecord) -> RepoResult<()> {
        self.check()?;
        self.packs.lock().push(pack.clone());
        Ok(())
    }

    async fn upsert_emoji(&self, emoji: &EmojiRecord) -> RepoResult<()> {
        self.check()?;
        self.emoji.lock().push(emoji.clone());
        Ok(())
    }
}
