//! Ports - the interfaces the ingestion engine needs from the outside world
//!
//! The domain layer defines what it needs, and the infrastructure crates
//! provide the implementation: the chat transport, the key-value cache and
//! the persistence sink.

use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::entities::{EmojiDocument, EmojiPack, EmojiRecord, Message, PackRecord};
use crate::error::DomainError;
use crate::value_objects::{EmojiId, MessageId, PackId};

/// Result type for port operations
pub type RepoResult<T> = Result<T, DomainError>;

/// Lazy sequence of messages produced by the transport
pub type MessageStream = BoxStream<'static, RepoResult<Message>>;

// ============================================================================
// Chat Transport
// ============================================================================

#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Live feed of new messages from the given sources.
    ///
    /// The stream never ends on its own.
    fn subscribe(&self, sources: &[String]) -> MessageStream;

    /// Historical messages of one source with an id strictly greater than
    /// `after_id`, oldest first. The stream is finite and ends once the
    /// backlog is exhausted.
    fn paginate(&self, source: &str, after_id: MessageId) -> MessageStream;

    /// Fetch a pack and its members by short name
    async fn fetch_pack_by_name(&self, short_name: &str) -> RepoResult<EmojiPack>;

    /// Fetch a pack and its members by id
    async fn fetch_pack_by_id(&self, pack_id: PackId) -> RepoResult<EmojiPack>;

    /// Fetch the document metadata of a custom emoji
    async fn fetch_document(&self, emoji_id: EmojiId) -> RepoResult<EmojiDocument>;
}

// ============================================================================
// Key-Value Store
// ============================================================================

/// String-keyed store backing the cursor and pack caches.
///
/// Each call is atomic for the keys it touches; there is no multi-call
/// transaction.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key
    async fn get(&self, key: &str) -> RepoResult<Option<String>>;

    /// Set a key-value pair with no expiry
    async fn set(&self, key: &str, value: &str) -> RepoResult<()>;

    /// Set many key-value pairs in one round trip
    async fn set_many(&self, entries: &[(String, String)]) -> RepoResult<()>;

    /// Add members to a set
    async fn set_add(&self, key: &str, members: &[String]) -> RepoResult<()>;

    /// Number of members in a set
    async fn set_len(&self, key: &str) -> RepoResult<u64>;

    /// Check the store is reachable
    async fn ping(&self) -> RepoResult<()>;
}

// ============================================================================
// Catalog Sink
// ============================================================================

/// Persistence target for discovered packs and emoji.
///
/// Delivery is at-least-once, so both operations must be idempotent.
#[async_trait]
pub trait CatalogSink: Send + Sync {
    /// Insert or update a pack
    async fn upsert_pack(&self, pack: &PackRecord) -> RepoResult<()>;

    /// Insert or update an emoji
    async fn upsert_emoji(&self, emoji: &EmojiRecord) -> RepoResult<()>;
}
