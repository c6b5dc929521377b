//! Cache-aside resolution of emoji packs.
//!
//! Every entry point consults the pack cache first and only falls back to
//! the transport on a miss. A successful fetch is cached before it is
//! returned, together with the reverse index of every member. Transport
//! failures degrade to an empty result and are never cached, so the next
//! occurrence of the same reference retries. Cache failures propagate.

use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::sync::Arc;

use packscout_cache::PackCache;
use packscout_core::{ChatTransport, DomainError, EmojiId, EmojiPack, PackId, RepoResult};
use parking_lot::Mutex;
use tokio::sync::Semaphore;
use tracing::instrument;

/// Where a resolved pack came from
enum Resolved {
    Cached(EmojiPack),
    Fetched(EmojiPack),
}

impl Resolved {
    fn into_pack(self) -> EmojiPack {
        match self {
            Self::Cached(pack) | Self::Fetched(pack) => pack,
        }
    }
}

/// Resolves short names, pack ids and emoji ids into packs
pub struct PackResolver {
    transport: Arc<dyn ChatTransport>,
    cache: PackCache,
    /// Bounds the number of transport calls in flight
    permits: Semaphore,
    /// One fetch per pack id at a time
    pack_locks: Mutex<HashMap<PackId, Arc<tokio::sync::Mutex<()>>>>,
}

impl PackResolver {
    /// Create a resolver allowing at most `concurrency` transport calls at once
    pub fn new(transport: Arc<dyn ChatTransport>, cache: PackCache, concurrency: usize) -> Self {
        Self {
            transport,
            cache,
            permits: Semaphore::new(concurrency.max(1)),
            pack_locks: Mutex::new(HashMap::new()),
        }
    }

    /// The pack cache this resolver reads and fills
    pub fn cache(&self) -> &PackCache {
        &self.cache
    }

    /// Run a transport call once a permit is available
    async fn call<T, F>(&self, call: F) -> RepoResult<T>
    where
        F: Future<Output = RepoResult<T>>,
    {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| DomainError::Transport(e.to_string()))?;
        call.await
    }

    /// Member ids of the pack with the given short name.
    ///
    /// Returns an empty set when the transport cannot provide the pack.
    #[instrument(skip(self))]
    pub async fn resolve_by_short_name(&self, short_name: &str) -> RepoResult<BTreeSet<EmojiId>> {
        if let Some(pack_id) = self.cache.get_pack_id_by_name(short_name).await? {
            if let Some(members) = self.cache.get_member_ids(pack_id).await? {
                tracing::debug!(pack_id = %pack_id, "Short name resolved from cache");
                return Ok(members);
            }
        }

        match self.call(self.transport.fetch_pack_by_name(short_name)).await {
            Ok(pack) => {
                self.cache.store_pack(&pack).await?;
                tracing::info!(
                    pack_id = %pack.id,
                    title = %pack.title,
                    members = pack.len(),
                    "Resolved emoji pack by short name"
                );
                Ok(pack.emoji_ids)
            }
            Err(e) if e.is_transport() => {
                tracing::warn!(error = %e, "Failed to fetch emoji pack by short name");
                Ok(BTreeSet::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Pack with the given id, `None` when the transport cannot provide it
    #[instrument(skip(self))]
    pub async fn resolve_by_pack_id(&self, pack_id: PackId) -> RepoResult<Option<EmojiPack>> {
        Ok(self.resolve_pack(pack_id).await?.map(Resolved::into_pack))
    }

    /// Id of the pack an emoji belongs to.
    ///
    /// On a miss the emoji's document names its pack; the pack is resolved
    /// and every one of its members is pointed at it in one batch.
    #[instrument(skip(self))]
    pub async fn resolve_parent_pack_id(&self, emoji_id: EmojiId) -> RepoResult<Option<PackId>> {
        if let Some(pack_id) = self.cache.get_parent_pack_id(emoji_id).await? {
            return Ok(Some(pack_id));
        }

        let document = match self.call(self.transport.fetch_document(emoji_id)).await {
            Ok(document) => document,
            Err(e) if e.is_transport() => {
                tracing::warn!(error = %e, "Failed to fetch emoji document");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let Some(pack_id) = document.pack_id else {
            tracing::debug!("Emoji document carries no pack reference");
            return Ok(None);
        };

        match self.resolve_pack(pack_id).await? {
            Some(Resolved::Fetched(pack)) => {
                // Members were indexed when the pack was cached
                if !pack.contains(emoji_id) {
                    self.cache.store_parent_pack_ids(pack.id, [emoji_id]).await?;
                }
                Ok(Some(pack.id))
            }
            Some(Resolved::Cached(pack)) => {
                let ids = pack.emoji_ids.iter().copied().chain([emoji_id]);
                self.cache.store_parent_pack_ids(pack.id, ids).await?;
                Ok(Some(pack.id))
            }
            None => Ok(None),
        }
    }

    async fn resolve_pack(&self, pack_id: PackId) -> RepoResult<Option<Resolved>> {
        if let Some(pack) = self.cache.get_pack(pack_id).await? {
            return Ok(Some(Resolved::Cached(pack)));
        }

        let lock = self.pack_locks.lock().entry(pack_id).or_default().clone();
        let _guard = lock.lock().await;

        // Another task may have fetched it while we waited
        let result = match self.cache.get_pack(pack_id).await {
            Ok(Some(pack)) => Ok(Some(Resolved::Cached(pack))),
            Ok(None) => self.fetch_pack(pack_id).await,
            Err(e) => Err(e),
        };

        self.pack_locks.lock().remove(&pack_id);
        result
    }

    async fn fetch_pack(&self, pack_id: PackId) -> RepoResult<Option<Resolved>> {
        match self.call(self.transport.fetch_pack_by_id(pack_id)).await {
            Ok(pack) => {
                self.cache.store_pack(&pack).await?;
                tracing::info!(
                    pack_id = %pack.id,
                    short_name = %pack.short_name,
                    members = pack.len(),
                    "Resolved emoji pack by id"
                );
                Ok(Some(Resolved::Fetched(pack)))
            }
            Err(e) if e.is_transport() => {
                tracing::warn!(pack_id = %pack_id, error = %e, "Failed to fetch emoji pack");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
