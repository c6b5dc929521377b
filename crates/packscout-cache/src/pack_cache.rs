//! Cache-aside storage for resolved emoji packs.
//!
//! Layout (no key carries an expiry):
//!
//! | Key | Value |
//! |---|---|
//! | `emojipack:<packId>:emoji_ids` | JSON array of member emoji ids |
//! | `emojipack:<packId>:data` | JSON object with id, short name and title |
//! | `emoji:<emojiId>:emojipack_id` | parent pack id |
//! | `emojipack_name:<short name>:emojipack_id` | pack id for a lowercased short name |
//!
//! Member ids live only under `emoji_ids`, so every reader sees the same
//! member set. A pack is written in a fixed order: member list, reverse
//! index, pack data, short name. The data key is the commit marker: a pack
//! counts as cached only when both its data and member list are present,
//! and a data key without a member list is treated as a miss.

use packscout_core::{DomainError, EmojiId, EmojiPack, KeyValueStore, PackId, RepoResult};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Key prefix for pack entries
const PACK_PREFIX: &str = "emojipack:";
/// Key prefix for the emoji to pack reverse index
const EMOJI_PREFIX: &str = "emoji:";
/// Key prefix for the short name index
const PACK_NAME_PREFIX: &str = "emojipack_name:";

/// Pack metadata as stored under the data key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct PackData {
    id: PackId,
    short_name: String,
    title: String,
}

/// Pack cache over a key-value store
#[derive(Clone)]
pub struct PackCache {
    store: Arc<dyn KeyValueStore>,
}

impl PackCache {
    /// Create a new pack cache
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn data_key(pack_id: PackId) -> String {
        format!("{PACK_PREFIX}{pack_id}:data")
    }

    fn emoji_ids_key(pack_id: PackId) -> String {
        format!("{PACK_PREFIX}{pack_id}:emoji_ids")
    }

    fn parent_key(emoji_id: EmojiId) -> String {
        format!("{EMOJI_PREFIX}{emoji_id}:emojipack_id")
    }

    fn name_key(short_name: &str) -> String {
        format!("{PACK_NAME_PREFIX}{}:emojipack_id", short_name.to_lowercase())
    }

    /// Get a cached pack with its members
    pub async fn get_pack(&self, pack_id: PackId) -> RepoResult<Option<EmojiPack>> {
        let Some(data) = self.read_json::<PackData>(&Self::data_key(pack_id)).await? else {
            return Ok(None);
        };

        let Some(emoji_ids) = self.get_member_ids(pack_id).await? else {
            tracing::warn!(
                pack_id = %pack_id,
                "Cached pack data has no member list, treating as a miss"
            );
            return Ok(None);
        };

        Ok(Some(EmojiPack {
            id: data.id,
            short_name: data.short_name,
            title: data.title,
            emoji_ids,
        }))
    }

    /// Get the cached member list of a pack
    pub async fn get_member_ids(&self, pack_id: PackId) -> RepoResult<Option<BTreeSet<EmojiId>>> {
        self.read_json(&Self::emoji_ids_key(pack_id)).await
    }

    /// Get the pack id cached for a short name
    pub async fn get_pack_id_by_name(&self, short_name: &str) -> RepoResult<Option<PackId>> {
        self.read_id(&Self::name_key(short_name)).await
    }

    /// Get the cached parent pack of an emoji
    pub async fn get_parent_pack_id(&self, emoji_id: EmojiId) -> RepoResult<Option<PackId>> {
        self.read_id(&Self::parent_key(emoji_id)).await
    }

    /// Cache a freshly fetched pack.
    ///
    /// Writes the member list, the reverse index of every member, the pack
    /// data and the short name index, in that order.
    pub async fn store_pack(&self, pack: &EmojiPack) -> RepoResult<()> {
        let ids = serde_json::to_string(&pack.emoji_ids).map_err(|e| {
            DomainError::CorruptCacheEntry {
                key: Self::emoji_ids_key(pack.id),
                reason: e.to_string(),
            }
        })?;
        self.store.set(&Self::emoji_ids_key(pack.id), &ids).await?;

        self.store_parent_pack_ids(pack.id, pack.emoji_ids.iter().copied())
            .await?;

        let data = PackData {
            id: pack.id,
            short_name: pack.short_name.clone(),
            title: pack.title.clone(),
        };
        let data = serde_json::to_string(&data).map_err(|e| DomainError::CorruptCacheEntry {
            key: Self::data_key(pack.id),
            reason: e.to_string(),
        })?;
        self.store.set(&Self::data_key(pack.id), &data).await?;

        self.store
            .set(&Self::name_key(&pack.short_name), &pack.id.to_string())
            .await?;

        tracing::debug!(
            pack_id = %pack.id,
            short_name = %pack.short_name,
            members = pack.len(),
            "Cached emoji pack"
        );

        Ok(())
    }

    /// Point every given emoji at its parent pack in a single batch write
    pub async fn store_parent_pack_ids<I>(&self, pack_id: PackId, emoji_ids: I) -> RepoResult<()>
    where
        I: IntoIterator<Item = EmojiId>,
    {
        let value = pack_id.to_string();
        let entries: Vec<(String, String)> = emoji_ids
            .into_iter()
            .map(|emoji_id| (Self::parent_key(emoji_id), value.clone()))
            .collect();

        self.store.set_many(&entries).await
    }

    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> RepoResult<Option<T>> {
        match self.store.get(key).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| DomainError::CorruptCacheEntry {
                    key: key.to_string(),
                    reason: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    async fn read_id(&self, key: &str) -> RepoResult<Option<PackId>> {
        match self.store.get(key).await? {
            Some(raw) => PackId::parse(&raw)
                .map(Some)
                .map_err(|e| DomainError::CorruptCacheEntry {
                    key: key.to_string(),
                    reason: e.to_string(),
                }),
            None => Ok(None),
        }
    }
}
