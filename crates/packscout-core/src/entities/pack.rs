//! Emoji pack entities - resolved packs, emoji documents, and the records
//! handed to the persistence sink

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::value_objects::{EmojiId, PackId};

/// A resolved premium emoji pack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmojiPack {
    pub id: PackId,
    pub short_name: String,
    pub title: String,
    /// Ids of every custom emoji in the pack
    pub emoji_ids: BTreeSet<EmojiId>,
}

impl EmojiPack {
    /// Create a new pack
    pub fn new(
        id: PackId,
        short_name: impl Into<String>,
        title: impl Into<String>,
        emoji_ids: impl IntoIterator<Item = EmojiId>,
    ) -> Self {
        Self {
            id,
            short_name: short_name.into(),
            title: title.into(),
            emoji_ids: emoji_ids.into_iter().collect(),
        }
    }

    /// Check whether an emoji belongs to this pack
    #[inline]
    pub fn contains(&self, emoji_id: EmojiId) -> bool {
        self.emoji_ids.contains(&emoji_id)
    }

    /// Number of emoji in the pack
    #[inline]
    pub fn len(&self) -> usize {
        self.emoji_ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.emoji_ids.is_empty()
    }

    /// Record handed to the sink for this pack
    pub fn to_record(&self) -> PackRecord {
        PackRecord {
            pack_id: self.id,
            short_name: self.short_name.clone(),
            title: self.title.clone(),
        }
    }

    /// Record handed to the sink for one member emoji
    pub fn emoji_record(&self, emoji_id: EmojiId) -> EmojiRecord {
        EmojiRecord {
            emoji_id,
            pack_id: self.id,
            description: self.title.clone(),
            file_path: emoji_file_path(self.id, emoji_id),
        }
    }
}

/// Document metadata of a single custom emoji
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmojiDocument {
    pub id: EmojiId,
    /// Unicode emoji the custom emoji stands in for
    #[serde(default)]
    pub alt: Option<String>,
    /// Pack referenced by the document's custom emoji attribute
    #[serde(default)]
    pub pack_id: Option<PackId>,
}

/// Pack row handed to the persistence sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackRecord {
    pub pack_id: PackId,
    pub short_name: String,
    pub title: String,
}

/// Emoji row handed to the persistence sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmojiRecord {
    pub emoji_id: EmojiId,
    pub pack_id: PackId,
    pub description: String,
    pub file_path: String,
}

/// Storage path of an emoji animation
pub fn emoji_file_path(pack_id: PackId, emoji_id: EmojiId) -> String {
    format!("/{pack_id}/{emoji_id}.tgs")
}
