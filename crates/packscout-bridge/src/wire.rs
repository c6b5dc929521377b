//! JSON payloads exchanged with the bridge
//!
//! History pages and updates carry their messages as raw JSON so one bad
//! item cannot fail the whole response.

use packscout_core::{EmojiDocument, EmojiId, EmojiPack, Message, MessageId, PackId};
use serde::Deserialize;
use serde_json::Value;

/// One page of message history
#[derive(Debug, Deserialize)]
pub struct MessagesPage {
    #[serde(default)]
    pub messages: Vec<Value>,
}

/// Long-poll response
#[derive(Debug, Deserialize)]
pub struct UpdatesResponse {
    #[serde(default)]
    pub updates: Vec<Value>,
}

/// A single pushed update
#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Value,
}

/// A message item that does not decode
#[derive(Debug)]
pub struct MalformedMessage {
    /// Id of the item, when at least that much is readable
    pub id: Option<MessageId>,
    pub error: serde_json::Error,
}

/// Decode one message item
pub fn decode_message(value: Value) -> Result<Message, MalformedMessage> {
    let id = value
        .get("id")
        .and_then(|id| id.as_i64().or_else(|| id.as_str()?.parse().ok()))
        .map(MessageId::new);

    serde_json::from_value(value).map_err(|error| MalformedMessage { id, error })
}

/// A sticker set of custom emoji
#[derive(Debug, Deserialize)]
pub struct StickerSet {
    pub id: PackId,
    pub short_name: String,
    pub title: String,
    #[serde(default)]
    pub documents: Vec<DocumentSummary>,
}

/// Member document of a sticker set
#[derive(Debug, Deserialize)]
pub struct DocumentSummary {
    pub id: EmojiId,
}

impl From<StickerSet> for EmojiPack {
    fn from(set: StickerSet) -> Self {
        EmojiPack::new(
            set.id,
            set.short_name,
            set.title,
            set.documents.into_iter().map(|d| d.id),
        )
    }
}

/// Full document metadata
#[derive(Debug, Deserialize)]
pub struct Document {
    pub id: EmojiId,
    #[serde(default)]
    pub attributes: Vec<DocumentAttribute>,
}

/// Typed attribute of a document
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DocumentAttribute {
    CustomEmoji {
        #[serde(default)]
        alt: Option<String>,
        #[serde(default)]
        stickerset: Option<StickerSetRef>,
    },
    #[serde(other)]
    Other,
}

/// Reference to the set a document belongs to
#[derive(Debug, Deserialize)]
pub struct StickerSetRef {
    pub id: PackId,
}

impl From<Document> for EmojiDocument {
    fn from(doc: Document) -> Self {
        let custom = doc.attributes.into_iter().find_map(|attr| match attr {
            DocumentAttribute::CustomEmoji { alt, stickerset } => Some((alt, stickerset)),
            DocumentAttribute::Other => None,
        });

        let (alt, pack_id) = match custom {
            Some((alt, stickerset)) => (alt, stickerset.map(|s| s.id)),
            None => (None, None),
        };

        EmojiDocument {
            id: doc.id,
            alt,
            pack_id,
        }
    }
}
