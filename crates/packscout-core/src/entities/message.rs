//! Message entity - a chat message as delivered by the transport

use serde::{Deserialize, Serialize};

use crate::value_objects::{EmojiId, MessageId};

/// A message read from one of the watched sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    /// Name of the source the message was read from
    pub source: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
    #[serde(default)]
    pub entities: Vec<MessageEntity>,
}

impl Message {
    /// Create a plain text message
    pub fn new(id: MessageId, source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id,
            source: source.into(),
            text: Some(text.into()),
            reactions: Vec::new(),
            entities: Vec::new(),
        }
    }

    /// Add a reaction
    #[must_use]
    pub fn with_reaction(mut self, kind: ReactionKind, count: i32) -> Self {
        self.reactions.push(Reaction { kind, count });
        self
    }

    /// Add a formatting entity
    #[must_use]
    pub fn with_entity(mut self, entity: MessageEntity) -> Self {
        self.entities.push(entity);
        self
    }
}

/// Aggregated reaction attached to a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    #[serde(flatten)]
    pub kind: ReactionKind,
    #[serde(default)]
    pub count: i32,
}

/// What a reaction is made of
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReactionKind {
    /// Standard unicode emoji
    Emoji { emoticon: String },
    /// Premium custom emoji, identified by its document id
    CustomEmoji { document_id: EmojiId },
    /// Paid star reaction
    Paid,
    #[serde(other)]
    Unknown,
}

impl ReactionKind {
    /// Document id if this is a custom emoji reaction
    #[inline]
    pub fn custom_emoji_id(&self) -> Option<EmojiId> {
        match self {
            Self::CustomEmoji { document_id } => Some(*document_id),
            _ => None,
        }
    }
}

/// Formatting entity inside the message text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageEntity {
    /// Inline custom emoji
    CustomEmoji {
        offset: u32,
        length: u32,
        document_id: EmojiId,
    },
    /// Link with a hidden URL
    TextUrl { offset: u32, length: u32, url: String },
    /// Any formatting the scanner does not care about (bold, code, ...)
    #[serde(other)]
    Other,
}

impl MessageEntity {
    /// Document id if this is a custom emoji entity
    #[inline]
    pub fn custom_emoji_id(&self) -> Option<EmojiId> {
        match self {
            Self::CustomEmoji { document_id, .. } => Some(*document_id),
            _ => None,
        }
    }
}
