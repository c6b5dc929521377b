//! Emoji references - candidate emoji found while scanning a message

use crate::value_objects::{EmojiId, MessageId};

/// Where in a message a reference was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiscoveryKind {
    /// `t.me/addemoji/<short name>` link in the text
    TextShortName,
    /// Custom emoji reaction
    Reaction,
    /// Custom emoji formatting entity
    Entity,
}

impl std::fmt::Display for DiscoveryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TextShortName => write!(f, "text-shortname"),
            Self::Reaction => write!(f, "reaction"),
            Self::Entity => write!(f, "entity"),
        }
    }
}

/// What a reference points at
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReferenceTarget {
    /// A whole pack, known only by its short name
    ShortName(String),
    /// A single emoji
    Emoji(EmojiId),
}

/// A candidate emoji reference found in one message
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EmojiReference {
    pub target: ReferenceTarget,
    pub kind: DiscoveryKind,
    pub message_id: MessageId,
}

impl EmojiReference {
    /// Reference to a pack by short name
    pub fn short_name(message_id: MessageId, name: impl Into<String>) -> Self {
        Self {
            target: ReferenceTarget::ShortName(name.into()),
            kind: DiscoveryKind::TextShortName,
            message_id,
        }
    }

    /// Reference to a single emoji
    pub fn emoji(message_id: MessageId, emoji_id: EmojiId, kind: DiscoveryKind) -> Self {
        Self {
            target: ReferenceTarget::Emoji(emoji_id),
            kind,
            message_id,
        }
    }

    /// Emoji id, if the reference points at a single emoji
    #[inline]
    pub fn emoji_id(&self) -> Option<EmojiId> {
        match self.target {
            ReferenceTarget::Emoji(id) => Some(id),
            ReferenceTarget::ShortName(_) => None,
        }
    }
}
