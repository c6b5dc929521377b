//! Test fixtures and data generators

use packscout_core::{EmojiId, EmojiPack, Message, MessageEntity, MessageId, PackId, ReactionKind};

/// Pack `foo` (id 7) with members 101 and 102
pub fn foo_pack() -> EmojiPack {
    EmojiPack::new(
        PackId::new(7),
        "foo",
        "Foo Pack",
        [EmojiId::new(101), EmojiId::new(102)],
    )
}

/// Pack `bar` (id 8) with members 55 and 56
pub fn bar_pack() -> EmojiPack {
    EmojiPack::new(
        PackId::new(8),
        "bar",
        "Bar Pack",
        [EmojiId::new(55), EmojiId::new(56)],
    )
}

/// Plain text message
pub fn text_message(source: &str, id: i64, text: &str) -> Message {
    Message::new(MessageId::new(id), source, text)
}

/// Message linking a pack by short name
pub fn link_message(source: &str, id: i64, short_name: &str) -> Message {
    text_message(
        source,
        id,
        &format!("new pack https://t.me/addemoji/{short_name}"),
    )
}

/// Message carrying a custom emoji reaction
pub fn reaction_message(source: &str, id: i64, emoji_id: i64) -> Message {
    text_message(source, id, "react!").with_reaction(
        ReactionKind::CustomEmoji {
            document_id: EmojiId::new(emoji_id),
        },
        3,
    )
}

/// Message with an inline custom emoji
pub fn entity_message(source: &str, id: i64, emoji_id: i64) -> Message {
    text_message(source, id, "🙂").with_entity(MessageEntity::CustomEmoji {
        offset: 0,
        length: 2,
        document_id: EmojiId::new(emoji_id),
    })
}

/// Numbered history of plain messages
pub fn history(source: &str, ids: impl IntoIterator<Item = i64>) -> Vec<Message> {
    ids.into_iter()
        .map(|id| text_message(source, id, "history"))
        .collect()
}
