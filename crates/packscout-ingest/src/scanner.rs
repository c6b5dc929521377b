//! Extraction of emoji references from a single message.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use packscout_core::{
    DiscoveryKind, EmojiId, EmojiReference, Message, MessageEntity, ReferenceTarget,
};
use regex::Regex;

/// Pack install link, e.g. `https://t.me/addemoji/FooPack`
static ADDEMOJI_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"t\.me/addemoji/(?P<shortname>\w+)").expect("addemoji regex should compile")
});

/// Scans messages for pack links, custom emoji reactions and custom emoji entities
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageScanner;

impl MessageScanner {
    /// All references found in a message.
    ///
    /// One reference per target, sorted: short names first in lexical order,
    /// then emoji ids ascending. When the same emoji shows up both as a
    /// reaction and as an entity the reaction wins.
    pub fn scan(message: &Message) -> Vec<EmojiReference> {
        let mut found: BTreeMap<ReferenceTarget, EmojiReference> = BTreeMap::new();
        let mut add = |reference: EmojiReference| {
            found.entry(reference.target.clone()).or_insert(reference);
        };

        if let Some(text) = &message.text {
            for name in extract_short_names(text) {
                add(EmojiReference::short_name(message.id, name));
            }
        }

        for entity in &message.entities {
            if let MessageEntity::TextUrl { url, .. } = entity {
                for name in extract_short_names(url) {
                    add(EmojiReference::short_name(message.id, name));
                }
            }
        }

        for reaction in &message.reactions {
            if let Some(emoji_id) = reaction.kind.custom_emoji_id() {
                add(EmojiReference::emoji(
                    message.id,
                    emoji_id,
                    DiscoveryKind::Reaction,
                ));
            }
        }

        for entity in &message.entities {
            if let Some(emoji_id) = entity.custom_emoji_id() {
                add(EmojiReference::emoji(message.id, emoji_id, DiscoveryKind::Entity));
            }
        }

        found.into_values().collect()
    }

    /// Short names of the packs linked from a message, deduplicated and sorted
    pub fn short_names(references: &[EmojiReference]) -> Vec<&str> {
        references
            .iter()
            .filter_map(|r| match &r.target {
                ReferenceTarget::ShortName(name) => Some(name.as_str()),
                ReferenceTarget::Emoji(_) => None,
            })
            .collect()
    }

    /// Bare emoji ids referenced by a message, deduplicated and ascending
    pub fn emoji_ids(references: &[EmojiReference]) -> Vec<EmojiId> {
        references.iter().filter_map(EmojiReference::emoji_id).collect()
    }
}

/// Every pack short name linked in `text`, in order of appearance
pub fn extract_short_names(text: &str) -> Vec<String> {
    ADDEMOJI_REGEX
        .captures_iter(text)
        .filter_map(|caps| caps.name("shortname"))
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use packscout_core::{MessageId, ReactionKind};

    fn custom(id: i64) -> ReactionKind {
        ReactionKind::CustomEmoji {
            document_id: EmojiId::new(id),
        }
    }

    fn entity(id: i64) -> MessageEntity {
        MessageEntity::CustomEmoji {
            offset: 0,
            length: 2,
            document_id: EmojiId::new(id),
        }
    }

    #[test]
    fn test_extract_short_names() {
        let text = "grab https://t.me/addemoji/FooPack and t.me/addemoji/bar_2, not t.me/addstickers/baz";
        assert_eq!(extract_short_names(text), vec!["FooPack", "bar_2"]);
        assert!(extract_short_names("no links here").is_empty());
    }

    #[test]
    fn test_scan_collects_all_kinds() {
        let message = Message::new(MessageId::new(3), "chan", "t.me/addemoji/foo")
            .with_reaction(custom(55), 4)
            .with_reaction(
                ReactionKind::Emoji {
                    emoticon: "👍".into(),
                },
                10,
            )
            .with_reaction(ReactionKind::Paid, 1)
            .with_entity(entity(12))
            .with_entity(MessageEntity::Other);

        let refs = MessageScanner::scan(&message);

        assert_eq!(MessageScanner::short_names(&refs), vec!["foo"]);
        assert_eq!(
            MessageScanner::emoji_ids(&refs),
            vec![EmojiId::new(12), EmojiId::new(55)]
        );
        assert!(refs.iter().all(|r| r.message_id == MessageId::new(3)));
    }

    #[test]
    fn test_scan_deduplicates_and_sorts() {
        let message = Message::new(
            MessageId::new(1),
            "chan",
            "t.me/addemoji/zed t.me/addemoji/abc t.me/addemoji/zed",
        )
        .with_reaction(custom(9), 1)
        .with_entity(entity(9))
        .with_entity(entity(2))
        .with_entity(entity(9));

        let refs = MessageScanner::scan(&message);

        assert_eq!(MessageScanner::short_names(&refs), vec!["abc", "zed"]);
        assert_eq!(
            MessageScanner::emoji_ids(&refs),
            vec![EmojiId::new(2), EmojiId::new(9)]
        );
        let nine = refs
            .iter()
            .find(|r| r.emoji_id() == Some(EmojiId::new(9)))
            .unwrap();
        assert_eq!(nine.kind, DiscoveryKind::Reaction);
    }

    #[test]
    fn test_scan_is_idempotent() {
        let message = Message::new(MessageId::new(1), "chan", "t.me/addemoji/foo")
            .with_entity(entity(7))
            .with_reaction(custom(5), 2);

        assert_eq!(MessageScanner::scan(&message), MessageScanner::scan(&message));
    }

    #[test]
    fn test_scan_reads_hidden_links() {
        let mut message = Message::new(MessageId::new(1), "chan", "install this pack")
            .with_entity(MessageEntity::TextUrl {
                offset: 0,
                length: 7,
                url: "https://t.me/addemoji/Hidden".into(),
            });
        message.text = None;

        let refs = MessageScanner::scan(&message);
        assert_eq!(MessageScanner::short_names(&refs), vec!["Hidden"]);
    }

    #[test]
    fn test_scan_empty_message() {
        let mut message = Message::new(MessageId::new(1), "chan", "");
        message.text = None;
        assert!(MessageScanner::scan(&message).is_empty());
    }
}
