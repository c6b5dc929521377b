//! Domain entities - core business objects

mod message;
mod pack;
mod reference;

pub use message::{Message, MessageEntity, Reaction, ReactionKind};
pub use pack::{emoji_file_path, EmojiDocument, EmojiPack, EmojiRecord, PackRecord};
pub use reference::{DiscoveryKind, EmojiReference, ReferenceTarget};
