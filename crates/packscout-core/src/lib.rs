//! # packscout-core
//!
//! Domain layer containing messages, emoji packs, identifiers, and the port
//! traits implemented by the infrastructure crates.
//! This crate has zero dependencies on infrastructure (Redis, PostgreSQL, HTTP).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    emoji_file_path, DiscoveryKind, EmojiDocument, EmojiPack, EmojiRecord, EmojiReference,
    Message, MessageEntity, PackRecord, Reaction, ReactionKind, ReferenceTarget,
};
pub use error::DomainError;
pub use traits::{CatalogSink, ChatTransport, KeyValueStore, MessageStream, RepoResult};
pub use value_objects::{EmojiId, IdParseError, MessageId, PackId};
