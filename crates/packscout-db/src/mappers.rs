//! Model → domain record mappers

use packscout_core::{EmojiId, EmojiRecord, PackId, PackRecord};

use crate::models::{EmojiModel, PackModel};

impl From<PackModel> for PackRecord {
    fn from(model: PackModel) -> Self {
        Self {
            pack_id: PackId::new(model.pack_id),
            short_name: model.short_name,
            title: model.title,
        }
    }
}

impl From<EmojiModel> for EmojiRecord {
    fn from(model: EmojiModel) -> Self {
        Self {
            emoji_id: EmojiId::new(model.emoji_id),
            pack_id: PackId::new(model.pack_id),
            description: model.description,
            file_path: model.file_path,
        }
    }
}
