//! Domain errors - error types shared by every port

use thiserror::Error;

use crate::value_objects::{EmojiId, PackId};

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Transport Errors
    // =========================================================================
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Emoji pack not found: {0}")]
    PackNotFound(String),

    #[error("Emoji document not found: {0}")]
    DocumentNotFound(EmojiId),

    // =========================================================================
    // Cache Errors
    // =========================================================================
    #[error("Cache unavailable: {0}")]
    CacheUnavailable(String),

    #[error("Corrupt cache entry at {key}: {reason}")]
    CorruptCacheEntry { key: String, reason: String },

    // =========================================================================
    // Persistence Errors
    // =========================================================================
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl DomainError {
    /// Pack lookup by short name failed because the pack does not exist
    pub fn pack_name_not_found(short_name: &str) -> Self {
        Self::PackNotFound(short_name.to_string())
    }

    /// Pack lookup by id failed because the pack does not exist
    pub fn pack_id_not_found(pack_id: PackId) -> Self {
        Self::PackNotFound(pack_id.to_string())
    }

    /// Get a stable error code string for logs
    pub fn code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::PackNotFound(_) => "UNKNOWN_PACK",
            Self::DocumentNotFound(_) => "UNKNOWN_DOCUMENT",
            Self::CacheUnavailable(_) => "CACHE_UNAVAILABLE",
            Self::CorruptCacheEntry { .. } => "CACHE_CORRUPT",
            Self::Persistence(_) => "PERSISTENCE_ERROR",
        }
    }

    /// Check if this error came from the chat transport
    ///
    /// Transport errors are always recovered locally by degrading the
    /// resolution result.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::PackNotFound(_) | Self::DocumentNotFound(_)
        )
    }

    /// Check if this error came from the key-value cache
    pub fn is_cache(&self) -> bool {
        matches!(self, Self::CacheUnavailable(_) | Self::CorruptCacheEntry { .. })
    }

    /// Check if this error came from the persistence sink
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::PackNotFound(_) | Self::DocumentNotFound(_))
    }
}
