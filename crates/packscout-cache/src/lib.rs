//! # packscout-cache
//!
//! Key-value caching layer: resume cursors, resolved emoji packs, and the
//! set of known emoji.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **In-memory store**: Same semantics without a server
//! - **Cursors**: Last processed message id per source
//! - **Pack cache**: Pack metadata, member lists, and the emoji to pack index
//! - **Known emoji**: Append-only set of every emoji id seen
//!
//! ## Example
//!
//! ```ignore
//! use packscout_cache::{CursorStore, PackCache, RedisPool, RedisPoolConfig};
//!
//! let pool = Arc::new(RedisPool::new(RedisPoolConfig::default())?);
//! let cursors = CursorStore::new(pool.clone());
//! let packs = PackCache::new(pool);
//!
//! let resume_from = cursors.get("emojichannel").await?;
//! let pack = packs.get_pack(PackId::new(7)).await?;
//! ```

pub mod cursor;
pub mod known;
pub mod memory;
pub mod pack_cache;
pub mod pool;

pub use cursor::CursorStore;
pub use known::KnownEmojiStore;
pub use memory::MemoryStore;
pub use pack_cache::PackCache;

// Re-export pool types
pub use pool::{
    create_shared_pool, RedisPool, RedisPoolConfig, RedisPoolError, RedisResult, SharedRedisPool,
};
