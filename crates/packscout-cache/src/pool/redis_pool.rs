//! Redis connection pool using deadpool-redis.
//!
//! Provides a managed pool of Redis connections and the Redis implementation
//! of [`KeyValueStore`].

use async_trait::async_trait;
use deadpool_redis::{Config, Pool, Runtime};
use packscout_core::{DomainError, KeyValueStore, RepoResult};
use redis::AsyncCommands;
use std::sync::Arc;

/// Redis pool configuration
#[derive(Debug, Clone)]
pub struct RedisPoolConfig {
    /// Redis connection URL (e.g., `redis://localhost:6379`)
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: usize,
}

impl Default for RedisPoolConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            max_connections: 16,
        }
    }
}

impl From<&packscout_common::RedisConfig> for RedisPoolConfig {
    fn from(config: &packscout_common::RedisConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections as usize,
        }
    }
}

/// Error type for Redis pool operations
#[derive(Debug, thiserror::Error)]
pub enum RedisPoolError {
    #[error("Failed to create Redis pool: {0}")]
    CreatePool(String),

    #[error("Failed to get connection from pool: {0}")]
    GetConnection(#[from] deadpool_redis::PoolError),

    #[error("Redis command error: {0}")]
    Redis(#[from] redis::RedisError),
}

impl From<RedisPoolError> for DomainError {
    fn from(err: RedisPoolError) -> Self {
        DomainError::CacheUnavailable(err.to_string())
    }
}

/// Result type for Redis pool operations
pub type RedisResult<T> = Result<T, RedisPoolError>;

/// Managed Redis connection pool
#[derive(Clone)]
pub struct RedisPool {
    pool: Pool,
}

impl std::fmt::Debug for RedisPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisPool")
            .field("status", &self.pool.status())
            .finish()
    }
}

impl RedisPool {
    /// Create a new Redis pool with the given configuration
    pub fn new(config: RedisPoolConfig) -> RedisResult<Self> {
        let cfg = Config::from_url(&config.url);
        let pool = cfg
            .builder()
            .map_err(|e| RedisPoolError::CreatePool(e.to_string()))?
            .max_size(config.max_connections)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| RedisPoolError::CreatePool(e.to_string()))?;

        // Redact credentials from URL for logging
        let safe_url = config.url.split('@').next_back().unwrap_or(&config.url);
        tracing::info!(
            url = %safe_url,
            max_connections = config.max_connections,
            "Redis pool created"
        );

        Ok(Self { pool })
    }

    /// Create a new Redis pool from packscout-common config
    pub fn from_config(config: &packscout_common::RedisConfig) -> RedisResult<Self> {
        Self::new(RedisPoolConfig::from(config))
    }

    /// Get a connection from the pool
    pub async fn get(&self) -> RedisResult<deadpool_redis::Connection> {
        self.pool.get().await.map_err(RedisPoolError::GetConnection)
    }

    /// Get the current pool status
    #[must_use]
    pub fn status(&self) -> deadpool_redis::Status {
        self.pool.status()
    }

    /// Check if the pool is healthy by pinging Redis
    pub async fn health_check(&self) -> RedisResult<()> {
        let mut conn = self.get().await?;
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for RedisPool {
    async fn get(&self, key: &str) -> RepoResult<Option<String>> {
        let mut conn = RedisPool::get(self).await?;
        let value: Option<String> = conn.get(key).await.map_err(RedisPoolError::from)?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> RepoResult<()> {
        let mut conn = RedisPool::get(self).await?;
        conn.set::<_, _, ()>(key, value)
            .await
            .map_err(RedisPoolError::from)?;
        Ok(())
    }

    async fn set_many(&self, entries: &[(String, String)]) -> RepoResult<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut conn = RedisPool::get(self).await?;
        conn.mset::<_, _, ()>(entries)
            .await
            .map_err(RedisPoolError::from)?;
        Ok(())
    }

    async fn set_add(&self, key: &str, members: &[String]) -> RepoResult<()> {
        if members.is_empty() {
            return Ok(());
        }
        let mut conn = RedisPool::get(self).await?;
        conn.sadd::<_, _, ()>(key, members)
            .await
            .map_err(RedisPoolError::from)?;
        Ok(())
    }

    async fn set_len(&self, key: &str) -> RepoResult<u64> {
        let mut conn = RedisPool::get(self).await?;
        let len: u64 = conn.scard(key).await.map_err(RedisPoolError::from)?;
        Ok(len)
    }

    async fn ping(&self) -> RepoResult<()> {
        Ok(self.health_check().await?)
    }
}

/// Shared Redis pool wrapped in Arc for easy cloning
pub type SharedRedisPool = Arc<RedisPool>;

/// Create a shared Redis pool
pub fn create_shared_pool(config: RedisPoolConfig) -> RedisResult<SharedRedisPool> {
    Ok(Arc::new(RedisPool::new(config)?))
}
