// =====================================================================================
// REDIS-BACKED PING CACHE
// =====================================================================================

use async_trait::async_trait;
use deadpool_redis::{Config, Connection, Pool, Runtime};
use redis::AsyncCommands;
use tracing::{debug, info, warn};

use crate::error::PingError;
use crate::models::{ConfigurationId, PingSnapshot};
use crate::services::cache::PingCache;

/// Reads snapshots written as JSON strings by the refill process under `<prefix><configuration id>`.
pub struct RedisPingCache {
    pool: Pool,
    key_prefix: String,
}

impl RedisPingCache {
    pub async fn connect(redis_url: &str, key_prefix: &str) -> Result<Self, PingError> {
        let cfg = Config::from_url(redis_url);
        let pool = cfg.create_pool(Some(Runtime::Tokio1)).map_err(|e| {
            PingError::CacheUnavailable(format!("Failed to create Redis pool: {}", e))
        })?;

        let cache = Self::from_pool(pool, key_prefix);

        // Test connection
        let mut conn = cache.connection().await?;
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| PingError::CacheUnavailable(format!("Redis PING failed: {}", e)))?;

        info!("Redis ping cache initialized with key prefix '{}'", key_prefix);
        Ok(cache)
    }

    pub fn from_pool(pool: Pool, key_prefix: &str) -> Self {
        Self {
            pool,
            key_prefix: key_prefix.to_string(),
        }
    }

    pub fn key_for(&self, id: &ConfigurationId) -> String {
        format!("{}{}", self.key_prefix, id)
    }

    async fn connection(&self) -> Result<Connection, PingError> {
        self.pool.get().await.map_err(|e| {
            PingError::CacheUnavailable(format!("Failed to connect to Redis: {}", e))
        })
    }
}

#[async_trait]
impl PingCache for RedisPingCache {
    async fn lookup(&self, id: &ConfigurationId) -> Result<Option<PingSnapshot>, PingError> {
        let cache_error = |message: String| PingError::Cache {
            configuration_id: id.clone(),
            message,
        };

        let mut conn = self.connection().await.map_err(|e| cache_error(e.to_string()))?;
        let key = self.key_for(id);
        let raw: Option<String> = conn
            .get(&key)
            .await
            .map_err(|e| cache_error(e.to_string()))?;

        match raw {
            Some(data) => {
                let snapshot: PingSnapshot = serde_json::from_str(&data).map_err(|e| {
                    warn!("Discarding undecodable ping snapshot at {}: {}", key, e);
                    cache_error(format!("invalid snapshot: {}", e))
                })?;
                debug!("Ping cache hit for {}", key);
                Ok(Some(snapshot))
            }
            None => Ok(None),
        }
    }
}
