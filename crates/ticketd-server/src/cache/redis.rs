//! Redis-backed cache tier.
//!
//! Tickets are stored as plain strings under `{key_prefix}{identity}`, so
//! several server instances pointed at the same Redis share one cache.

use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::Pool;
use redis::AsyncCommands;
use ticketd_storage::{StorageError, TicketStore};

use crate::config::RedisConfig;

/// Ticket store over a pooled Redis connection.
#[derive(Clone)]
pub struct RedisStore {
    pool: Pool,
    key_prefix: String,
    ttl_secs: Option<u64>,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("key_prefix", &self.key_prefix)
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl RedisStore {
    pub fn new(pool: Pool, key_prefix: impl Into<String>, ttl_secs: Option<u64>) -> Self {
        Self {
            pool,
            key_prefix: key_prefix.into(),
            ttl_secs,
        }
    }

    /// Redis key for an identity.
    pub fn key(&self, identity: &str) -> String {
        format!("{}{}", self.key_prefix, identity)
    }

    async fn connection(&self) -> Result<deadpool_redis::Connection, StorageError> {
        self.pool
            .get()
            .await
            .map_err(|e| StorageError::connection_error(format!("redis pool: {e}")))
    }
}

fn map_redis_error(e: redis::RedisError) -> StorageError {
    if e.kind() == redis::ErrorKind::TypeError {
        StorageError::invalid_data(format!("redis: {e}"))
    } else {
        StorageError::connection_error(format!("redis: {e}"))
    }
}

#[async_trait]
impl TicketStore for RedisStore {
    async fn get(&self, identity: &str) -> Result<Option<String>, StorageError> {
        let mut conn = self.connection().await?;
        conn.get::<_, Option<String>>(self.key(identity))
            .await
            .map_err(map_redis_error)
    }

    async fn put(&mut self, identity: &str, ticket: &str) -> Result<(), StorageError> {
        let key = self.key(identity);
        let mut conn = self.connection().await?;
        match self.ttl_secs {
            Some(ttl) => conn.set_ex::<_, _, ()>(key, ticket, ttl).await,
            None => conn.set::<_, _, ()>(key, ticket).await,
        }
        .map_err(map_redis_error)
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

/// Builds the Redis pool and checks that a connection can be obtained
/// within `timeout_ms`.
///
/// The pool itself carries no timeouts; only the startup probe is bounded.
///
/// # Errors
///
/// Returns [`StorageError::NotConfigured`] when the pool cannot be created
/// and [`StorageError::ConnectionError`] when Redis is unreachable.
pub async fn create_redis_store(config: &RedisConfig) -> Result<RedisStore, StorageError> {
    tracing::info!(url = %config.url, "Connecting to Redis");

    let pool = build_pool(config)?;
    let probe_timeout = Duration::from_millis(config.timeout_ms);
    match tokio::time::timeout(probe_timeout, pool.get()).await {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => {
            return Err(StorageError::connection_error(format!(
                "redis unreachable: {e}"
            )));
        }
        Err(_) => {
            return Err(StorageError::connection_error(format!(
                "redis unreachable: no connection within {}ms",
                config.timeout_ms
            )));
        }
    }

    tracing::info!("Connected to Redis");
    Ok(RedisStore::new(
        pool,
        config.key_prefix.clone(),
        config.ttl_secs,
    ))
}

fn build_pool(config: &RedisConfig) -> Result<Pool, StorageError> {
    let mut redis_config = deadpool_redis::Config::from_url(&config.url);
    redis_config.pool = Some(deadpool_redis::PoolConfig::new(config.pool_size));
    redis_config
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .map_err(|e| StorageError::not_configured("redis", e.to_string()))
}
