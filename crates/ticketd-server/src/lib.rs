//! HTTP front door for the ticketd resolver.
//!
//! Wires configuration, the selected cache and durable backends, and the
//! axum router around a single shared [`ticketd_core::Resolver`].

pub mod cache;
pub mod config;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod observability;
pub mod server;

pub use config::AppConfig;
pub use observability::init_tracing;
pub use server::{AppState, ServerBuilder, TicketdServer, build_app};

use config::{CacheBackend, DurableBackend};
use ticketd_core::Resolver;
use ticketd_storage::{DynTicketStore, StorageError};

/// Creates the store behind the cache tier.
///
/// # Errors
///
/// Fails when Redis is selected but missing from the configuration or
/// unreachable.
pub async fn create_cache_store(cfg: &AppConfig) -> Result<DynTicketStore, StorageError> {
    match cfg.storage.cache {
        CacheBackend::Memory => {
            tracing::info!("Using in-memory cache tier");
            Ok(ticketd_db_memory::create_memory_store())
        }
        CacheBackend::Redis => {
            let redis = cfg.storage.redis.as_ref().ok_or_else(|| {
                StorageError::not_configured("redis", "[storage.redis] section is missing")
            })?;
            Ok(Box::new(cache::create_redis_store(redis).await?))
        }
    }
}

/// Creates the store behind the durable tier.
///
/// # Errors
///
/// Fails when PostgreSQL is selected but missing from the configuration,
/// unreachable, or its schema bootstrap fails.
pub async fn create_durable_store(cfg: &AppConfig) -> Result<DynTicketStore, StorageError> {
    match cfg.storage.durable {
        DurableBackend::Memory => {
            tracing::info!("Using in-memory durable tier");
            Ok(ticketd_db_memory::create_memory_store())
        }
        DurableBackend::Postgres => {
            let pg = cfg.storage.postgres.as_ref().ok_or_else(|| {
                StorageError::not_configured("postgres", "[storage.postgres] section is missing")
            })?;
            let store_config = pg.to_store_config();
            tracing::info!(
                url = %ticketd_db_postgres::mask_password(&store_config.url),
                pool_size = store_config.pool_size,
                "Connecting to PostgreSQL"
            );
            ticketd_db_postgres::create_postgres_store(store_config).await
        }
    }
}

/// Builds the resolver over the configured backends.
///
/// # Errors
///
/// Propagates backend construction failures.
pub async fn build_resolver(cfg: &AppConfig) -> Result<Resolver, StorageError> {
    let cache = create_cache_store(cfg).await?;
    let durable = create_durable_store(cfg).await?;
    let resolver_config = cfg.resolver_config();

    tracing::info!(
        cache = cache.backend_name(),
        durable = durable.backend_name(),
        promote_computed_to_cache = resolver_config.promote_computed_to_cache,
        "Resolver configured"
    );
    Ok(Resolver::new(cache, durable, resolver_config))
}
