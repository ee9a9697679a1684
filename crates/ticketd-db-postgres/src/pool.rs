//! Connection pool management for the PostgreSQL ticket store.

use sqlx_core::pool::PoolOptions;
use sqlx_postgres::{PgPool, Postgres};
use tracing::{debug, info, instrument};

use crate::config::PostgresConfig;
use crate::error::{PostgresError, Result};

/// Opens the connection pool described by `config`.
#[instrument(skip(config), fields(url = %mask_password(&config.url)))]
pub async fn create_pool(config: &PostgresConfig) -> Result<PgPool> {
    if config.url.is_empty() {
        return Err(PostgresError::config("connection url is empty"));
    }
    if config.pool_size == 0 {
        return Err(PostgresError::config("pool_size must be > 0"));
    }

    let min_connections = config.effective_min_connections();
    let max_lifetime = config.max_lifetime();
    info!(
        pool_size = config.pool_size,
        min_connections,
        connect_timeout_ms = config.connect_timeout_ms,
        max_lifetime_secs = max_lifetime.as_secs(),
        "Creating PostgreSQL connection pool"
    );

    let pool = PoolOptions::<Postgres>::new()
        .max_connections(config.pool_size)
        .min_connections(min_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(config.idle_timeout())
        .max_lifetime(max_lifetime)
        .test_before_acquire(false)
        .connect(&config.url)
        .await?;

    debug!("PostgreSQL connection pool created");
    Ok(pool)
}

/// Masks the password in a database URL for logging.
pub fn mask_password(url: &str) -> String {
    if let Some(at_pos) = url.find('@')
        && let Some(colon_pos) = url[..at_pos].rfind(':')
    {
        let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
        if colon_pos > scheme_end {
            return format!("{}:****{}", &url[..colon_pos], &url[at_pos..]);
        }
    }
    url.to_string()
}
