//! PostgreSQL implementation of the TicketStore trait.

use async_trait::async_trait;
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use sqlx_postgres::PgPool;
use tracing::{debug, instrument};

use ticketd_storage::{StorageError, TicketStore};

use crate::config::PostgresConfig;
use crate::error::PostgresError;
use crate::pool;
use crate::schema::SchemaManager;

const SELECT_TICKET: &str = "SELECT ticket FROM ticket_table WHERE user_id = $1";

const UPSERT_TICKET: &str = "INSERT INTO ticket_table (user_id, ticket) VALUES ($1, $2) \
     ON CONFLICT (user_id) DO UPDATE SET ticket = EXCLUDED.ticket";

/// PostgreSQL ticket store.
///
/// One row per identity; writes are upserts so the last writer wins.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new `PostgresStore` with the given configuration.
    ///
    /// This will:
    /// 1. Create a connection pool
    /// 2. Create `ticket_table` (if configured)
    ///
    /// # Errors
    ///
    /// Returns an error if the connection pool cannot be created
    /// or if the table cannot be created.
    pub async fn new(config: PostgresConfig) -> Result<Self, StorageError> {
        let pool = pool::create_pool(&config).await?;

        if config.run_migrations {
            SchemaManager::new(pool.clone()).ensure_schema().await?;
        }

        Ok(Self { pool })
    }
}

#[async_trait]
impl TicketStore for PostgresStore {
    #[instrument(skip(self))]
    async fn get(&self, identity: &str) -> Result<Option<String>, StorageError> {
        let row: Option<(String,)> = query_as(SELECT_TICKET)
            .bind(identity)
            .fetch_optional(&self.pool)
            .await
            .map_err(PostgresError::from)?;

        if let Some((ref ticket,)) = row {
            debug!(user = identity, ticket = %ticket, "postgres read");
        }

        Ok(row.map(|(t,)| t))
    }

    #[instrument(skip(self))]
    async fn put(&mut self, identity: &str, ticket: &str) -> Result<(), StorageError> {
        query(UPSERT_TICKET)
            .bind(identity)
            .bind(ticket)
            .execute(&self.pool)
            .await
            .map_err(PostgresError::from)?;

        debug!(user = identity, ticket, "postgres write");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
