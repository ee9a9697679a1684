//! Table bootstrap for the ticket store.

use sqlx_core::query::query;
use sqlx_postgres::PgPool;
use tracing::{info, instrument};

use crate::error::Result;

/// Name of the table holding one ticket per identity.
pub const TICKET_TABLE: &str = "ticket_table";

const CREATE_TICKET_TABLE: &str = "CREATE TABLE IF NOT EXISTS ticket_table (
    user_id TEXT PRIMARY KEY,
    ticket TEXT NOT NULL
)";

/// Creates the tables the store needs.
#[derive(Debug, Clone)]
pub struct SchemaManager {
    pool: PgPool,
}

impl SchemaManager {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates `ticket_table` if it does not exist yet. Idempotent.
    #[instrument(skip(self))]
    pub async fn ensure_schema(&self) -> Result<()> {
        query(CREATE_TICKET_TABLE).execute(&self.pool).await?;
        info!(table = TICKET_TABLE, "ticket table ready");
        Ok(())
    }
}
