//! Error types for the PostgreSQL ticket store.

use sqlx_core::error::Error as SqlxError;
use ticketd_storage::StorageError;

/// Errors specific to the PostgreSQL ticket store.
#[derive(Debug, thiserror::Error)]
pub enum PostgresError {
    /// Database error (connection, query or decoding).
    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Pool error.
    #[error("Pool error: {message}")]
    Pool { message: String },
}

impl PostgresError {
    /// Creates a new configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a new pool error.
    #[must_use]
    pub fn pool(message: impl Into<String>) -> Self {
        Self::Pool {
            message: message.into(),
        }
    }
}

impl From<PostgresError> for StorageError {
    fn from(err: PostgresError) -> Self {
        match err {
            PostgresError::Database(e @ (SqlxError::ColumnDecode { .. } | SqlxError::Decode(_))) => {
                StorageError::invalid_data(e.to_string())
            }
            PostgresError::Database(e) => StorageError::connection_error(e.to_string()),
            PostgresError::Config { message } => StorageError::not_configured("postgres", message),
            PostgresError::Pool { message } => {
                StorageError::connection_error(format!("Pool error: {message}"))
            }
        }
    }
}

/// Result type alias for PostgreSQL operations.
pub type Result<T> = std::result::Result<T, PostgresError>;
