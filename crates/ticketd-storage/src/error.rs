//! Storage error types for the ticket storage abstraction layer.

use std::fmt;

/// Errors that can occur during storage operations.
///
/// A missing entry is not an error; stores report it as `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backend was selected but lacks the settings it needs.
    #[error("Backend not configured: {backend}: {message}")]
    NotConfigured {
        /// Name of the backend that is missing configuration.
        backend: String,
        /// What is missing.
        message: String,
    },

    /// Failed to connect to the storage backend.
    #[error("Connection error: {message}")]
    ConnectionError {
        /// Description of the connection error.
        message: String,
    },

    /// The backend returned data that could not be interpreted as a ticket.
    #[error("Invalid data: {message}")]
    InvalidData {
        /// Description of the decoding problem.
        message: String,
    },

    /// An internal storage error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl StorageError {
    /// Creates a new `NotConfigured` error.
    #[must_use]
    pub fn not_configured(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotConfigured {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Creates a new `ConnectionError` error.
    #[must_use]
    pub fn connection_error(message: impl Into<String>) -> Self {
        Self::ConnectionError {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidData` error.
    #[must_use]
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if the backend is missing configuration.
    #[must_use]
    pub fn is_not_configured(&self) -> bool {
        matches!(self, Self::NotConfigured { .. })
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotConfigured { .. } => ErrorCategory::Configuration,
            Self::ConnectionError { .. } => ErrorCategory::Infrastructure,
            Self::InvalidData { .. } => ErrorCategory::Validation,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Categories of storage errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Backend selected without the settings it needs.
    Configuration,
    /// Infrastructure/connection error.
    Infrastructure,
    /// Undecodable data.
    Validation,
    /// Internal error.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "configuration"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Validation => write!(f, "validation"),
            Self::Internal => write!(f, "internal"),
        }
    }
}
