//! Error types for tiers and the resolution pipeline.

use std::time::Duration;

use ticketd_storage::StorageError;

use crate::admission::TierKind;

/// Failure of a single tier step.
#[derive(Debug, thiserror::Error)]
pub enum TierError {
    /// The tier's synthetic delay exceeded its ceiling.
    #[error(
        "{tier} tier overloaded: {in_flight} in flight, timed out after {}ms",
        .ceiling.as_millis()
    )]
    Overloaded {
        tier: TierKind,
        in_flight: usize,
        ceiling: Duration,
    },

    /// The wrapped backend failed.
    #[error("{tier} tier storage error: {source}")]
    Storage {
        tier: TierKind,
        #[source]
        source: StorageError,
    },
}

impl TierError {
    /// Returns `true` if the tier rejected the request as overloaded.
    #[must_use]
    pub fn is_overloaded(&self) -> bool {
        matches!(self, Self::Overloaded { .. })
    }

    /// The tier that failed.
    #[must_use]
    pub fn tier(&self) -> TierKind {
        match self {
            Self::Overloaded { tier, .. } | Self::Storage { tier, .. } => *tier,
        }
    }
}

/// Caller-visible classification of a failed resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InternalFault,
}

/// Failed resolution. Always maps to a 404 or a 500.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// Empty identity or the not-found sentinel.
    #[error("no ticket for identity {identity:?}")]
    NotFound { identity: String },

    /// The fault-injection sentinel.
    #[error("injected fault for identity {identity:?}")]
    InjectedFault { identity: String },

    /// Every tier was tried and the compute tier failed.
    #[error("ticket resolution failed: {0}")]
    Exhausted(#[source] TierError),
}

impl ResolveError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InjectedFault { .. } | Self::Exhausted(_) => ErrorKind::InternalFault,
        }
    }

    /// HTTP status code for this failure.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::NotFound => 404,
            ErrorKind::InternalFault => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_error_display() {
        let err = TierError::Overloaded {
            tier: TierKind::Store,
            in_flight: 11,
            ceiling: Duration::from_millis(2000),
        };
        assert_eq!(
            err.to_string(),
            "store tier overloaded: 11 in flight, timed out after 2000ms"
        );
        assert!(err.is_overloaded());
        assert_eq!(err.tier(), TierKind::Store);

        let err = TierError::Storage {
            tier: TierKind::Cache,
            source: StorageError::connection_error("refused"),
        };
        assert_eq!(
            err.to_string(),
            "cache tier storage error: Connection error: refused"
        );
        assert!(!err.is_overloaded());
    }

    #[test]
    fn test_status_codes() {
        let not_found = ResolveError::NotFound {
            identity: String::new(),
        };
        assert_eq!(not_found.status_code(), 404);
        assert_eq!(not_found.kind(), ErrorKind::NotFound);

        let injected = ResolveError::InjectedFault {
            identity: "errors".into(),
        };
        assert_eq!(injected.status_code(), 500);

        let exhausted = ResolveError::Exhausted(TierError::Overloaded {
            tier: TierKind::Compute,
            in_flight: 11,
            ceiling: Duration::from_secs(10),
        });
        assert_eq!(exhausted.status_code(), 500);
        assert_eq!(exhausted.kind(), ErrorKind::InternalFault);
        assert!(std::error::Error::source(&exhausted).is_some());
    }
}
