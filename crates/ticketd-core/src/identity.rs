//! Reserved identities used for fault injection.

/// Identity that always resolves to not-found.
pub const NOT_FOUND_SENTINEL: &str = "errorc";

/// Identity that always resolves to an internal fault.
pub const FAULT_SENTINEL: &str = "errors";

/// Outcome forced by a reserved identity, decided before any tier is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentinel {
    /// Empty identity or [`NOT_FOUND_SENTINEL`].
    NotFound,
    /// [`FAULT_SENTINEL`].
    Fault,
}

impl Sentinel {
    /// Classifies `identity`, returning `None` for ordinary identities.
    pub fn classify(identity: &str) -> Option<Self> {
        match identity {
            "" | NOT_FOUND_SENTINEL => Some(Self::NotFound),
            FAULT_SENTINEL => Some(Self::Fault),
            _ => None,
        }
    }
}
