//! Load-proportional admission control.
//!
//! A gate counts the requests currently inside its tier. The Nth concurrent
//! request is delayed by `N * unit_delay`; if that delay would exceed the
//! ceiling the request waits out the ceiling and is rejected instead. The
//! counter is a lock-free atomic and is independent of any data lock, so a
//! request is counted as soon as it arrives.

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::TierError;

/// Which stage of the pipeline a gate guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TierKind {
    Cache,
    Store,
    Compute,
}

impl TierKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Store => "store",
            Self::Compute => "compute",
        }
    }
}

impl fmt::Display for TierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delay/timeout policy of one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierPolicy {
    /// Delay added per request in flight.
    pub unit_delay: Duration,
    /// Longest delay accepted before the request is rejected.
    pub ceiling: Duration,
}

impl TierPolicy {
    /// Cache and durable store tiers.
    pub const READ: Self = Self::new(Duration::from_millis(200), Duration::from_millis(2000));

    /// Compute tier.
    pub const COMPUTE: Self = Self::new(Duration::from_millis(1000), Duration::from_millis(10_000));

    pub const fn new(unit_delay: Duration, ceiling: Duration) -> Self {
        Self {
            unit_delay,
            ceiling,
        }
    }

    /// Synthetic delay for a request that makes `in_flight` concurrent requests.
    pub fn delay_for(&self, in_flight: usize) -> Duration {
        let n = u32::try_from(in_flight).unwrap_or(u32::MAX);
        self.unit_delay.saturating_mul(n)
    }

    /// Whether a request at `in_flight` concurrency is rejected.
    pub fn rejects(&self, in_flight: usize) -> bool {
        self.delay_for(in_flight) > self.ceiling
    }

    /// Highest concurrency still admitted, or `usize::MAX` for a zero unit delay.
    pub fn max_admitted(&self) -> usize {
        match self.ceiling.as_nanos().checked_div(self.unit_delay.as_nanos()) {
            Some(n) => usize::try_from(n).unwrap_or(usize::MAX),
            None => usize::MAX,
        }
    }
}

/// Point-in-time counters of one gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierStats {
    pub tier: TierKind,
    /// Requests currently inside the tier.
    pub in_flight: usize,
    /// Every request that ever entered the gate.
    pub entered: u64,
    /// Requests rejected as overloaded.
    pub rejected: u64,
}

/// Concurrency counter plus policy for one tier.
#[derive(Debug)]
pub struct AdmissionGate {
    kind: TierKind,
    policy: TierPolicy,
    in_flight: AtomicUsize,
    entered: AtomicU64,
    rejected: AtomicU64,
}

impl AdmissionGate {
    pub fn new(kind: TierKind, policy: TierPolicy) -> Self {
        Self {
            kind,
            policy,
            in_flight: AtomicUsize::new(0),
            entered: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }

    pub fn kind(&self) -> TierKind {
        self.kind
    }

    pub fn policy(&self) -> TierPolicy {
        self.policy
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn stats(&self) -> TierStats {
        TierStats {
            tier: self.kind,
            in_flight: self.in_flight(),
            entered: self.entered.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }

    /// Counts a new request and computes its delay, without sleeping.
    ///
    /// The returned permit keeps the request counted until it is dropped.
    pub fn admit(&self) -> Permit<'_> {
        let in_flight = self.in_flight.fetch_add(1, Ordering::AcqRel) + 1;
        self.entered.fetch_add(1, Ordering::Relaxed);
        Permit {
            gate: self,
            in_flight,
            delay: self.policy.delay_for(in_flight),
        }
    }

    /// Admits a request and waits out its synthetic delay.
    ///
    /// Hold the returned permit for the whole tier operation.
    ///
    /// # Errors
    ///
    /// Returns [`TierError::Overloaded`] after sleeping for the ceiling when
    /// the request's delay exceeds it.
    pub async fn enter(&self) -> Result<Permit<'_>, TierError> {
        let permit = self.admit();
        let ceiling = self.policy.ceiling;

        if permit.delay > ceiling {
            warn!(
                tier = %self.kind,
                in_flight = permit.in_flight,
                delay_ms = permit.delay.as_millis() as u64,
                ceiling_ms = ceiling.as_millis() as u64,
                "tier overloaded"
            );
            tokio::time::sleep(ceiling).await;
            self.rejected.fetch_add(1, Ordering::Relaxed);
            return Err(TierError::Overloaded {
                tier: self.kind,
                in_flight: permit.in_flight,
                ceiling,
            });
        }

        debug!(
            tier = %self.kind,
            in_flight = permit.in_flight,
            delay_ms = permit.delay.as_millis() as u64,
            "tier admitted"
        );
        tokio::time::sleep(permit.delay).await;
        Ok(permit)
    }
}

/// A request counted as in flight. Dropping it decrements the counter, on
/// every path out of the tier including cancellation.
#[derive(Debug)]
pub struct Permit<'a> {
    gate: &'a AdmissionGate,
    in_flight: usize,
    delay: Duration,
}

impl Permit<'_> {
    /// Concurrency observed when this request was admitted, itself included.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.gate.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}
