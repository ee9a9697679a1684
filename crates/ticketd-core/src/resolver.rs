//! The resolution pipeline: cache, then durable store, then compute.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use ticketd_storage::DynTicketStore;

use crate::admission::{TierKind, TierPolicy, TierStats};
use crate::compute::ComputeTier;
use crate::error::ResolveError;
use crate::identity::Sentinel;
use crate::ticket::{Ticket, TicketSequence};
use crate::tier::StoreTier;

/// The tier a ticket was resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Cache hit; nothing written back.
    Cache,
    /// Durable store hit; written back into the cache.
    Store,
    /// Freshly computed; written into the durable store (and the cache when
    /// promotion is enabled).
    Compute,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Store => "store",
            Self::Compute => "compute",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Successful resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolved {
    pub ticket: Ticket,
    pub source: Source,
}

/// Per-tier policies and write-back behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverConfig {
    pub cache: TierPolicy,
    pub store: TierPolicy,
    pub compute: TierPolicy,
    /// Also write computed tickets into the cache, not only the durable store.
    pub promote_computed_to_cache: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            cache: TierPolicy::READ,
            store: TierPolicy::READ,
            compute: TierPolicy::COMPUTE,
            promote_computed_to_cache: true,
        }
    }
}

/// Snapshot of every tier's counters plus the ticket sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolverStats {
    pub cache: TierStats,
    pub store: TierStats,
    pub compute: TierStats,
    /// Last sequence value handed out by the compute tier.
    pub tickets_issued: u64,
}

/// Resolves tickets through the three tiers.
///
/// Created once at startup and shared (`Arc<Resolver>`) by every request.
#[derive(Debug)]
pub struct Resolver {
    cache: StoreTier,
    store: StoreTier,
    compute: ComputeTier,
    sequence: Arc<TicketSequence>,
    promote_computed_to_cache: bool,
}

impl Resolver {
    /// Builds the pipeline over the given cache and durable stores. The ticket
    /// sequence starts at zero.
    pub fn new(cache: DynTicketStore, durable: DynTicketStore, config: ResolverConfig) -> Self {
        let sequence = Arc::new(TicketSequence::new());
        Self {
            cache: StoreTier::new(TierKind::Cache, config.cache, cache),
            store: StoreTier::new(TierKind::Store, config.store, durable),
            compute: ComputeTier::new(config.compute, Arc::clone(&sequence)),
            sequence,
            promote_computed_to_cache: config.promote_computed_to_cache,
        }
    }

    pub fn cache(&self) -> &StoreTier {
        &self.cache
    }

    pub fn store(&self) -> &StoreTier {
        &self.store
    }

    pub fn compute(&self) -> &ComputeTier {
        &self.compute
    }

    pub fn sequence(&self) -> &TicketSequence {
        &self.sequence
    }

    pub fn stats(&self) -> ResolverStats {
        ResolverStats {
            cache: self.cache.stats(),
            store: self.store.stats(),
            compute: self.compute.stats(),
            tickets_issued: self.sequence.current(),
        }
    }

    /// Resolves the ticket for `identity`.
    ///
    /// Sentinel identities fail before any tier is touched. Otherwise the
    /// cache, the durable store and the compute tier are tried in order; a
    /// cache or store failure (overload or backend error) only triggers
    /// fallthrough. Write-backs are best-effort.
    ///
    /// # Errors
    ///
    /// [`ResolveError::NotFound`] for the empty identity and the not-found
    /// sentinel, [`ResolveError::InjectedFault`] for the fault sentinel and
    /// [`ResolveError::Exhausted`] when the compute tier fails.
    #[instrument(skip(self))]
    pub async fn resolve(&self, identity: &str) -> Result<Resolved, ResolveError> {
        match Sentinel::classify(identity) {
            Some(Sentinel::NotFound) => {
                return Err(ResolveError::NotFound {
                    identity: identity.to_string(),
                });
            }
            Some(Sentinel::Fault) => {
                return Err(ResolveError::InjectedFault {
                    identity: identity.to_string(),
                });
            }
            None => {}
        }

        match self.cache.read(identity).await {
            Ok(Some(ticket)) => {
                debug!(ticket = %ticket, "cache hit");
                return Ok(Resolved {
                    ticket,
                    source: Source::Cache,
                });
            }
            Ok(None) => debug!("cache miss"),
            Err(e) => info!(error = %e, "cache read failed, falling through"),
        }

        match self.store.read(identity).await {
            Ok(Some(ticket)) => {
                debug!(ticket = %ticket, "store hit");
                write_back(&self.cache, identity, &ticket).await;
                return Ok(Resolved {
                    ticket,
                    source: Source::Store,
                });
            }
            Ok(None) => debug!("store miss"),
            Err(e) => info!(error = %e, "store read failed, falling through"),
        }

        let ticket = match self.compute.generate(identity).await {
            Ok(ticket) => ticket,
            Err(e) => {
                warn!(error = %e, "compute failed");
                return Err(ResolveError::Exhausted(e));
            }
        };

        write_back(&self.store, identity, &ticket).await;
        if self.promote_computed_to_cache {
            write_back(&self.cache, identity, &ticket).await;
        }

        Ok(Resolved {
            ticket,
            source: Source::Compute,
        })
    }
}

async fn write_back(tier: &StoreTier, identity: &str, ticket: &Ticket) {
    match tier.write(identity, ticket).await {
        Ok(()) => debug!(tier = %tier.kind(), ticket = %ticket, "written back"),
        Err(e) => warn!(tier = %tier.kind(), error = %e, "write-back failed"),
    }
}

#[cfg(test)]
mod tests {
    use ticketd_db_memory::InMemoryStore;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = ResolverConfig::default();
        assert_eq!(config.cache, TierPolicy::READ);
        assert_eq!(config.store, TierPolicy::READ);
        assert_eq!(config.compute, TierPolicy::COMPUTE);
        assert!(config.promote_computed_to_cache);
    }

    #[test]
    fn test_source_serialization() {
        assert_eq!(serde_json::to_string(&Source::Store).unwrap(), "\"store\"");
        assert_eq!(Source::Compute.to_string(), "compute");
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_hit_is_written_back_to_cache() {
        let resolver = Resolver::new(
            Box::new(InMemoryStore::new()),
            Box::new(InMemoryStore::with_entries([("alice", "2a")])),
            ResolverConfig::default(),
        );

        let first = resolver.resolve("alice").await.unwrap();
        assert_eq!(first.source, Source::Store);
        assert_eq!(first.ticket.as_str(), "2a");

        let second = resolver.resolve("alice").await.unwrap();
        assert_eq!(second.source, Source::Cache);
        assert_eq!(second.ticket, first.ticket);

        // Nothing was ever computed
        assert_eq!(resolver.stats().tickets_issued, 0);
        assert_eq!(resolver.stats().compute.entered, 0);
    }
}
