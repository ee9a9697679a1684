//! Admission-gated tier over a ticket store.

use tokio::sync::RwLock;
use tracing::instrument;

use ticketd_storage::DynTicketStore;

use crate::admission::{AdmissionGate, TierKind, TierPolicy, TierStats};
use crate::error::TierError;
use crate::ticket::Ticket;

/// Operation run against a tier's store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    Read,
    Write(Ticket),
}

/// A cache or durable tier: an admission gate in front of a store, plus the
/// reader/writer lock that guards the store.
///
/// Reads share the lock; writes hold it exclusively. The gate's counter is
/// bumped before the lock is requested, so waiting on the lock counts as load.
pub struct StoreTier {
    gate: AdmissionGate,
    store: RwLock<DynTicketStore>,
    backend: &'static str,
}

impl std::fmt::Debug for StoreTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreTier")
            .field("gate", &self.gate)
            .field("backend", &self.backend)
            .finish_non_exhaustive()
    }
}

impl StoreTier {
    pub fn new(kind: TierKind, policy: TierPolicy, store: DynTicketStore) -> Self {
        let backend = store.backend_name();
        Self {
            gate: AdmissionGate::new(kind, policy),
            store: RwLock::new(store),
            backend,
        }
    }

    pub fn kind(&self) -> TierKind {
        self.gate.kind()
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend
    }

    pub fn gate(&self) -> &AdmissionGate {
        &self.gate
    }

    pub fn stats(&self) -> TierStats {
        self.gate.stats()
    }

    /// Runs `op` for `identity` under the tier's admission policy.
    ///
    /// Reads return `Ok(None)` when the store has no ticket; writes always
    /// return `Ok(None)` on success.
    ///
    /// # Errors
    ///
    /// [`TierError::Overloaded`] when admission is refused,
    /// [`TierError::Storage`] when the store fails.
    #[instrument(level = "debug", skip(self, op), fields(tier = %self.kind(), backend = self.backend))]
    pub async fn execute(&self, identity: &str, op: StoreOp) -> Result<Option<Ticket>, TierError> {
        let _permit = self.gate.enter().await?;
        let tier = self.kind();

        match op {
            StoreOp::Read => {
                let store = self.store.read().await;
                let found = store
                    .get(identity)
                    .await
                    .map_err(|source| TierError::Storage { tier, source })?;
                Ok(found.map(Ticket::from))
            }
            StoreOp::Write(ticket) => {
                let mut store = self.store.write().await;
                store
                    .put(identity, ticket.as_str())
                    .await
                    .map_err(|source| TierError::Storage { tier, source })?;
                Ok(None)
            }
        }
    }

    pub async fn read(&self, identity: &str) -> Result<Option<Ticket>, TierError> {
        self.execute(identity, StoreOp::Read).await
    }

    pub async fn write(&self, identity: &str, ticket: &Ticket) -> Result<(), TierError> {
        self.execute(identity, StoreOp::Write(ticket.clone()))
            .await
            .map(|_| ())
    }
}
