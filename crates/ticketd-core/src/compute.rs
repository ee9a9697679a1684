//! Last-resort tier that mints fresh tickets.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::admission::{AdmissionGate, TierKind, TierPolicy, TierStats};
use crate::error::TierError;
use crate::ticket::{Ticket, TicketSequence};

/// Generates tickets from the shared [`TicketSequence`] under the same
/// admission policy as the store tiers. Has no backend and no data lock.
#[derive(Debug)]
pub struct ComputeTier {
    gate: AdmissionGate,
    sequence: Arc<TicketSequence>,
}

impl ComputeTier {
    pub fn new(policy: TierPolicy, sequence: Arc<TicketSequence>) -> Self {
        Self {
            gate: AdmissionGate::new(TierKind::Compute, policy),
            sequence,
        }
    }

    pub fn gate(&self) -> &AdmissionGate {
        &self.gate
    }

    pub fn stats(&self) -> TierStats {
        self.gate.stats()
    }

    /// Mints the next ticket. The identity only labels the log line: tickets
    /// are unique across all identities.
    ///
    /// # Errors
    ///
    /// Only [`TierError::Overloaded`].
    #[instrument(level = "debug", skip(self))]
    pub async fn generate(&self, identity: &str) -> Result<Ticket, TierError> {
        let _permit = self.gate.enter().await?;
        let n = self.sequence.next();
        let ticket = Ticket::from_sequence(n);
        debug!(sequence = n, ticket = %ticket, "ticket computed");
        Ok(ticket)
    }
}
