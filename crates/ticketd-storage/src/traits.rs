//! Storage traits for the ticket storage abstraction layer.

use async_trait::async_trait;

use crate::error::StorageError;

/// The contract every ticket backend must implement.
///
/// A store maps an identity to the ticket last written for it. Reads take
/// `&self` and writes take `&mut self` so that the owning tier's reader/writer
/// lock is what actually guards the store: shared guards for reads, an
/// exclusive guard for writes.
///
/// # Example
///
/// ```ignore
/// use ticketd_storage::TicketStore;
///
/// async fn promote(store: &mut dyn TicketStore, user: &str, ticket: &str) {
///     if let Err(e) = store.put(user, ticket).await {
///         tracing::warn!(error = %e, "write-back failed");
///     }
/// }
/// ```
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Looks up the ticket stored for `identity`.
    ///
    /// Returns `None` if the identity has no ticket.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure issues, not for missing entries.
    async fn get(&self, identity: &str) -> Result<Option<String>, StorageError>;

    /// Stores `ticket` for `identity`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write or is unreachable.
    async fn put(&mut self, identity: &str, ticket: &str) -> Result<(), StorageError>;

    /// Returns the name of this backend for logging/debugging.
    fn backend_name(&self) -> &'static str;
}
