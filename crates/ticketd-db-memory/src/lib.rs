//! In-memory ticket store for the ticketd resolver.
//!
//! This crate provides the local implementation of the `TicketStore` trait
//! from `ticketd-storage`. It keeps nothing across restarts.
//!
//! # Example
//!
//! ```ignore
//! use ticketd_db_memory::InMemoryStore;
//! use ticketd_storage::TicketStore;
//!
//! let mut store = InMemoryStore::new();
//! store.put("alice", "1").await?;
//! assert_eq!(store.get("alice").await?, Some("1".to_string()));
//! ```

pub mod storage;

// Re-export the TicketStore trait for convenience
pub use ticketd_storage::{StorageError, TicketStore};

pub use storage::InMemoryStore;

/// Creates a new boxed in-memory store, ready to hand to a tier.
pub fn create_memory_store() -> ticketd_storage::DynTicketStore {
    Box::new(InMemoryStore::new())
}
