//! # ticketd-storage
//!
//! Storage abstraction layer for the ticketd resolver.
//!
//! This crate defines the contract every ticket backend implements. It does not
//! contain any implementations - those live in separate crates (`ticketd-db-memory`,
//! `ticketd-db-postgres`) or in the server (the Redis shared cache).
//!
//! ## Overview
//!
//! The main trait is [`TicketStore`], a plain key/value contract:
//! - `get` returns `Ok(None)` when the identity is absent, which is not an error
//! - `put` stores or replaces the ticket for an identity
//!
//! Backends never apply timeouts or retries of their own. Admission control is
//! layered on top by the tier that wraps the store.
//!
//! ## Example
//!
//! ```ignore
//! use ticketd_storage::{StorageError, TicketStore};
//!
//! async fn lookup(store: &dyn TicketStore, user: &str) -> Result<String, StorageError> {
//!     store
//!         .get(user)
//!         .await?
//!         .ok_or_else(|| StorageError::internal(format!("no ticket for {user}")))
//! }
//! ```

mod error;
mod traits;

pub use error::{ErrorCategory, StorageError};
pub use traits::TicketStore;

/// A boxed store, as owned by a tier.
pub type DynTicketStore = Box<dyn TicketStore>;
