//! # ticketd-core
//!
//! Resolves an opaque ticket for a user identity through three tiers:
//!
//! ```text
//! resolve(identity) → cache tier → durable tier → compute tier
//!                        ↑              ↑              │
//!                        └── write-back ┴──────────────┘
//! ```
//!
//! Every tier is admission-gated: the Nth request concurrently inside a tier
//! waits `N * unit_delay` before it touches the tier, and once that delay would
//! exceed the tier's ceiling the request waits out the ceiling and fails with
//! [`TierError::Overloaded`]. Read tiers default to 200ms/2000ms, the compute
//! tier to 1000ms/10000ms (see [`TierPolicy`]).
//!
//! Only the failure of the last tier attempted reaches the caller. Cache and
//! durable tier failures are logged and trigger fallthrough.
//!
//! ## Example
//!
//! ```ignore
//! use ticketd_core::{Resolver, ResolverConfig, Source};
//! use ticketd_db_memory::InMemoryStore;
//!
//! let resolver = Resolver::new(
//!     Box::new(InMemoryStore::new()),
//!     Box::new(InMemoryStore::new()),
//!     ResolverConfig::default(),
//! );
//!
//! let first = resolver.resolve("alice").await?;
//! assert_eq!(first.source, Source::Compute);
//! let again = resolver.resolve("alice").await?;
//! assert_eq!(again.ticket, first.ticket);
//! ```

pub mod admission;
pub mod compute;
pub mod error;
pub mod identity;
pub mod resolver;
pub mod ticket;
pub mod tier;

pub use admission::{AdmissionGate, Permit, TierKind, TierPolicy, TierStats};
pub use compute::ComputeTier;
pub use error::{ErrorKind, ResolveError, TierError};
pub use identity::{FAULT_SENTINEL, NOT_FOUND_SENTINEL, Sentinel};
pub use resolver::{Resolved, Resolver, ResolverConfig, ResolverStats, Source};
pub use ticket::{Ticket, TicketSequence};
pub use tier::{StoreOp, StoreTier};
