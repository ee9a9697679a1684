use std::collections::HashMap;

use async_trait::async_trait;
use ticketd_storage::{StorageError, TicketStore};

/// In-memory ticket store backed by a plain `HashMap`.
///
/// The map carries no lock of its own. It is always owned by a tier whose
/// reader/writer lock hands out `&self` for reads and `&mut self` for writes.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    data: HashMap<String, String>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with the given entries.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            data: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Number of stored identities.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[async_trait]
impl TicketStore for InMemoryStore {
    async fn get(&self, identity: &str) -> Result<Option<String>, StorageError> {
        Ok(self.data.get(identity).cloned())
    }

    async fn put(&mut self, identity: &str, ticket: &str) -> Result<(), StorageError> {
        self.data.insert(identity.to_string(), ticket.to_string());
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
