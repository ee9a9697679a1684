//! Test stores shared by the pipeline integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use ticketd_db_memory::InMemoryStore;
use ticketd_storage::{StorageError, TicketStore};

/// Calls observed by a [`CountingStore`].
#[derive(Debug, Default)]
pub struct Calls {
    pub gets: AtomicUsize,
    pub puts: AtomicUsize,
}

impl Calls {
    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.gets() + self.puts()
    }
}

/// In-memory store that records how often it is called.
#[derive(Debug)]
pub struct CountingStore {
    inner: InMemoryStore,
    calls: Arc<Calls>,
}

impl CountingStore {
    pub fn new() -> (Self, Arc<Calls>) {
        Self::wrap(InMemoryStore::new())
    }

    pub fn wrap(inner: InMemoryStore) -> (Self, Arc<Calls>) {
        let calls = Arc::new(Calls::default());
        (
            Self {
                inner,
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

#[async_trait]
impl TicketStore for CountingStore {
    async fn get(&self, identity: &str) -> Result<Option<String>, StorageError> {
        self.calls.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(identity).await
    }

    async fn put(&mut self, identity: &str, ticket: &str) -> Result<(), StorageError> {
        self.calls.puts.fetch_add(1, Ordering::SeqCst);
        self.inner.put(identity, ticket).await
    }

    fn backend_name(&self) -> &'static str {
        "counting"
    }
}

/// Store whose every call fails with a connection error.
#[derive(Debug, Default)]
pub struct UnreachableStore;

#[async_trait]
impl TicketStore for UnreachableStore {
    async fn get(&self, _identity: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::connection_error("connection refused"))
    }

    async fn put(&mut self, _identity: &str, _ticket: &str) -> Result<(), StorageError> {
        Err(StorageError::connection_error("connection refused"))
    }

    fn backend_name(&self) -> &'static str {
        "unreachable"
    }
}

/// Asserts a paused-clock elapsed time, allowing for the timer's millisecond
/// rounding on each sleep.
#[track_caller]
pub fn assert_elapsed(start: tokio::time::Instant, expected: std::time::Duration) {
    let elapsed = start.elapsed();
    let slack = std::time::Duration::from_millis(5);
    assert!(
        elapsed >= expected && elapsed <= expected + slack,
        "elapsed {elapsed:?}, expected {expected:?}"
    );
}
