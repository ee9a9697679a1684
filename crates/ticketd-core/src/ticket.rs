//! Ticket values and the process-wide sequence that mints them.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Opaque ticket associated with an identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Ticket(String);

impl Ticket {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Formats a sequence number as a lowercase hexadecimal ticket.
    pub fn from_sequence(n: u64) -> Self {
        Self(format!("{n:x}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for Ticket {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Monotonic counter behind every computed ticket.
///
/// Shared by all compute calls for the life of the process. Starts at zero,
/// so the first ticket handed out is `"1"`.
#[derive(Debug, Default)]
pub struct TicketSequence {
    value: AtomicU64,
}

impl TicketSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the sequence and returns the new value.
    pub fn next(&self) -> u64 {
        self.value.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Last value handed out (zero if none).
    pub fn current(&self) -> u64 {
        self.value.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_ticket_hex_formatting() {
        assert_eq!(Ticket::from_sequence(1).as_str(), "1");
        assert_eq!(Ticket::from_sequence(10).as_str(), "a");
        assert_eq!(Ticket::from_sequence(255).as_str(), "ff");
        assert_eq!(Ticket::from_sequence(4096).to_string(), "1000");
    }

    #[test]
    fn test_ticket_serializes_as_plain_string() {
        let json = serde_json::to_string(&Ticket::new("1f")).unwrap();
        assert_eq!(json, "\"1f\"");
    }

    #[test]
    fn test_sequence_is_strictly_increasing() {
        let seq = TicketSequence::new();
        assert_eq!(seq.current(), 0);

        let mut last = 0;
        for _ in 0..100 {
            let n = seq.next();
            assert!(n > last);
            last = n;
        }
        assert_eq!(seq.current(), 100);
    }

    #[test]
    fn test_sequence_is_unique_across_threads() {
        let seq = Arc::new(TicketSequence::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let seq = Arc::clone(&seq);
                std::thread::spawn(move || (0..250).map(|_| seq.next()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            let values = handle.join().unwrap();
            // Each thread observes its own values in increasing order
            assert!(values.windows(2).all(|w| w[0] < w[1]));
            for v in values {
                assert!(seen.insert(v), "duplicate sequence value {v}");
            }
        }
        assert_eq!(seen.len(), 2000);
        assert_eq!(seq.current(), 2000);
    }
}
