//! Transaction identity.
//!
//! Grounded on `examples/small-db-small-db/src/transaction.rs`'s
//! `Transaction` (monotonic `AtomicU64` counter, `Eq + Hash + Clone + Copy`),
//! trimmed to the identity-only role spec.md §3 describes ("globally unique,
//! monotonically assigned integer with value equality") — logging,
//! commit/abort, and lock release live on `BufferPool`/`LockManager` in this
//! design rather than on the id type itself.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Eq, PartialEq, Hash, Clone, Copy)]
pub struct TransactionId {
    id: u64,
}

impl TransactionId {
    pub fn new() -> Self {
        TransactionId {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tx_{}", self.id)
    }
}

impl fmt::Debug for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonically_unique() {
        let a = TransactionId::new();
        let b = TransactionId::new();
        assert_ne!(a, b);
        assert!(b.id() > a.id());
    }
}
