//! Closed error taxonomy for the storage and transaction core.
//!
//! Grounded on `examples/small-db-small-db/src/error.rs`'s manual
//! `Display`/`Error` pattern, expanded from a single opaque `SimpleError`
//! struct into the closed variant set spec.md §7 asks for.

use std::fmt;
use std::io;

/// Every fallible operation in this crate returns one of these.
#[derive(Debug)]
pub enum DbError {
    /// Lock acquisition timed out, or the caller is unwinding a transaction
    /// that must be rolled back. Recoverable only by aborting the whole
    /// transaction.
    TransactionAborted,

    /// A heap page has no free slot for `insertTuple`.
    CapacityFull,

    /// The buffer pool is at capacity and every cached page is dirty.
    OutOfBufferSpace,

    /// `flushPages`/eviction found more dirty pages than the pool can hold.
    TooManyDirtyPages,

    /// An aggregator was asked for an operator it only pretends to support.
    UnsupportedAggregate,

    /// Two `TupleDesc`s that were expected to match did not.
    TupleDescMismatch,

    /// `next()` called without a preceding `true` from `has_next()`.
    NoSuchTuple,

    /// `readPage` addressed a page past the end of the file.
    PageOutOfRange,

    /// `deleteTuple` targeted a record id that does not live on the given page.
    NotOnThisPage,

    /// Catalog lookup miss.
    UnknownTable,

    /// Underlying storage failed. Fatal for the operation that triggered it.
    Io(io::Error),
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbError::TransactionAborted => write!(f, "transaction aborted"),
            DbError::CapacityFull => write!(f, "page has no free slot"),
            DbError::OutOfBufferSpace => {
                write!(f, "buffer pool is full and every page is dirty")
            }
            DbError::TooManyDirtyPages => write!(f, "too many dirty pages to flush"),
            DbError::UnsupportedAggregate => write!(f, "unsupported aggregate operator"),
            DbError::TupleDescMismatch => write!(f, "tuple descriptor mismatch"),
            DbError::NoSuchTuple => write!(f, "no such tuple"),
            DbError::PageOutOfRange => write!(f, "page offset is out of file range"),
            DbError::NotOnThisPage => write!(f, "record id does not belong to this page"),
            DbError::UnknownTable => write!(f, "unknown table id"),
            DbError::Io(e) => write!(f, "storage io error: {}", e),
        }
    }
}

impl std::error::Error for DbError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DbError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for DbError {
    fn from(e: io::Error) -> Self {
        DbError::Io(e)
    }
}

pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn io_error_chains_through_source() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing file");
        let db_err: DbError = io_err.into();
        assert!(db_err.source().is_some());
        assert!(db_err.to_string().contains("missing file"));
    }

    #[test]
    fn non_io_variants_have_no_source() {
        assert!(DbError::CapacityFull.source().is_none());
        assert!(DbError::TransactionAborted.source().is_none());
    }
}
