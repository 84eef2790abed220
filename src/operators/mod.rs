//! Thin operator shims over the storage core, per spec.md §4.8. Each is a
//! small adapter from the buffer pool / heap file layer onto `OpIterator`,
//! generalizing `examples/small-db-small-db/src/sequential_scan.rs`'s
//! hand-rolled scan loop into a reusable shape the rest of the operators
//! follow.

mod delete;
mod filter;
mod insert;
mod seq_scan;
mod tuple_iterator;

pub use delete::Delete;
pub use filter::Filter;
pub use insert::Insert;
pub use seq_scan::SeqScan;
pub use tuple_iterator::TupleIterator;
