//! The operator trait every operator shim implements.
//!
//! Grounded on `examples/small-db-small-db/src/sequential_scan.rs`'s
//! `SequentialScan`, whose `next`/`rewind` hand-roll exactly this protocol
//! against a plain `std::iter::Iterator` — here made explicit as a trait so
//! `Filter`/`Insert`/`Delete` can all compose over the same `open`/
//! `has_next`/`next`/`rewind`/`close` lifecycle spec.md §4.8 describes.

use crate::error::DbResult;
use crate::tuple::Tuple;
use crate::tuple_desc::TupleDesc;

pub trait OpIterator {
    fn open(&mut self) -> DbResult<()>;
    fn has_next(&mut self) -> DbResult<bool>;
    fn next(&mut self) -> DbResult<Tuple>;
    fn rewind(&mut self) -> DbResult<()>;
    fn close(&mut self);
    fn tuple_desc(&self) -> &TupleDesc;
}
