//! Wraps a child operator, passing through only tuples a `Predicate`
//! accepts.
//!
//! No direct teacher counterpart (the teacher's query layer never got past
//! `sequential_scan.rs`); built to the same `open`/`has_next`/`next` shape
//! as the rest of `operators/`, buffering the next accepted tuple so
//! `has_next` can be called repeatedly without consuming it.

use crate::error::DbResult;
use crate::op_iterator::OpIterator;
use crate::predicate::Predicate;
use crate::tuple::Tuple;
use crate::tuple_desc::TupleDesc;

pub struct Filter<'a> {
    predicate: Predicate,
    child: Box<dyn OpIterator + 'a>,
    pending: Option<Tuple>,
}

impl<'a> Filter<'a> {
    pub fn new(predicate: Predicate, child: Box<dyn OpIterator + 'a>) -> Self {
        Filter {
            predicate,
            child,
            pending: None,
        }
    }

    fn advance(&mut self) -> DbResult<()> {
        while self.pending.is_none() && self.child.has_next()? {
            let t = self.child.next()?;
            if self.predicate.matches(&t) {
                self.pending = Some(t);
            }
        }
        Ok(())
    }
}

impl<'a> OpIterator for Filter<'a> {
    fn open(&mut self) -> DbResult<()> {
        self.child.open()?;
        self.pending = None;
        self.advance()
    }

    fn has_next(&mut self) -> DbResult<bool> {
        self.advance()?;
        Ok(self.pending.is_some())
    }

    fn next(&mut self) -> DbResult<Tuple> {
        self.advance()?;
        self.pending
            .take()
            .ok_or(crate::error::DbError::NoSuchTuple)
    }

    fn rewind(&mut self) -> DbResult<()> {
        self.child.rewind()?;
        self.pending = None;
        self.advance()
    }

    fn close(&mut self) {
        self.child.close();
        self.pending = None;
    }

    fn tuple_desc(&self) -> &TupleDesc {
        self.child.tuple_desc()
    }
}
