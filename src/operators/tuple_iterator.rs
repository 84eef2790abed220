//! An `OpIterator` over an in-memory `Vec<Tuple>`, used in tests to stand in
//! for a scan without needing an on-disk heap file.

use crate::error::{DbError, DbResult};
use crate::op_iterator::OpIterator;
use crate::tuple::Tuple;
use crate::tuple_desc::TupleDesc;

pub struct TupleIterator {
    tuple_desc: TupleDesc,
    tuples: Vec<Tuple>,
    index: usize,
    opened: bool,
}

impl TupleIterator {
    pub fn new(tuple_desc: TupleDesc, tuples: Vec<Tuple>) -> Self {
        TupleIterator {
            tuple_desc,
            tuples,
            index: 0,
            opened: false,
        }
    }
}

impl OpIterator for TupleIterator {
    fn open(&mut self) -> DbResult<()> {
        self.opened = true;
        self.index = 0;
        Ok(())
    }

    fn has_next(&mut self) -> DbResult<bool> {
        Ok(self.opened && self.index < self.tuples.len())
    }

    fn next(&mut self) -> DbResult<Tuple> {
        if !self.has_next()? {
            return Err(DbError::NoSuchTuple);
        }
        let t = self.tuples[self.index].clone();
        self.index += 1;
        Ok(t)
    }

    fn rewind(&mut self) -> DbResult<()> {
        self.index = 0;
        Ok(())
    }

    fn close(&mut self) {
        self.opened = false;
    }

    fn tuple_desc(&self) -> &TupleDesc {
        &self.tuple_desc
    }
}
