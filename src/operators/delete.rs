//! Consumes a child operator's tuples and deletes each (by its `RecordId`)
//! via the buffer pool, yielding a single output tuple holding the count
//! deleted. Mirrors `Insert`'s shape.

use crate::buffer_pool::BufferPool;
use crate::error::{DbError, DbResult};
use crate::field::{Field, Type};
use crate::op_iterator::OpIterator;
use crate::transaction_id::TransactionId;
use crate::tuple::Tuple;
use crate::tuple_desc::TupleDesc;

pub struct Delete<'a> {
    tid: TransactionId,
    buffer_pool: &'a BufferPool,
    child: Box<dyn OpIterator + 'a>,
    tuple_desc: TupleDesc,
    result: Option<Tuple>,
    done: bool,
}

impl<'a> Delete<'a> {
    pub fn new(tid: TransactionId, buffer_pool: &'a BufferPool, child: Box<dyn OpIterator + 'a>) -> Self {
        Delete {
            tid,
            buffer_pool,
            child,
            tuple_desc: TupleDesc::unnamed(vec![Type::Int]),
            result: None,
            done: false,
        }
    }
}

impl<'a> OpIterator for Delete<'a> {
    fn open(&mut self) -> DbResult<()> {
        self.child.open()?;
        let mut count: i32 = 0;
        while self.child.has_next()? {
            let t = self.child.next()?;
            self.buffer_pool.delete_tuple(self.tid, &t)?;
            count += 1;
        }
        self.result = Some(Tuple::new(vec![Field::Int(count)]));
        self.done = false;
        Ok(())
    }

    fn has_next(&mut self) -> DbResult<bool> {
        Ok(!self.done && self.result.is_some())
    }

    fn next(&mut self) -> DbResult<Tuple> {
        if self.done {
            return Err(DbError::NoSuchTuple);
        }
        self.done = true;
        self.result.clone().ok_or(DbError::NoSuchTuple)
    }

    fn rewind(&mut self) -> DbResult<()> {
        self.child.rewind()?;
        self.open()
    }

    fn close(&mut self) {
        self.child.close();
    }

    fn tuple_desc(&self) -> &TupleDesc {
        &self.tuple_desc
    }
}
