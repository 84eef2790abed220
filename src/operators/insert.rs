//! Consumes a child operator's tuples and inserts each into a table via the
//! buffer pool, yielding a single output tuple holding the count inserted.
//!
//! Same "drain child, emit one count tuple" shape as
//! `examples/irving-peng-NU-CS339-Lab3/handin/aggregate.rs`'s `into_rows`
//! fallback for an empty, groupless aggregation.

use crate::buffer_pool::BufferPool;
use crate::error::{DbError, DbResult};
use crate::field::{Field, Type};
use crate::op_iterator::OpIterator;
use crate::page_id::TableId;
use crate::transaction_id::TransactionId;
use crate::tuple::Tuple;
use crate::tuple_desc::TupleDesc;

pub struct Insert<'a> {
    tid: TransactionId,
    table_id: TableId,
    buffer_pool: &'a BufferPool,
    child: Box<dyn OpIterator + 'a>,
    tuple_desc: TupleDesc,
    result: Option<Tuple>,
    done: bool,
}

impl<'a> Insert<'a> {
    pub fn new(
        tid: TransactionId,
        table_id: TableId,
        buffer_pool: &'a BufferPool,
        child: Box<dyn OpIterator + 'a>,
    ) -> Self {
        Insert {
            tid,
            table_id,
            buffer_pool,
            child,
            tuple_desc: TupleDesc::unnamed(vec![Type::Int]),
            result: None,
            done: false,
        }
    }
}

impl<'a> OpIterator for Insert<'a> {
    fn open(&mut self) -> DbResult<()> {
        self.child.open()?;
        let mut count: i32 = 0;
        while self.child.has_next()? {
            let t = self.child.next()?;
            self.buffer_pool
                .insert_tuple(self.tid, self.table_id, &t)?;
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
