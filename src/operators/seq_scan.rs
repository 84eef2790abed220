//! A restartable full scan of one table.
//!
//! Generalizes `examples/small-db-small-db/src/sequential_scan.rs`'s
//! `SequentialScan`, whose `next` crosses page boundaries by bumping a raw
//! page index and re-fetching through the buffer pool; that same crossing
//! logic already lives in `heap_file::HeapFileIterator`, so this shim is
//! just the `OpIterator` adapter over it.

use crate::buffer_pool::BufferPool;
use crate::catalog::Catalog;
use crate::error::{DbError, DbResult};
use crate::heap_file::HeapFileIterator;
use crate::op_iterator::OpIterator;
use crate::page_id::TableId;
use crate::transaction_id::TransactionId;
use crate::tuple::Tuple;
use crate::tuple_desc::TupleDesc;

pub struct SeqScan<'a> {
    tid: TransactionId,
    table_id: TableId,
    buffer_pool: &'a BufferPool,
    catalog: &'a Catalog,
    tuple_desc: TupleDesc,
    inner: Option<HeapFileIterator<'a>>,
}

impl<'a> SeqScan<'a> {
    pub fn new(
        tid: TransactionId,
        table_id: TableId,
        buffer_pool: &'a BufferPool,
        catalog: &'a Catalog,
    ) -> DbResult<Self> {
        let tuple_desc = catalog.get_tuple_desc(table_id)?;
        Ok(SeqScan {
            tid,
            table_id,
            buffer_pool,
            catalog,
            tuple_desc,
            inner: None,
        })
    }
}

impl<'a> OpIterator for SeqScan<'a> {
    fn open(&mut self) -> DbResult<()> {
        let heap_file = self.catalog.get_heap_file(self.table_id)?;
        let mut iter = HeapFileIterator::new(&heap_file, self.tid, self.buffer_pool)?;
        iter.open()?;
        self.inner = Some(iter);
        Ok(())
    }

    fn has_next(&mut self) -> DbResult<bool> {
        match &mut self.inner {
            Some(iter) => iter.has_next(),
            None => Ok(false),
        }
    }

    fn next(&mut self) -> DbResult<Tuple> {
        match &mut self.inner {
            Some(iter) => iter.next(),
            None => Err(DbError::NoSuchTuple),
        }
    }

    fn rewind(&mut self) -> DbResult<()> {
        self.open()
    }

    fn close(&mut self) {
        if let Some(iter) = &mut self.inner {
            iter.close();
        }
        self.inner = None;
    }

    fn tuple_desc(&self) -> &TupleDesc {
        &self.tuple_desc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DbConfig;
    use crate::database::Database;
    use crate::field::{Field, Type};

    #[test]
    fn scans_every_inserted_tuple_then_rewinds() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig::default());
        let td = TupleDesc::unnamed(vec![Type::Int]);
        let table_id = db.add_table(dir.path().join("t.db"), td, "t").unwrap();

        let setup_tid = TransactionId::new();
        for v in [10, 20] {
            db.buffer_pool()
                .insert_tuple(setup_tid, table_id, &Tuple::new(vec![Field::Int(v)]))
                .unwrap();
        }
        db.buffer_pool().transaction_complete(setup_tid, true).unwrap();

        let tid = TransactionId::new();
        let mut scan = SeqScan::new(tid, table_id, db.buffer_pool(), db.catalog()).unwrap();
        scan.open().unwrap();
        let mut seen = Vec::new();
        while scan.has_next().unwrap() {
            seen.push(*scan.next().unwrap().field(0));
        }
        assert_eq!(seen, vec![Field::Int(10), Field::Int(20)]);

        scan.rewind().unwrap();
        assert!(scan.has_next().unwrap());
        scan.close();
        db.buffer_pool().transaction_complete(tid, true).unwrap();
    }
}
