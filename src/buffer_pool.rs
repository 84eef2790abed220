//! The buffer pool: bounded page cache, lock acquisition, and the
//! NO-STEAL/FORCE transaction boundary.
//!
//! Grounded on `examples/small-db-small-db/src/page_cache.rs`'s `PageCache`
//! (a `ConcurrentHashMap<PageID, Pod<Page>>` behind a capacity check, with
//! `get_page` acquiring the lock via `ConcurrentStatus` before consulting the
//! cache) and `concurrent_status.rs`'s `transaction_complete`. The teacher
//! evicts with STEAL semantics (picks any page and writes it back even if
//! dirty); spec.md §4.4 is explicit about NO-STEAL, so eviction here only
//! ever picks a clean page and returns `OutOfBufferSpace`/`TooManyDirtyPages`
//! when none exists.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use log::{debug, trace};

use crate::catalog::Catalog;
use crate::error::{DbError, DbResult};
use crate::heap_page::HeapPage;
use crate::lock_manager::{LockKind, LockManager};
use crate::page_id::PageId;
use crate::permissions::Permissions;
use crate::transaction_id::TransactionId;
use crate::types::Pod;

/// Owns a handle to the `Catalog` rather than a back-pointer from `HeapFile`,
/// which is how spec.md §9 resolves the Buffer Pool / Heap File cycle:
/// pages are looked up by `tableId` through the catalog instead of each
/// `HeapFile` knowing its own pool.
pub struct BufferPool {
    max_pages: usize,
    pages: RwLock<HashMap<PageId, Pod<HeapPage>>>,
    lock_manager: LockManager,
    catalog: Arc<Catalog>,
}

impl BufferPool {
    pub fn new(max_pages: usize, lock_timeout_ceiling: Duration, catalog: Arc<Catalog>) -> Self {
        BufferPool {
            max_pages,
            pages: RwLock::new(HashMap::new()),
            lock_manager: LockManager::new(lock_timeout_ceiling),
            catalog,
        }
    }

    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    /// Acquires the appropriate lock, then returns the cached page, loading
    /// it from the catalog's heap file on a cache miss (evicting a clean
    /// page first if the pool is at capacity).
    pub fn get_page(
        &self,
        tid: TransactionId,
        pid: PageId,
        perm: Permissions,
    ) -> DbResult<Pod<HeapPage>> {
        self.lock_manager.acquire(tid, pid, perm.to_lock_kind())?;

        if let Some(page) = self.pages.read().unwrap().get(&pid) {
            return Ok(Arc::clone(page));
        }

        // Load outside any buffer-pool lock: disk I/O must never happen
        // inside a critical section. A racing miss on the same pid may load
        // twice; the write-lock check below makes the first insert win.
        trace!("cache miss on {:?}, reading from disk", pid);
        let heap_file = self.catalog.get_heap_file(pid.table_id)?;
        let page = heap_file.read_page(pid.page_number)?;
        let pod = Arc::new(RwLock::new(page));

        let mut pages = self.pages.write().unwrap();
        if let Some(existing) = pages.get(&pid) {
            return Ok(Arc::clone(existing));
        }
        if pages.len() >= self.max_pages {
            self.evict_one(&mut pages)?;
        }
        pages.insert(pid, Arc::clone(&pod));
        Ok(pod)
    }

    /// NO-STEAL eviction: the first clean page found is dropped from the
    /// cache (never written back, since it is clean by definition). The
    /// teacher's HashMap iteration order is unspecified, which already gives
    /// the "pick at random" character spec.md §9 settles for.
    fn evict_one(&self, pages: &mut HashMap<PageId, Pod<HeapPage>>) -> DbResult<()> {
        let victim = pages
            .iter()
            .find(|(_, page)| !page.read().unwrap().is_dirty())
            .map(|(pid, _)| *pid);

        match victim {
            Some(pid) => {
                pages.remove(&pid);
                debug!("evicted clean page {:?}", pid);
                Ok(())
            }
            None => Err(DbError::OutOfBufferSpace),
        }
    }

    /// Applies `mutate` to the page the tuple's own `RecordId` fell on
    /// (insert picks the page; delete/insert both stamp it dirty). Kept
    /// separate from `HeapFile` so the pool, not the file, owns dirty-page
    /// bookkeeping.
    pub fn insert_tuple(
        &self,
        tid: TransactionId,
        table_id: crate::page_id::TableId,
        t: &crate::tuple::Tuple,
    ) -> DbResult<()> {
        let heap_file = self.catalog.get_heap_file(table_id)?;
        heap_file.insert_tuple(tid, t, self)?;
        Ok(())
    }

    pub fn delete_tuple(&self, tid: TransactionId, t: &crate::tuple::Tuple) -> DbResult<()> {
        let rid = t.record_id().ok_or(DbError::NotOnThisPage)?;
        let heap_file = self.catalog.get_heap_file(rid.page_id.table_id)?;
        heap_file.delete_tuple(tid, t, self)?;
        Ok(())
    }

    /// Releases a single page early. A deliberate escape hatch from strict
    /// 2PL (spec.md §9 resolves this as intentional, not an oversight) —
    /// callers that use it accept the isolation consequences themselves.
    pub fn release_page(&self, tid: TransactionId, pid: PageId) {
        self.lock_manager.release(tid, pid);
    }

    pub fn holds_lock(&self, tid: TransactionId, pid: PageId) -> bool {
        self.lock_manager.holds_lock(tid, pid)
    }

    /// FORCE on commit: every page `tid` dirtied is flushed to disk, its
    /// before-image reset, and its dirty mark cleared before any lock is
    /// released. On abort, each such page is replaced in the cache by its
    /// before-image instead. Either way every lock `tid` holds is released
    /// at the end, which is the only point at which 2PL lets them go.
    pub fn transaction_complete(&self, tid: TransactionId, commit: bool) -> DbResult<()> {
        debug!("{} completing, commit={}", tid, commit);
        let held = self.lock_manager.held_pages(tid);

        for pid in &held {
            let pod = {
                let pages = self.pages.read().unwrap();
                pages.get(pid).cloned()
            };
            let pod = match pod {
                Some(p) => p,
                None => continue,
            };

            let mut page = pod.write().unwrap();
            if page.dirtied_by() != Some(tid) {
                continue;
            }

            if commit {
                let heap_file = self.catalog.get_heap_file(pid.table_id)?;
                heap_file.write_page(&page)?;
                page.set_before_image();
                page.clear_dirty();
                debug!("flushed {:?} on commit", pid);
            } else {
                let restored = page.before_image()?;
                *page = restored;
                debug!("discarded {:?} on abort", pid);
            }
        }

        self.lock_manager.release_all(tid);
        Ok(())
    }

    /// Writes every dirty page in the cache to disk and clears their dirty
    /// marks, regardless of which transaction owns them. Used for an
    /// explicit, whole-pool checkpoint outside the per-transaction path.
    pub fn flush_all_pages(&self) -> DbResult<()> {
        let pages = self.pages.read().unwrap();
        for (pid, pod) in pages.iter() {
            let mut page = pod.write().unwrap();
            if page.is_dirty() {
                let heap_file = self.catalog.get_heap_file(pid.table_id)?;
                heap_file.write_page(&page)?;
                page.set_before_image();
                page.clear_dirty();
            }
        }
        Ok(())
    }

    /// Flushes one specific page, if cached and dirty.
    pub fn flush_page(&self, pid: PageId) -> DbResult<()> {
        let pages = self.pages.read().unwrap();
        if let Some(pod) = pages.get(&pid) {
            let mut page = pod.write().unwrap();
            if page.is_dirty() {
                let heap_file = self.catalog.get_heap_file(pid.table_id)?;
                heap_file.write_page(&page)?;
                page.set_before_image();
                page.clear_dirty();
            }
        }
        Ok(())
    }

    /// Drops a page from the cache without writing it back, discarding any
    /// unflushed changes.
    pub fn discard_page(&self, pid: PageId) {
        self.pages.write().unwrap().remove(&pid);
    }

    #[cfg(test)]
    pub fn cached_page_count(&self) -> usize {
        self.pages.read().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DbConfig;
    use crate::database::Database;
    use crate::field::{Field, Type};
    use crate::tuple::Tuple;
    use crate::tuple_desc::TupleDesc;
    use std::time::Duration;

    fn db_with(max_pages: usize, page_size: usize) -> Database {
        Database::new(
            DbConfig::default()
                .with_max_pages(max_pages)
                .with_page_size(page_size)
                .with_lock_timeout_ceiling(Duration::from_millis(200)),
        )
    }

    #[test]
    fn cache_never_exceeds_capacity() {
        let dir = tempfile::tempdir().unwrap();
        let db = db_with(2, 128);
        let td = TupleDesc::unnamed(vec![Type::Int]);
        let table_id = db
            .add_table(dir.path().join("t.db"), td, "t")
            .unwrap();

        let tid = TransactionId::new();
        // insert enough tuples to span 3+ pages at page_size=128
        for i in 0..60 {
            db.buffer_pool()
                .insert_tuple(tid, table_id, &Tuple::new(vec![Field::Int(i)]))
                .unwrap();
            assert!(db.buffer_pool().cached_page_count() <= 2);
        }
        db.buffer_pool().transaction_complete(tid, true).unwrap();
    }

    #[test]
    fn out_of_buffer_space_when_every_cached_page_is_dirty() {
        let dir = tempfile::tempdir().unwrap();
        let db = db_with(1, 4096);
        let td = TupleDesc::unnamed(vec![Type::Int]);
        let t1 = db.add_table(dir.path().join("a.db"), td.clone(), "a").unwrap();
        let t2 = db.add_table(dir.path().join("b.db"), td, "b").unwrap();

        let tid = TransactionId::new();
        db.buffer_pool()
            .insert_tuple(tid, t1, &Tuple::new(vec![Field::Int(1)]))
            .unwrap();
        // the pool holds 1 dirty page at capacity; fetching a second table's
        // page has nothing clean to evict.
        let err = db.buffer_pool().insert_tuple(tid, t2, &Tuple::new(vec![Field::Int(2)]));
        assert!(matches!(err, Err(DbError::OutOfBufferSpace)));
    }

    #[test]
    fn commit_makes_inserts_visible_to_a_fresh_transaction() {
        let dir = tempfile::tempdir().unwrap();
        let db = db_with(10, 4096);
        let td = TupleDesc::unnamed(vec![Type::Int]);
        let table_id = db.add_table(dir.path().join("t.db"), td, "t").unwrap();

        let tid = TransactionId::new();
        db.buffer_pool()
            .insert_tuple(tid, table_id, &Tuple::new(vec![Field::Int(42)]))
            .unwrap();
        db.buffer_pool().transaction_complete(tid, true).unwrap();

        let heap_file = db.catalog().get_heap_file(table_id).unwrap();
        let tid2 = TransactionId::new();
        let mut scan = crate::heap_file::HeapFileIterator::new(&heap_file, tid2, db.buffer_pool()).unwrap();
        scan.open().unwrap();
        assert!(scan.has_next().unwrap());
        assert_eq!(*scan.next().unwrap().field(0), Field::Int(42));
        assert!(!scan.has_next().unwrap());
        db.buffer_pool().transaction_complete(tid2, true).unwrap();
    }

    #[test]
    fn abort_hides_uncommitted_inserts() {
        let dir = tempfile::tempdir().unwrap();
        let db = db_with(10, 4096);
        let td = TupleDesc::unnamed(vec![Type::Int]);
        let table_id = db.add_table(dir.path().join("t.db"), td, "t").unwrap();

        let tid = TransactionId::new();
        db.buffer_pool()
            .insert_tuple(tid, table_id, &Tuple::new(vec![Field::Int(7)]))
            .unwrap();
        db.buffer_pool().transaction_complete(tid, false).unwrap();

        let heap_file = db.catalog().get_heap_file(table_id).unwrap();
        let tid2 = TransactionId::new();
        let mut scan = crate::heap_file::HeapFileIterator::new(&heap_file, tid2, db.buffer_pool()).unwrap();
        scan.open().unwrap();
        assert!(!scan.has_next().unwrap());
        db.buffer_pool().transaction_complete(tid2, true).unwrap();
    }
}
