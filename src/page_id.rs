//! Page identity.
//!
//! Grounded on `examples/small-db-small-db/src/page_id.rs`'s `HeapPageID`
//! (`table_id: i32, page_index: usize`), with `table_id` generalized per
//! spec.md §3 into a hash of the heap file's canonicalized path (the teacher
//! repo leaves `table_id` as a caller-assigned `i32`, which does not give the
//! "stable, deterministic" guarantee the expanded spec asks for).

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;

pub type TableId = u64;

/// Derives a stable table id from a heap file's on-disk path. Two `HeapFile`s
/// opened against the same path (even across process restarts) get the same
/// id; this is what lets a `Catalog` be rebuilt idempotently.
pub fn table_id_for_path(path: &Path) -> TableId {
    let canonical = path
        .canonicalize()
        .unwrap_or_else(|_| path.to_path_buf());
    let mut hasher = DefaultHasher::new();
    canonical.hash(&mut hasher);
    hasher.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageId {
    pub table_id: TableId,
    pub page_number: usize,
}

impl PageId {
    pub fn new(table_id: TableId, page_number: usize) -> Self {
        PageId {
            table_id,
            page_number,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_id_is_stable_across_lookups_of_the_same_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.db");
        std::fs::write(&path, b"").unwrap();
        assert_eq!(table_id_for_path(&path), table_id_for_path(&path));
    }

    #[test]
    fn table_id_differs_across_distinct_paths() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.db");
        let b = dir.path().join("b.db");
        std::fs::write(&a, b"").unwrap();
        std::fs::write(&b, b"").unwrap();
        assert_ne!(table_id_for_path(&a), table_id_for_path(&b));
    }
}
