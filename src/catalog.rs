//! Table registry: maps table ids to their heap files and tuple
//! descriptions, with an advisory name index.
//!
//! Grounded on `examples/small-db-small-db/src/database.rs`'s `Catalog`
//! (`table_id_table_map: HashMap<i32, Arc<RwLock<HeapTable>>>`,
//! `add_table`/`get_row_scheme`), rebuilt on `ConcurrentHashMap` instead of
//! one `RwLock<Catalog>` so `Database` can hand out a shared `Arc<Catalog>`
//! rather than readers/writers contending for the whole catalog on every
//! lookup.

use std::sync::Arc;

use crate::error::{DbError, DbResult};
use crate::heap_file::HeapFile;
use crate::page_id::TableId;
use crate::tuple_desc::TupleDesc;
use crate::types::ConcurrentHashMap;

pub struct Catalog {
    files: ConcurrentHashMap<TableId, Arc<HeapFile>>,
    names: ConcurrentHashMap<String, TableId>,
}

impl Catalog {
    pub fn new() -> Self {
        Catalog {
            files: ConcurrentHashMap::new(),
            names: ConcurrentHashMap::new(),
        }
    }

    /// Registers a heap file under its own table id, with an optional
    /// advisory name for lookup convenience (spec.md's core model only
    /// requires ids; the name map is the expansion's ambient convenience).
    pub fn add_table(&self, heap_file: Arc<HeapFile>, name: Option<&str>) {
        let table_id = heap_file.table_id();
        if let Some(name) = name {
            self.names.insert(name.to_string(), table_id);
        }
        self.files.insert(table_id, heap_file);
    }

    pub fn get_heap_file(&self, table_id: TableId) -> DbResult<Arc<HeapFile>> {
        self.files
            .get_inner()
            .get(&table_id)
            .cloned()
            .ok_or(DbError::UnknownTable)
    }

    pub fn get_tuple_desc(&self, table_id: TableId) -> DbResult<TupleDesc> {
        Ok(self.get_heap_file(table_id)?.tuple_desc().clone())
    }

    pub fn table_id_by_name(&self, name: &str) -> DbResult<TableId> {
        self.names
            .get_inner()
            .get(name)
            .copied()
            .ok_or(DbError::UnknownTable)
    }

    /// All registered table ids, in a stable (sorted) order so callers that
    /// iterate the whole catalog (e.g. `flush_all_pages` callers wanting a
    /// deterministic checkpoint order) don't depend on hash-map iteration.
    pub fn table_ids(&self) -> Vec<TableId> {
        use itertools::Itertools;
        self.files.keys().into_iter().sorted().collect()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Catalog::new()
    }
}
