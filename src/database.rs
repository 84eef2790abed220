//! The explicit database context: one buffer pool, one catalog.
//!
//! Grounded on `examples/small-db-small-db/src/database.rs`'s `Database`,
//! which wraps a process-wide `OnceCell<Database>` singleton reached via
//! `Database::global()`. spec.md §9's design note resolves this into an
//! explicit, constructible context instead: nothing here is global, so
//! tests can spin up as many independent databases as they like without
//! sharing state through a static.

use std::path::Path;
use std::sync::Arc;

use crate::buffer_pool::BufferPool;
use crate::catalog::Catalog;
use crate::config::DbConfig;
use crate::error::DbResult;
use crate::heap_file::HeapFile;
use crate::page_id::TableId;
use crate::tuple_desc::TupleDesc;

pub struct Database {
    config: DbConfig,
    catalog: Arc<Catalog>,
    buffer_pool: BufferPool,
}

impl Database {
    pub fn new(config: DbConfig) -> Self {
        let catalog = Arc::new(Catalog::new());
        let buffer_pool = BufferPool::new(
            config.max_pages,
            config.lock_timeout_ceiling,
            Arc::clone(&catalog),
        );
        Database {
            config,
            catalog,
            buffer_pool,
        }
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn buffer_pool(&self) -> &BufferPool {
        &self.buffer_pool
    }

    /// The `STRING` field type sized to this database's process-wide
    /// maximum string width, per spec.md §3 ("String width is a
    /// process-wide constant").
    pub fn string_type(&self) -> crate::field::Type {
        crate::field::Type::Str(self.config.max_string_len)
    }

    /// Opens (or creates) a heap file at `path` and registers it in this
    /// database's catalog under `name`. Returns the new table's id.
    pub fn add_table(
        &self,
        path: impl AsRef<Path>,
        tuple_desc: TupleDesc,
        name: &str,
    ) -> DbResult<TableId> {
        let heap_file = HeapFile::new(path, tuple_desc, self.config.page_size)?;
        let table_id = heap_file.table_id();
        self.catalog.add_table(Arc::new(heap_file), Some(name));
        Ok(table_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_table_registers_it_under_both_id_and_name() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig::default());
        let td = TupleDesc::unnamed(vec![crate::field::Type::Int]);
        let table_id = db.add_table(dir.path().join("t.db"), td, "people").unwrap();

        assert_eq!(db.catalog().table_id_by_name("people").unwrap(), table_id);
        assert!(db.catalog().get_heap_file(table_id).is_ok());
    }

    #[test]
    fn independent_databases_do_not_share_state() {
        let dir = tempfile::tempdir().unwrap();
        let a = Database::new(DbConfig::default());
        let b = Database::new(DbConfig::default());
        let td = TupleDesc::unnamed(vec![crate::field::Type::Int]);
        a.add_table(dir.path().join("a.db"), td, "t").unwrap();

        assert!(b.catalog().table_id_by_name("t").is_err());
    }

    #[test]
    fn string_type_uses_configured_max_width() {
        let db = Database::new(DbConfig::default().with_max_string_len(17));
        assert_eq!(db.string_type(), crate::field::Type::Str(17));
    }
}
