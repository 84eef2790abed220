pub mod buffer_pool;
pub mod catalog;
pub mod config;
pub mod database;
pub mod error;
pub mod field;
pub mod heap_file;
pub mod heap_page;
pub mod int_histogram;
pub mod lock_manager;
pub mod log;
pub mod op_iterator;
pub mod operators;
pub mod page_id;
pub mod permissions;
pub mod predicate;
pub mod string_aggregator;
pub mod transaction_id;
pub mod tuple;
pub mod tuple_desc;
pub mod types;

pub use buffer_pool::BufferPool;
pub use catalog::Catalog;
pub use config::DbConfig;
pub use database::Database;
pub use error::{DbError, DbResult};
pub use field::{Field, Type};
pub use heap_file::HeapFile;
pub use op_iterator::OpIterator;
pub use page_id::PageId;
pub use permissions::Permissions;
pub use predicate::{Op, Predicate};
pub use transaction_id::TransactionId;
pub use tuple::{RecordId, Tuple};
pub use tuple_desc::TupleDesc;
