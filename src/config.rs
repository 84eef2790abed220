//! Process-wide knobs for the storage core.
//!
//! spec.md calls `pageSize` "mutable only for tests"; grounded on
//! `examples/small-db-small-db/src/btree/page_cache.rs`'s
//! `PAGE_SIZE: AtomicUsize` + `set_page_size` test hook, generalized into a
//! small config struct so a `Database` can be constructed with whatever
//! values a test needs instead of mutating global statics.

use std::time::Duration;

pub const DEFAULT_PAGE_SIZE: usize = 4096;
pub const DEFAULT_MAX_PAGES: usize = 50;
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 1000;
pub const DEFAULT_MAX_STRING_LEN: usize = 128;

/// Construction-time parameters for a [`crate::database::Database`].
///
/// `page_size` and `max_string_len` determine on-disk layout and must not
/// change once a heap file has been opened against the owning `Database`;
/// `max_pages` and `lock_timeout_ceiling` may be adjusted freely since they
/// only affect cache/lock policy, not the bytes on disk.
#[derive(Debug, Clone, Copy)]
pub struct DbConfig {
    pub page_size: usize,
    pub max_pages: usize,
    pub lock_timeout_ceiling: Duration,
    pub max_string_len: usize,
}

impl Default for DbConfig {
    fn default() -> Self {
        DbConfig {
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            lock_timeout_ceiling: Duration::from_millis(DEFAULT_LOCK_TIMEOUT_MS),
            max_string_len: DEFAULT_MAX_STRING_LEN,
        }
    }
}

impl DbConfig {
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_lock_timeout_ceiling(mut self, ceiling: Duration) -> Self {
        self.lock_timeout_ceiling = ceiling;
        self
    }

    pub fn with_max_string_len(mut self, max_string_len: usize) -> Self {
        self.max_string_len = max_string_len;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults_independently() {
        let cfg = DbConfig::default()
            .with_page_size(128)
            .with_max_pages(3);
        assert_eq!(cfg.page_size, 128);
        assert_eq!(cfg.max_pages, 3);
        assert_eq!(cfg.lock_timeout_ceiling, Duration::from_millis(DEFAULT_LOCK_TIMEOUT_MS));
        assert_eq!(cfg.max_string_len, DEFAULT_MAX_STRING_LEN);
    }
}
