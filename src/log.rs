//! Logging bootstrap, kept identical in spirit to
//! `examples/small-db-small-db/src/log.rs`: an `env_logger` builder with a
//! file:line-annotated format, callable (idempotently) from test setup.

use env_logger::Builder;
use std::io::Write;
use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes the global logger exactly once. Safe to call from every test's
/// setup routine.
pub fn init_log() {
    INIT.call_once(|| {
        let mut builder = Builder::from_default_env();
        builder
            .format_timestamp_micros()
            .format(|buf, record| {
                writeln!(
                    buf,
                    "[{} - {}] [{}:{}] {}",
                    record.level(),
                    record.target(),
                    record.file().unwrap_or("?"),
                    record.line().unwrap_or(0),
                    record.args()
                )
            })
            .init();
    });
}
