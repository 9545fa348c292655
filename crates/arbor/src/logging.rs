//! Logger setup.
//!
//! The crate logs through the `log` facade. Binaries and examples call
//! [`init_logger`] once at startup to route records to `env_logger`.

use std::sync::Once;

static INIT: Once = Once::new();

/// Install `env_logger`, honouring `RUST_LOG` and defaulting to `info`.
///
/// Safe to call more than once. If another logger was already installed by
/// the host application, that logger is left in place.
pub fn init_logger() {
    INIT.call_once(|| {
        let result = env_logger::Builder::new()
            .filter_level(log::LevelFilter::Info)
            .parse_default_env()
            .format_timestamp_millis()
            .try_init();
        if result.is_err() {
            eprintln!("[arbor] a logger is already set; keeping it");
        }
    });
}
