//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace, LevelFilter};

/// Initialize logging from `RUST_LOG` with a global level filter applied on top.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_with_level(level: LevelFilter) {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .try_init();
}
