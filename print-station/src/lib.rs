//! Print station - prints finalized sales on the till's receipt printer
//!
//! Wires configuration, logging and the `pos-printer` dispatcher together.
//! The surrounding application hands over a completed sale; each line item
//! comes out as its own slip and its outcome is reported individually.

use tracing_appender::non_blocking::WorkerGuard;

pub mod config;
pub mod logger;
pub mod station;

pub use config::Config;
pub use logger::{init_logger, init_logger_with_file};
pub use station::{PrintStation, StationError, StationResult, dump_sale, load_sale};

/// Load `.env`, read the configuration and start logging
///
/// Hold on to the returned guard until exit so file logs are flushed.
pub fn setup_environment() -> (Config, Option<WorkerGuard>) {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    let guard = init_logger_with_file(&config.log_level, config.log_dir.as_deref());
    (config, guard)
}
