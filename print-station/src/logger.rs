//! Logging setup
//!
//! `RUST_LOG` wins when set; otherwise the configured level applies to every
//! target. With a log directory, output goes to daily-rolling files there.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE_PREFIX: &str = "print-station";

/// Console logging at `info`
pub fn init_logger() {
    let _ = init_logger_with_file("info", None);
}

/// Initialize logging, optionally to daily files under `log_dir`
///
/// The returned guard flushes the file writer on drop; keep it alive for
/// the life of the process. Falls back to the console when the directory
/// cannot be created.
pub fn init_logger_with_file(level: &str, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false);

    if let Some(dir) = log_dir {
        match std::fs::create_dir_all(dir) {
            Ok(()) => {
                let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
                let (writer, guard) = tracing_appender::non_blocking(appender);
                let _ = builder.with_ansi(false).with_writer(writer).try_init();
                return Some(guard);
            }
            Err(e) => eprintln!("Cannot use log directory {}: {}", dir.display(), e),
        }
    }

    let _ = builder.try_init();
    None
}
