//! Logging infrastructure for Audio Video MergeX.
//!
//! This module provides:
//! - Application-wide `tracing` setup (stderr, optionally a daily log file)
//! - Per-batch loggers writing a dedicated log file
//! - Compact mode keeping tool output in a tail buffer for error diagnosis
//!
//! # Example
//!
//! ```no_run
//! use avm_core::logging::{JobLogger, LogConfig};
//!
//! let logger = JobLogger::for_batch("/path/to/logs", LogConfig::default()).unwrap();
//!
//! logger.phase("Job 1/2: holiday.mp4");
//! logger.command("ffmpeg -i holiday.mp4 ...");
//! logger.success("Replaced holiday.mp4");
//! ```

mod job_logger;
mod types;

use std::path::Path;

pub use job_logger::JobLogger;
pub use types::{LogConfig, LogLevel, MessagePrefix};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// File name prefix of the application log.
const APP_LOG_PREFIX: &str = "audio-video-mergex";

/// Initialize global tracing subscriber for application-wide logging.
///
/// This sets up a subscriber that:
/// - Respects RUST_LOG environment variable
/// - Falls back to the provided default level
/// - Outputs to stderr with timestamps
///
/// Should be called once at application startup.
pub fn init_tracing(default_level: LogLevel) {
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(env_filter(default_level))
        .try_init();
}

/// Initialize tracing to stderr plus a daily rolling file in `logs_dir`.
///
/// The returned guard flushes the file writer when dropped and must be held
/// for the lifetime of the application. Returns `None` (stderr only) when
/// the log file cannot be opened.
pub fn init_tracing_with_file(default_level: LogLevel, logs_dir: &Path) -> Option<WorkerGuard> {
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(APP_LOG_PREFIX)
        .filename_suffix("log")
        .build(logs_dir);

    let appender = match appender {
        Ok(appender) => appender,
        Err(e) => {
            init_tracing(default_level);
            tracing::warn!("File logging disabled ({}): {}", logs_dir.display(), e);
            return None;
        }
    };

    let (writer, guard) = tracing_appender::non_blocking(appender);

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(env_filter(default_level))
        .try_init();

    Some(guard)
}

/// Initialize tracing for tests (only logs warnings and above).
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

fn env_filter(default_level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_to_filter_str(default_level)))
}

/// Convert LogLevel to filter string.
fn level_to_filter_str(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Trace => "trace",
        LogLevel::Debug => "debug",
        LogLevel::Info => "info",
        LogLevel::Warn => "warn",
        LogLevel::Error => "error",
    }
}
