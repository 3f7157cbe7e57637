//! Logging setup.
//!
//! Logs go to a daily rolling file so that terminal output stays reserved
//! for the conversation.

pub use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tutor_core::{Result, TutorError};

use crate::paths::TutorPaths;

pub const LOG_ENV: &str = "TUTOR_LOG";
const LOG_FILE_PREFIX: &str = "tutor.log";

/// Installs the global subscriber.
///
/// The filter comes from `TUTOR_LOG` when set, otherwise `default_level`.
/// Keep the returned guard alive for the whole process; dropping it stops
/// the background writer.
pub fn init_logging(paths: &TutorPaths, default_level: &str) -> Result<WorkerGuard> {
    let logs_dir = paths.logs_dir()?;
    std::fs::create_dir_all(&logs_dir)?;

    let appender = tracing_appender::rolling::daily(&logs_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(build_filter(std::env::var(LOG_ENV).ok(), default_level))
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| TutorError::config(format!("Failed to initialize logging: {}", e)))?;

    Ok(guard)
}

fn build_filter(from_env: Option<String>, default_level: &str) -> EnvFilter {
    from_env
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_new(default_level).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}
