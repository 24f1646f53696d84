//! Tracing bootstrap.
//!
//! Logs go to a daily-rotated file rather than the terminal so the
//! interactive session stays clean. The filter is controlled with the
//! `ISODECK_LOG` environment variable (`info` by default).

use std::io;
use std::path::Path;

use tracing_subscriber::EnvFilter;

pub use tracing_appender::non_blocking::WorkerGuard;

/// Environment variable controlling the log filter.
pub const LOG_ENV_VAR: &str = "ISODECK_LOG";

/// Log file base name.
const LOG_FILE_PREFIX: &str = "isodeck.log";

/// Initializes the global tracing subscriber writing under `log_dir`.
///
/// Returns the appender guard; the caller must keep it alive for the
/// lifetime of the process or buffered log lines are lost. Calling this a
/// second time is a no-op.
pub fn init_logging(log_dir: &Path) -> io::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;

    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"));

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init();

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_creates_log_directory() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");

        let guard = init_logging(&log_dir).unwrap();
        assert!(log_dir.is_dir());
        drop(guard);
    }

    #[test]
    fn test_second_init_is_harmless() {
        let dir = tempfile::tempdir().unwrap();
        let first = init_logging(dir.path()).unwrap();
        let second = init_logging(dir.path()).unwrap();
        drop((first, second));
    }
}
