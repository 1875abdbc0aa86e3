//! File logging. The terminal belongs to the TUI, so nothing goes to stdout.

use std::fs;
use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE: &str = "pokedex.log";

/// Keep alive for the whole session; dropping it flushes the writer.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Truncate `<log_dir>/pokedex.log` and route `tracing` output into it.
/// `RUST_LOG` overrides the default `info` filter.
pub fn init_logging(log_dir: &Path) -> io::Result<LoggingGuard> {
    fs::create_dir_all(log_dir)?;
    fs::write(log_dir.join(LOG_FILE), "")?;

    let appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (writer, file_guard) = tracing_appender::non_blocking(appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init()
        .map_err(io::Error::other)?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_creates_and_truncates_log_file() {
        let dir = std::env::temp_dir().join(format!("pokedex-logs-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(LOG_FILE), "stale").unwrap();

        let guard = init_logging(&dir).unwrap();
        assert_eq!(fs::read_to_string(dir.join(LOG_FILE)).unwrap(), "");

        drop(guard);
        let _ = fs::remove_dir_all(&dir);
    }
}
