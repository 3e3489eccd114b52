/// Tracing setup.
///
/// The terminal belongs to the UI, so events only go to a log file:
/// `<data dir>/paste-sheet/paste-sheet.log`. The level comes from
/// `PASTE_SHEET_LOG` (an `EnvFilter` directive), defaulting to `info`.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*, registry};

pub const LOG_ENV: &str = "PASTE_SHEET_LOG";
pub const LOG_FILE_NAME: &str = "paste-sheet.log";

/// Keeps the background writer alive; logs are flushed when it drops.
pub struct LoggingGuard {
    _guard: Option<WorkerGuard>,
    pub path: Option<PathBuf>,
}

pub fn default_log_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("paste-sheet"))
}

fn build_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. A missing or unwritable log directory
/// disables logging instead of failing startup.
pub fn init(log_dir: Option<&Path>) -> LoggingGuard {
    let Some(dir) = log_dir else {
        return LoggingGuard {
            _guard: None,
            path: None,
        };
    };

    match open_writer(dir) {
        Ok((writer, guard)) => {
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true)
                .with_writer(writer);
            let installed = registry().with(build_filter()).with(layer).try_init().is_ok();
            LoggingGuard {
                _guard: Some(guard),
                path: installed.then(|| dir.join(LOG_FILE_NAME)),
            }
        }
        Err(_) => LoggingGuard {
            _guard: None,
            path: None,
        },
    }
}

fn open_writer(dir: &Path) -> io::Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    fs::create_dir_all(dir)?;
    let file_appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
    Ok(tracing_appender::non_blocking(file_appender))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_writer_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("logs").join("nested");
        let (_writer, _guard) = open_writer(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn test_no_directory_disables_logging() {
        let guard = init(None);
        assert!(guard.path.is_none());
    }
}
