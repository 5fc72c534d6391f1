//! Tracing setup for the `certprep` binary.
//!
//! Console output always goes to stderr so the JSON written to stdout stays
//! parseable. A daily rolling file is added when `Config::log_dir` is set.

use std::io;
use std::path::Path;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

const LOG_FILE_PREFIX: &str = "certprep.log";

/// Keeps the background file writer alive; drop it only at exit.
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

fn log_file_writer(dir: &Path) -> io::Result<(NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(dir)?;
    let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
    Ok(tracing_appender::non_blocking(appender))
}

/// Install the global subscriber from process settings.
///
/// An unparsable `log_level` falls back to `info`. A log directory that
/// cannot be created leaves file logging off rather than failing startup.
pub fn init_tracing(config: &Config) -> Option<FileLogGuard> {
    let filter =
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let mut guard = None;
    let file_layer = config.log_dir.as_deref().and_then(|dir| match log_file_writer(dir) {
        Ok((writer, worker)) => {
            guard = Some(FileLogGuard { _guard: worker });
            Some(fmt::layer().with_writer(writer).with_ansi(false).with_target(true))
        }
        Err(err) => {
            eprintln!("file logging disabled, cannot use {}: {err}", dir.display());
            None
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr).with_target(true))
        .with(file_layer)
        .init();

    if let (Some(dir), Some(_)) = (&config.log_dir, &guard) {
        tracing::debug!(log_dir = %dir.display(), "file logging enabled");
    }
    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_writer_creates_directory() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("logs").join("nested");
        let (_writer, _guard) = log_file_writer(&dir).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_log_file_writer_rejects_file_path() {
        let root = tempfile::tempdir().unwrap();
        let file = root.path().join("taken");
        std::fs::write(&file, b"").unwrap();
        assert!(log_file_writer(&file).is_err());
    }
}
