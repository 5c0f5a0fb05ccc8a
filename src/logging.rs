//! Tracing subscriber setup
//!
//! Console commands log to stderr. The interactive UI and the background
//! daemon own the terminal (or have none), so they log to a file in the app
//! data directory instead.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Where log lines go
#[derive(Debug, Clone)]
pub enum LogTarget {
    Stderr { no_color: bool },
    File(PathBuf),
}

/// Initialize the global subscriber.
///
/// The filter comes from `log_level` when given, otherwise from `RUST_LOG`,
/// otherwise `default_level`. Calling this twice is harmless; the second
/// call keeps the first subscriber.
pub fn init_logger(
    log_level: Option<&str>,
    default_level: &str,
    target: LogTarget,
) -> io::Result<()> {
    let filter = match log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
    };

    let result = match target {
        LogTarget::Stderr { no_color } => {
            let layer = fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(!no_color)
                .with_target(false)
                .with_filter(filter);
            tracing_subscriber::registry().with(layer).try_init()
        }
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = fs::OpenOptions::new().create(true).append(true).open(&path)?;
            let layer = fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_filter(filter);
            tracing_subscriber::registry().with(layer).try_init()
        }
    };

    match result {
        Ok(()) => Ok(()),
        // Already set (tests, or a second init from the same process)
        Err(e) if e.to_string().contains("already been set") => Ok(()),
        Err(e) => Err(io::Error::other(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_target_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("wordfind.log");

        init_logger(Some("debug"), "info", LogTarget::File(path.clone())).unwrap();
        assert!(path.exists());

        // Second init keeps the first subscriber and still succeeds
        init_logger(None, "warn", LogTarget::Stderr { no_color: true }).unwrap();
    }
}
