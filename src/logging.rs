//! Diagnostics setup
//!
//! Installs a `tracing` fmt subscriber. The filter comes from `RUST_LOG` when
//! set, otherwise from `log.level` in the config, otherwise `warn`.
//!
//! An interactive session owns the terminal, so unless a log file is
//! configured its logs are discarded instead of being written over the
//! drawing.

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_LEVEL: &str = "warn";

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    File(PathBuf),
    Stderr,
    Discard,
}

impl LogTarget {
    pub fn select(file: Option<&Path>, interactive: bool) -> Self {
        match file {
            Some(path) => LogTarget::File(path.to_path_buf()),
            None if interactive => LogTarget::Discard,
            None => LogTarget::Stderr,
        }
    }
}

/// Filter from `RUST_LOG`, then `level`, then [`DEFAULT_LEVEL`].
pub fn build_filter(level: Option<&str>) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    level
        .and_then(|level| EnvFilter::try_new(level).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LEVEL))
}

/// Install the global subscriber. A second call is a no-op.
pub fn init_logging(level: Option<&str>, target: &LogTarget) -> io::Result<()> {
    let filter = build_filter(level);
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    let installed = match target {
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
        LogTarget::Stderr => builder.with_writer(io::stderr).try_init(),
        LogTarget::Discard => builder.with_writer(io::sink).try_init(),
    };

    if installed.is_err() {
        tracing::debug!("logging already initialized");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn without_rust_log<T>(f: impl FnOnce() -> T) -> T {
        let previous = env::var_os("RUST_LOG");
        env::remove_var("RUST_LOG");
        let result = f();
        if let Some(value) = previous {
            env::set_var("RUST_LOG", value);
        }
        result
    }

    #[test]
    fn test_target_selection() {
        let path = Path::new("pxt.log");
        assert_eq!(LogTarget::select(Some(path), true), LogTarget::File(path.to_path_buf()));
        assert_eq!(LogTarget::select(None, true), LogTarget::Discard);
        assert_eq!(LogTarget::select(None, false), LogTarget::Stderr);
    }

    #[test]
    #[serial]
    fn test_filter_from_config_level() {
        let filter = without_rust_log(|| build_filter(Some("debug")));
        assert_eq!(filter.to_string(), "debug");
    }

    #[test]
    #[serial]
    fn test_filter_defaults_to_warn() {
        let filter = without_rust_log(|| build_filter(None));
        assert_eq!(filter.to_string(), "warn");
        let filter = without_rust_log(|| build_filter(Some("pixelturtle=loud")));
        assert_eq!(filter.to_string(), "warn");
    }

    #[test]
    #[serial]
    fn test_rust_log_wins() {
        let previous = env::var_os("RUST_LOG");
        env::set_var("RUST_LOG", "info");
        let filter = build_filter(Some("debug"));
        match previous {
            Some(value) => env::set_var("RUST_LOG", value),
            None => env::remove_var("RUST_LOG"),
        }
        assert_eq!(filter.to_string(), "info");
    }

    #[test]
    fn test_file_target_creates_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("pxt.log");
        init_logging(Some("info"), &LogTarget::File(path.clone())).expect("init");
        assert!(path.exists());
    }
}
