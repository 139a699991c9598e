//! File logging setup.
//!
//! The terminal is owned by the UI, so log output goes to a file through a
//! non-blocking writer. `RUST_LOG` overrides the configured filter.

use std::env;
use std::fs;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;

/// Install the global subscriber. Keep the returned guard alive for the
/// whole run so buffered lines are flushed on exit.
pub fn init(settings: &LoggingSettings) -> Option<WorkerGuard> {
    let path = settings.file.clone().or_else(default_log_path)?;
    let dir = path.parent()?.to_path_buf();
    let file_name = path.file_name()?.to_owned();

    if let Err(e) = fs::create_dir_all(&dir) {
        eprintln!("cadenza: cannot create log directory {}: {e}", dir.display());
        return None;
    }

    let appender = tracing_appender::rolling::never(&dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.filter.as_str()));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_thread_names(true)
        .try_init();
    if installed.is_err() {
        return None;
    }

    Some(guard)
}

/// `$XDG_STATE_HOME/cadenza/cadenza.log`, or `~/.local/state/cadenza/cadenza.log`.
pub fn default_log_path() -> Option<PathBuf> {
    let state_home = if let Some(xdg) = env::var_os("XDG_STATE_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".local").join("state"))
    };

    state_home.map(|d| d.join("cadenza").join("cadenza.log"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{EnvGuard, env_lock};

    #[test]
    fn default_log_path_prefers_xdg_state_home() {
        let _lock = env_lock();
        let _g1 = EnvGuard::set("XDG_STATE_HOME", "/tmp/xdg-state");
        let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

        assert_eq!(
            default_log_path().unwrap(),
            PathBuf::from("/tmp/xdg-state/cadenza/cadenza.log")
        );
    }

    #[test]
    fn default_log_path_falls_back_to_home() {
        let _lock = env_lock();
        let _g1 = EnvGuard::remove("XDG_STATE_HOME");
        let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

        assert_eq!(
            default_log_path().unwrap(),
            PathBuf::from("/tmp/home-dir/.local/state/cadenza/cadenza.log")
        );
    }
}
