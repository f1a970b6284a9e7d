//! Logging init: daily-rotated file under the XDG state dir, or graceful
//! fallback to stderr when the log directory is unwritable.

use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};
use tracing_subscriber::EnvFilter;

/// Log files older than this are deleted on startup.
const MAX_LOG_AGE: Duration = Duration::from_secs(14 * 24 * 60 * 60);

/// Directory holding the rotated log files: `~/.local/state/snapkeep/logs`.
pub fn log_dir() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("snapkeep")?;
    Ok(xdg_dirs.get_state_home().join("snapkeep").join("logs"))
}

/// Initialize structured logging to a daily log file. On failure (e.g. log
/// dir unwritable), returns Err so the caller can fall back to stderr.
pub fn init_logging() -> Result<PathBuf> {
    let dir = log_dir()?;
    fs::create_dir_all(&dir)?;
    clean_old_log_files(&dir);

    let appender = tracing_appender::rolling::daily(&dir, "snapkeep.log");
    tracing_subscriber::fmt()
        .with_env_filter(default_filter())
        .with_writer(appender)
        .with_ansi(false)
        .init();

    tracing::info!("snapkeep logging initialized under {}", dir.display());
    Ok(dir)
}

/// Initialize logging to stderr only (no file). Use when `init_logging`
/// fails so the CLI doesn't crash.
pub fn init_logging_stderr() {
    tracing_subscriber::fmt()
        .with_env_filter(default_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,snapkeep=debug"))
}

/// Best-effort removal of rotated files past `MAX_LOG_AGE`. Failures are
/// ignored; logging setup must never block startup.
fn clean_old_log_files(dir: &std::path::Path) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    let now = SystemTime::now();
    for entry in entries.flatten() {
        let Ok(meta) = entry.metadata() else { continue };
        let Ok(modified) = meta.modified() else { continue };
        if now
            .duration_since(modified)
            .map(|age| age > MAX_LOG_AGE)
            .unwrap_or(false)
        {
            let _ = fs::remove_file(entry.path());
        }
    }
}
