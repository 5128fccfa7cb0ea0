// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon log file: rotation, startup marker and the tracing subscriber.

use std::io::Write;
use std::path::{Path, PathBuf};

/// Startup marker prefix written to the log before anything else.
/// Full format: "--- aod: starting (pid: 12345) ---"
pub const STARTUP_MARKER_PREFIX: &str = "--- aod: starting (pid: ";

/// Log size that triggers rotation at startup (10 MB).
pub const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

/// Rotated files kept next to the log (aod.log.1 .. aod.log.3).
pub const MAX_ROTATED_LOGS: u32 = 3;

/// `<state_dir>/aod.log`
pub fn log_path(state_dir: &Path) -> PathBuf {
    state_dir.join("aod.log")
}

/// Shift `log` to `log.1` (and older rotations up by one) once it is too big.
pub fn rotate_log_if_needed(log: &Path) {
    let size = match std::fs::metadata(log) {
        Ok(m) => m.len(),
        Err(_) => return,
    };
    if size <= MAX_LOG_SIZE {
        return;
    }

    let base = log.display().to_string();
    for i in (1..MAX_ROTATED_LOGS).rev() {
        let _ = std::fs::rename(format!("{base}.{i}"), format!("{base}.{}", i + 1));
    }
    let _ = std::fs::rename(log, format!("{base}.1"));
}

/// Append the startup marker, creating the log directory if needed.
pub fn write_startup_marker(log: &Path) -> std::io::Result<()> {
    if let Some(parent) = log.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log)?;
    writeln!(file, "{}{}) ---", STARTUP_MARKER_PREFIX, std::process::id())
}

/// Write a startup error synchronously; the non-blocking writer may not
/// flush before the process exits.
pub fn write_startup_error(log: &Path, error: &dyn std::fmt::Display) {
    let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log)
    else {
        return;
    };
    let _ = writeln!(file, "ERROR Failed to start aod: {}", error);
}

/// Install the global subscriber writing to `log`. `RUST_LOG` overrides the
/// default `info` filter.
pub fn setup_logging(
    log: &Path,
) -> std::io::Result<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let dir = log.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;
    let file_name = log.file_name().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "log path has no file name")
    })?;

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(guard)
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
