// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the lifecycle crate.

use std::path::PathBuf;
use std::time::Duration;

use crate::LifecycleError;

/// Config file named by `AO_CONFIG`, if set.
pub fn config_path() -> Option<PathBuf> {
    std::env::var_os("AO_CONFIG")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Resolve state directory: AO_STATE_DIR > XDG_STATE_HOME/ao > ~/.local/state/ao
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("AO_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("ao"));
    }
    let home = std::env::var("HOME").map_err(|_| LifecycleError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/ao"))
}

/// Poll interval override
pub fn poll_interval_ms() -> Option<Duration> {
    std::env::var("AO_POLL_INTERVAL_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
