// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk layout under the state directory.
//!
//! Everything derived from one config file lives in
//! `<state_dir>/<config-hash>/`, so two configs never share locks, event
//! logs or session records.

use ao_core::ProjectId;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// First 16 hex chars of SHA-256 over the canonicalized config path.
///
/// Falls back to the path as given when it cannot be canonicalized (for
/// example because it does not exist yet).
pub fn config_hash(config_path: &Path) -> String {
    let canonical = std::fs::canonicalize(config_path).unwrap_or_else(|_| config_path.to_path_buf());
    let digest = Sha256::digest(canonical.to_string_lossy().as_bytes());
    let mut hex = format!("{:x}", digest);
    hex.truncate(16);
    hex
}

/// `<state_dir>/<config-hash>`
pub fn config_dir(state_dir: &Path, config_path: &Path) -> PathBuf {
    state_dir.join(config_hash(config_path))
}

/// `<state_dir>/<config-hash>/lifecycle-<project>.lock`
pub fn lock_path(state_dir: &Path, config_path: &Path, project_id: &ProjectId) -> PathBuf {
    config_dir(state_dir, config_path).join(format!("lifecycle-{}.lock", project_id))
}

/// `<state_dir>/<config-hash>/events.jsonl`
pub fn event_log_path(state_dir: &Path, config_path: &Path) -> PathBuf {
    config_dir(state_dir, config_path).join("events.jsonl")
}

/// `<state_dir>/<config-hash>/sessions`
pub fn sessions_dir(state_dir: &Path, config_path: &Path) -> PathBuf {
    config_dir(state_dir, config_path).join("sessions")
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
