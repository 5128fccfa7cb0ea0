// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cross-process lifecycle lock: at most one poller per (config, project).
//!
//! The lock file holds `{pid, projectId, startedAt}`. It is only ever
//! created whole: the payload is written to a private temp file which is
//! then hard-linked into place, and the link fails if the lock exists.
//! A lock whose owner is dead, or whose pid now belongs to a process that
//! started well after the lock was taken, is treated as stale and replaced.

mod probe;

pub use probe::{ProcessProbe, SystemProcessProbe};

use crate::paths;
use ao_core::ProjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Slack between a lock's `startedAt` and the OS start time of its pid.
pub const PID_REUSE_GRACE: chrono::Duration = chrono::Duration::seconds(30);

#[derive(Debug, Error)]
pub enum LockError {
    #[error("lock I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Lock file contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockPayload {
    pub pid: u32,
    pub project_id: ProjectId,
    pub started_at: DateTime<Utc>,
}

/// A lock this process holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquiredLifecycleLock {
    pub path: PathBuf,
    pub payload: LockPayload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockAcquisition {
    Acquired(AcquiredLifecycleLock),
    /// Someone else holds it. The owner is `None` when it could not be read.
    Held { owner_pid: Option<u32> },
}

enum Existing {
    Missing,
    Malformed(Vec<u8>),
    Valid(LockPayload, Vec<u8>),
}

/// Lock manager rooted at a state directory.
#[derive(Clone)]
pub struct LifecycleLocks {
    state_dir: PathBuf,
    probe: Arc<dyn ProcessProbe>,
}

impl LifecycleLocks {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self::with_probe(state_dir, Arc::new(SystemProcessProbe))
    }

    pub fn with_probe(state_dir: impl Into<PathBuf>, probe: Arc<dyn ProcessProbe>) -> Self {
        Self {
            state_dir: state_dir.into(),
            probe,
        }
    }

    pub fn lock_path(&self, config_path: &Path, project_id: &ProjectId) -> PathBuf {
        paths::lock_path(&self.state_dir, config_path, project_id)
    }

    /// Acquire as the current process.
    pub fn try_acquire(
        &self,
        config_path: &Path,
        project_id: &ProjectId,
    ) -> Result<LockAcquisition, LockError> {
        self.try_acquire_as(config_path, project_id, std::process::id(), Utc::now())
    }

    pub fn try_acquire_as(
        &self,
        config_path: &Path,
        project_id: &ProjectId,
        pid: u32,
        now: DateTime<Utc>,
    ) -> Result<LockAcquisition, LockError> {
        let path = self.lock_path(config_path, project_id);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| io_error(parent, source))?;
        }
        let payload = LockPayload {
            pid,
            project_id: project_id.clone(),
            started_at: now,
        };

        if create_exclusive(&path, &payload)? {
            return Ok(acquired(path, payload));
        }

        let stale = match read_existing(&path)? {
            Existing::Missing => Vec::new(),
            Existing::Malformed(bytes) => {
                warn!(path = %path.display(), "malformed lifecycle lock, treating as stale");
                bytes
            }
            Existing::Valid(owner, bytes) => {
                if self.owner_alive(&owner) {
                    return Ok(LockAcquisition::Held {
                        owner_pid: Some(owner.pid),
                    });
                }
                info!(
                    path = %path.display(),
                    owner_pid = owner.pid,
                    "recovering lifecycle lock from dead owner"
                );
                bytes
            }
        };

        remove_if_unchanged(&path, &stale)?;
        if create_exclusive(&path, &payload)? {
            return Ok(acquired(path, payload));
        }
        let owner_pid = match read_existing(&path)? {
            Existing::Valid(owner, _) => Some(owner.pid),
            Existing::Missing | Existing::Malformed(_) => None,
        };
        Ok(LockAcquisition::Held { owner_pid })
    }

    /// Remove the lock file if it still records `lock`'s pid and project.
    ///
    /// Returns false (and leaves the file alone) when it belongs to someone
    /// else or is already gone.
    pub fn release(&self, lock: &AcquiredLifecycleLock) -> bool {
        let owned = match read_existing(&lock.path) {
            Ok(Existing::Valid(current, _)) => {
                current.pid == lock.payload.pid && current.project_id == lock.payload.project_id
            }
            Ok(_) => false,
            Err(e) => {
                warn!(error = %e, "could not read lifecycle lock for release");
                false
            }
        };
        if !owned {
            return false;
        }
        match std::fs::remove_file(&lock.path) {
            Ok(()) => true,
            Err(e) => {
                warn!(path = %lock.path.display(), error = %e, "failed to remove lifecycle lock");
                false
            }
        }
    }

    fn owner_alive(&self, owner: &LockPayload) -> bool {
        if !self.probe.is_alive(owner.pid) {
            return false;
        }
        match self.probe.started_at(owner.pid) {
            Some(os_start) if os_start > owner.started_at + PID_REUSE_GRACE => {
                info!(
                    pid = owner.pid,
                    %os_start,
                    locked_at = %owner.started_at,
                    "lock owner pid was reused by a newer process"
                );
                false
            }
            _ => true,
        }
    }
}

fn acquired(path: PathBuf, payload: LockPayload) -> LockAcquisition {
    info!(path = %path.display(), pid = payload.pid, "lifecycle lock acquired");
    LockAcquisition::Acquired(AcquiredLifecycleLock { path, payload })
}

fn io_error(path: &Path, source: std::io::Error) -> LockError {
    LockError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Unique sibling path for temp files next to the lock.
fn sibling(path: &Path, tag: &str) -> PathBuf {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(format!(".{}.{}.{}", tag, std::process::id(), n));
    path.with_file_name(name)
}

/// Write the payload in full, then link it into place. False if the lock exists.
fn create_exclusive(path: &Path, payload: &LockPayload) -> Result<bool, LockError> {
    let json = serde_json::to_vec(payload)
        .map_err(|e| io_error(path, std::io::Error::other(e)))?;
    let tmp = sibling(path, "tmp");
    std::fs::write(&tmp, json).map_err(|source| io_error(&tmp, source))?;
    let linked = std::fs::hard_link(&tmp, path);
    let _ = std::fs::remove_file(&tmp);
    match linked {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(source) => Err(io_error(path, source)),
    }
}

fn read_existing(path: &Path) -> Result<Existing, LockError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Existing::Missing),
        Err(source) => return Err(io_error(path, source)),
    };
    Ok(match serde_json::from_slice::<LockPayload>(&bytes) {
        Ok(payload) => Existing::Valid(payload, bytes),
        Err(_) => Existing::Malformed(bytes),
    })
}

/// Remove a stale lock, unless it was replaced since we read it.
///
/// The file is renamed aside first so the comparison sees exactly what was
/// removed; a fresh lock taken by another process is linked back.
fn remove_if_unchanged(path: &Path, expected: &[u8]) -> Result<(), LockError> {
    let aside = sibling(path, "stale");
    match std::fs::rename(path, &aside) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(source) => return Err(io_error(path, source)),
    }
    let taken = std::fs::read(&aside).unwrap_or_default();
    if taken != expected {
        let _ = std::fs::hard_link(&aside, path);
    }
    let _ = std::fs::remove_file(&aside);
    Ok(())
}

#[cfg(test)]
#[path = "../lock_tests.rs"]
mod tests;
