// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup decisions for the daemon: which config, which projects, which
//! locks.

use ao_core::ProjectId;
use ao_lifecycle::{
    env, AcquiredLifecycleLock, ConfigError, LifecycleError, LifecycleLocks, LockAcquisition,
    LockError, OrchestratorConfig,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Config file used when neither `--config` nor `AO_CONFIG` is given.
pub const DEFAULT_CONFIG_FILE: &str = "ao.toml";

#[derive(Debug, Error)]
pub enum HostError {
    #[error("lifecycle already running for project {project} ({})", owner_label(.owner_pid))]
    AlreadyRunning {
        project: ProjectId,
        owner_pid: Option<u32>,
    },

    #[error("no projects configured in {0}")]
    NoProjects(PathBuf),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Lock(#[from] LockError),
}

fn owner_label(pid: &Option<u32>) -> String {
    match pid {
        Some(pid) => format!("pid {}", pid),
        None => "pid unknown".to_string(),
    }
}

/// `--config` > `AO_CONFIG` > `./ao.toml`
pub fn config_path(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(env::config_path)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// The config's `state_dir`, else the environment default.
pub fn state_dir(config: &OrchestratorConfig) -> Result<PathBuf, LifecycleError> {
    match &config.state_dir {
        Some(dir) => Ok(dir.clone()),
        None => env::state_dir(),
    }
}

/// `--interval-ms` > `AO_POLL_INTERVAL_MS` > config `poll_interval`
pub fn poll_interval(flag_ms: Option<u64>, config: &OrchestratorConfig) -> Duration {
    flag_ms
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
        .or_else(env::poll_interval_ms)
        .unwrap_or_else(|| config.poll_interval())
}

/// One project if requested (it must be configured), otherwise all of them.
pub fn projects_in_scope(
    config: &OrchestratorConfig,
    requested: Option<&ProjectId>,
) -> Result<Vec<ProjectId>, HostError> {
    if let Some(project) = requested {
        config.project(project)?;
        return Ok(vec![project.clone()]);
    }
    if config.projects.is_empty() {
        return Err(HostError::NoProjects(config.config_path.clone()));
    }
    Ok(config.projects.keys().cloned().collect())
}

/// Take the lifecycle lock of every project, or none of them.
///
/// On contention the locks already taken are released and the owner of
/// the contended lock is reported.
pub fn acquire_all(
    locks: &LifecycleLocks,
    config_path: &Path,
    projects: &[ProjectId],
) -> Result<Vec<AcquiredLifecycleLock>, HostError> {
    let mut held = Vec::with_capacity(projects.len());
    for project in projects {
        let outcome = match locks.try_acquire(config_path, project) {
            Ok(outcome) => outcome,
            Err(e) => {
                release_all(locks, &held);
                return Err(e.into());
            }
        };
        match outcome {
            LockAcquisition::Acquired(lock) => held.push(lock),
            LockAcquisition::Held { owner_pid } => {
                release_all(locks, &held);
                return Err(HostError::AlreadyRunning {
                    project: project.clone(),
                    owner_pid,
                });
            }
        }
    }
    info!(projects = held.len(), "lifecycle locks acquired");
    Ok(held)
}

pub fn release_all(locks: &LifecycleLocks, held: &[AcquiredLifecycleLock]) {
    for lock in held {
        locks.release(lock);
    }
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
