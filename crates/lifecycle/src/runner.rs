// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Composition root: wires plugins, sessions, the event bus and a manager.

use crate::config::OrchestratorConfig;
use crate::error::LifecycleError;
use crate::event_bus::EventBus;
use crate::manager::{LifecycleManager, ManagerDeps};
use crate::paths;
use ao_adapters::{FileSessionManager, PluginRegistry};
use ao_core::ProjectId;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

struct Running {
    manager: LifecycleManager,
    bus: EventBus,
}

/// Starts and stops the lifecycle core for one config.
pub struct LifecycleRunner {
    config: Arc<OrchestratorConfig>,
    state_dir: PathBuf,
    project: Option<ProjectId>,
    registry: Option<PluginRegistry>,
    running: Option<Running>,
}

impl LifecycleRunner {
    pub fn new(config: OrchestratorConfig, state_dir: impl Into<PathBuf>) -> Self {
        Self {
            config: Arc::new(config),
            state_dir: state_dir.into(),
            project: None,
            registry: None,
            running: None,
        }
    }

    /// Only poll sessions of `project`.
    pub fn scoped_to(mut self, project: ProjectId) -> Self {
        self.project = Some(project);
        self
    }

    /// Use `registry` instead of the builtin plugins.
    pub fn with_registry(mut self, registry: PluginRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Build everything and begin polling. A running runner is left as is.
    pub fn start(&mut self, interval: Duration) -> Result<(), LifecycleError> {
        if self.running.is_some() {
            return Ok(());
        }
        let config_path = &self.config.config_path;
        let registry = self
            .registry
            .clone()
            .unwrap_or_else(PluginRegistry::with_builtins);
        let sessions = FileSessionManager::new(
            paths::sessions_dir(&self.state_dir, config_path),
            registry.clone(),
        );
        let bus = EventBus::open(paths::event_log_path(&self.state_dir, config_path))?;

        let manager = LifecycleManager::new(ManagerDeps {
            config: Arc::clone(&self.config),
            registry,
            sessions: Arc::new(sessions),
            bus: bus.clone(),
            project: self.project.clone(),
        });
        manager.start(interval);
        info!(
            config = %config_path.display(),
            project = ?self.project,
            "lifecycle runner started"
        );
        self.running = Some(Running { manager, bus });
        Ok(())
    }

    /// Stop polling and drop the manager. Safe to call when stopped.
    pub fn stop(&mut self) {
        if let Some(running) = self.running.take() {
            running.manager.stop();
            info!("lifecycle runner stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn event_bus(&self) -> Option<&EventBus> {
        self.running.as_ref().map(|r| &r.bus)
    }

    pub fn manager(&self) -> Option<&LifecycleManager> {
        self.running.as_ref().map(|r| &r.manager)
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }
}

impl Drop for LifecycleRunner {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
