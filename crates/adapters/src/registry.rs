// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed plugin registry: one name → implementation map per capability slot

use crate::agent::{AgentAdapter, ClaudeAgent};
use crate::notify::{DesktopNotifyAdapter, NoOpNotifyAdapter, NotifyAdapter};
use crate::runtime::{ProcessRuntime, RuntimeAdapter, TmuxRuntime};
use crate::scm::{GitHubScm, ScmAdapter};
use crate::traced::{TracedRuntime, TracedScm};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Capability slot a plugin fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginSlot {
    Runtime,
    Agent,
    Scm,
    Notifier,
}

impl fmt::Display for PluginSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PluginSlot::Runtime => "runtime",
            PluginSlot::Agent => "agent",
            PluginSlot::Scm => "scm",
            PluginSlot::Notifier => "notifier",
        })
    }
}

/// Registry of plugin implementations.
///
/// Lookups return `None` for an unregistered name; callers decide whether
/// absence is fatal. Cloning shares the implementations.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    runtimes: HashMap<String, Arc<dyn RuntimeAdapter>>,
    agents: HashMap<String, Arc<dyn AgentAdapter>>,
    scms: HashMap<String, Arc<dyn ScmAdapter>>,
    notifiers: HashMap<String, Arc<dyn NotifyAdapter>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the builtin plugins: runtimes `tmux` and `process`,
    /// agent `claude`, scm `github`, notifiers `desktop` and `noop`.
    pub fn with_builtins() -> Self {
        Self::new()
            .with_runtime("tmux", TracedRuntime::new("tmux", TmuxRuntime::new()))
            .with_runtime("process", TracedRuntime::new("process", ProcessRuntime::new()))
            .with_agent("claude", ClaudeAgent::new())
            .with_scm("github", TracedScm::new("github", GitHubScm::new()))
            .with_notifier("desktop", DesktopNotifyAdapter::new())
            .with_notifier("noop", NoOpNotifyAdapter::new())
    }

    pub fn with_runtime(mut self, name: &str, runtime: impl RuntimeAdapter) -> Self {
        self.runtimes.insert(name.to_string(), Arc::new(runtime));
        self
    }

    pub fn with_agent(mut self, name: &str, agent: impl AgentAdapter) -> Self {
        self.agents.insert(name.to_string(), Arc::new(agent));
        self
    }

    pub fn with_scm(mut self, name: &str, scm: impl ScmAdapter) -> Self {
        self.scms.insert(name.to_string(), Arc::new(scm));
        self
    }

    pub fn with_notifier(mut self, name: &str, notifier: impl NotifyAdapter) -> Self {
        self.notifiers.insert(name.to_string(), Arc::new(notifier));
        self
    }

    pub fn runtime(&self, name: &str) -> Option<Arc<dyn RuntimeAdapter>> {
        self.runtimes.get(name).cloned()
    }

    pub fn agent(&self, name: &str) -> Option<Arc<dyn AgentAdapter>> {
        self.agents.get(name).cloned()
    }

    pub fn scm(&self, name: &str) -> Option<Arc<dyn ScmAdapter>> {
        self.scms.get(name).cloned()
    }

    pub fn notifier(&self, name: &str) -> Option<Arc<dyn NotifyAdapter>> {
        self.notifiers.get(name).cloned()
    }

    pub fn contains(&self, slot: PluginSlot, name: &str) -> bool {
        match slot {
            PluginSlot::Runtime => self.runtimes.contains_key(name),
            PluginSlot::Agent => self.agents.contains_key(name),
            PluginSlot::Scm => self.scms.contains_key(name),
            PluginSlot::Notifier => self.notifiers.contains_key(name),
        }
    }

    /// Registered names in a slot, sorted.
    pub fn names(&self, slot: PluginSlot) -> Vec<String> {
        let mut names: Vec<String> = match slot {
            PluginSlot::Runtime => self.runtimes.keys().cloned().collect(),
            PluginSlot::Agent => self.agents.keys().cloned().collect(),
            PluginSlot::Scm => self.scms.keys().cloned().collect(),
            PluginSlot::Notifier => self.notifiers.keys().cloned().collect(),
        };
        names.sort();
        names
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
