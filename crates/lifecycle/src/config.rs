// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orchestrator configuration (TOML)

use ao_core::{
    parse_duration, EscalateAfter, EventPriority, ProjectId, ReactionAction, ReactionConfig,
};
use serde::{Deserialize, Deserializer};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Poll interval when neither the config nor the environment sets one.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("unknown project: {0}")]
    UnknownProject(ProjectId),
}

/// Plugin names used when a project does not choose its own.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub runtime: String,
    pub agent: String,
    pub notifiers: Vec<String>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            runtime: "tmux".to_string(),
            agent: "claude".to_string(),
            notifiers: vec!["desktop".to_string()],
        }
    }
}

/// Partial reaction settings layered over the global reaction of the same key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReactionOverride {
    #[serde(default)]
    pub auto: Option<bool>,
    #[serde(default)]
    pub action: Option<ReactionAction>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub retries: Option<u32>,
    #[serde(default)]
    pub escalate_after: Option<EscalateAfter>,
    #[serde(default)]
    pub priority: Option<EventPriority>,
}

impl ReactionOverride {
    fn apply(&self, base: Option<&ReactionConfig>) -> ReactionConfig {
        let mut merged = base.cloned().unwrap_or(ReactionConfig {
            auto: true,
            action: None,
            message: None,
            retries: None,
            escalate_after: None,
            priority: None,
        });
        if let Some(auto) = self.auto {
            merged.auto = auto;
        }
        merged.action = self.action.or(merged.action);
        merged.message = self.message.clone().or(merged.message);
        merged.retries = self.retries.or(merged.retries);
        merged.escalate_after = self.escalate_after.or(merged.escalate_after);
        merged.priority = self.priority.or(merged.priority);
        merged
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub repo: Option<String>,
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// SCM plugin name. Without one, PR signals are not consulted.
    #[serde(default)]
    pub scm: Option<String>,
    /// Agent plugin override.
    #[serde(default)]
    pub agent: Option<String>,
    #[serde(default)]
    pub reactions: HashMap<String, ReactionOverride>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrchestratorConfig {
    #[serde(default, deserialize_with = "optional_duration")]
    pub poll_interval: Option<Duration>,
    #[serde(default)]
    pub state_dir: Option<PathBuf>,
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub projects: BTreeMap<ProjectId, ProjectConfig>,
    #[serde(default = "default_reactions")]
    pub reactions: HashMap<String, ReactionConfig>,
    #[serde(default, deserialize_with = "routing_table")]
    pub notification_routing: HashMap<EventPriority, Vec<String>>,
    /// File this config was loaded from; identifies the config for locks.
    #[serde(skip)]
    pub config_path: PathBuf,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            poll_interval: None,
            state_dir: None,
            defaults: Defaults::default(),
            projects: BTreeMap::new(),
            reactions: default_reactions(),
            notification_routing: HashMap::new(),
            config_path: PathBuf::new(),
        }
    }
}

impl OrchestratorConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.config_path = path.to_path_buf();
        Ok(config)
    }

    pub fn project(&self, id: &ProjectId) -> Result<&ProjectConfig, ConfigError> {
        self.projects
            .get(id)
            .ok_or_else(|| ConfigError::UnknownProject(id.clone()))
    }

    /// Effective reaction for a key: the project override layered over the
    /// global reaction. `None` when neither defines the key.
    pub fn reaction_for(&self, project: &ProjectId, key: &str) -> Option<ReactionConfig> {
        let global = self.reactions.get(key);
        let over = self
            .projects
            .get(project)
            .and_then(|p| p.reactions.get(key));
        match over {
            Some(over) => Some(over.apply(global)),
            None => global.cloned(),
        }
    }

    /// Notifier names for a priority, falling back to the defaults.
    pub fn notifiers_for(&self, priority: EventPriority) -> &[String] {
        self.notification_routing
            .get(&priority)
            .unwrap_or(&self.defaults.notifiers)
    }

    /// Agent plugin for a project, falling back to the default agent.
    pub fn agent_for(&self, project: &ProjectId) -> &str {
        self.projects
            .get(project)
            .and_then(|p| p.agent.as_deref())
            .unwrap_or(&self.defaults.agent)
    }

    pub fn scm_for(&self, project: &ProjectId) -> Option<&str> {
        self.projects.get(project).and_then(|p| p.scm.as_deref())
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL)
    }
}

/// Reactions used when the config has no `[reactions]` table.
pub fn default_reactions() -> HashMap<String, ReactionConfig> {
    let send = |message: &str| {
        ReactionConfig::new(ReactionAction::SendToAgent)
            .with_message(message)
            .with_retries(2)
            .with_escalate_after(EscalateAfter::Elapsed(Duration::from_secs(30 * 60)))
    };
    let notify = |priority| ReactionConfig::new(ReactionAction::Notify).with_priority(priority);

    HashMap::from([
        (
            "ci-failed".to_string(),
            send("CI is failing on your PR. Inspect the failing checks and push a fix."),
        ),
        (
            "changes-requested".to_string(),
            send("A reviewer requested changes on your PR. Address the review comments."),
        ),
        (
            "merge-conflicts".to_string(),
            send("Your PR has merge conflicts. Rebase onto the base branch and resolve them."),
        ),
        (
            "approved-and-green".to_string(),
            notify(EventPriority::Action),
        ),
        ("agent-stuck".to_string(), notify(EventPriority::Urgent)),
        ("agent-needs-input".to_string(), notify(EventPriority::Urgent)),
        ("agent-exited".to_string(), notify(EventPriority::Urgent)),
        ("all-complete".to_string(), notify(EventPriority::Info)),
    ])
}

fn optional_duration<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
    let raw: Option<String> = Option::deserialize(d)?;
    raw.map(|s| parse_duration(&s).map_err(serde::de::Error::custom))
        .transpose()
}

fn routing_table<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<HashMap<EventPriority, Vec<String>>, D::Error> {
    let raw: HashMap<String, Vec<String>> = HashMap::deserialize(d)?;
    raw.into_iter()
        .map(|(key, names)| {
            let priority = match key.as_str() {
                "urgent" => EventPriority::Urgent,
                "action" => EventPriority::Action,
                "warning" => EventPriority::Warning,
                "info" => EventPriority::Info,
                other => {
                    return Err(serde::de::Error::custom(format!(
                        "unknown notification priority {:?}",
                        other
                    )))
                }
            };
            Ok((priority, names))
        })
        .collect()
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
