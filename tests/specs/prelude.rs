//! Test helpers for behavioral specifications.
//!
//! A `Project` is a temp directory holding an `ao.toml`, a state dir and a
//! set of fake plugins. Runners built from it poll file-backed sessions.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use ao_adapters::{
    FakeAgent, FakeNotifyAdapter, FakeRuntime, FakeScm, FileSessionManager, PluginRegistry,
    SessionManager,
};
use ao_core::{
    EventFilter, EventType, OrchestratorEvent, RuntimeHandle, Session, SessionId, SystemClock,
};
use ao_lifecycle::{paths, EventBus, LifecycleRunner, OrchestratorConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;

// Spec polling timeouts
pub const SPEC_POLL_INTERVAL_MS: u64 = 10;
pub const SPEC_WAIT_MAX_MS: u64 = 3000;

/// Lifecycle poll interval used by every runner in these specs.
pub const LIFECYCLE_POLL: Duration = Duration::from_millis(20);

/// Two projects, one with an SCM, and reactions for the common paths.
pub const CONFIG: &str = r#"
[defaults]
runtime = "tmux"
agent = "claude"
notifiers = ["desk"]

[projects.web]
repo = "acme/web"
scm = "github"

[projects.docs]
repo = "acme/docs"

[reactions.ci-failed]
action = "send-to-agent"
message = "CI is failing. Fix it."
retries = 2

[reactions.approved-and-green]
action = "notify"
priority = "action"

[reactions.agent-stuck]
action = "notify"
priority = "urgent"

[reactions.all-complete]
action = "notify"

[notification_routing]
urgent = ["pager"]
"#;

/// Wait until `condition` holds, polling every [`SPEC_POLL_INTERVAL_MS`].
pub async fn wait_for<F>(timeout_ms: u64, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    let timeout = Duration::from_millis(timeout_ms);
    let poll_interval = Duration::from_millis(SPEC_POLL_INTERVAL_MS);

    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        tokio::time::sleep(poll_interval).await;
    }
    false
}

/// Let a few poll cycles run.
pub async fn settle() {
    tokio::time::sleep(LIFECYCLE_POLL * 5).await;
}

// =============================================================================
// Events
// =============================================================================

pub fn events_of(bus: &EventBus, event_type: EventType) -> Vec<OrchestratorEvent> {
    bus.history(&EventFilter::new().event_type(event_type))
}

pub fn has_event(bus: &EventBus, event_type: EventType) -> bool {
    !events_of(bus, event_type).is_empty()
}

/// Event types recorded for one session, in emission order.
pub fn session_timeline(bus: &EventBus, id: &str) -> Vec<EventType> {
    bus.history(&EventFilter::new().session(id))
        .into_iter()
        .map(|e| e.event_type)
        .collect()
}

// =============================================================================
// Project
// =============================================================================

/// Fakes behind every plugin name the config mentions.
pub struct Plugins {
    pub runtime: FakeRuntime,
    pub agent: FakeAgent,
    pub scm: FakeScm,
    pub desk: FakeNotifyAdapter,
    pub pager: FakeNotifyAdapter,
}

impl Plugins {
    fn new() -> Self {
        Self {
            runtime: FakeRuntime::new(),
            agent: FakeAgent::new(),
            scm: FakeScm::new(),
            desk: FakeNotifyAdapter::new(),
            pager: FakeNotifyAdapter::new(),
        }
    }

    pub fn registry(&self) -> PluginRegistry {
        PluginRegistry::new()
            .with_runtime("tmux", self.runtime.clone())
            .with_agent("claude", self.agent.clone())
            .with_scm("github", self.scm.clone())
            .with_notifier("desk", self.desk.clone())
            .with_notifier("pager", self.pager.clone())
    }
}

/// Temporary orchestrator project with helper methods.
pub struct Project {
    dir: tempfile::TempDir,
    pub plugins: Plugins,
}

impl Project {
    pub fn new() -> Self {
        Self::with_config(CONFIG)
    }

    pub fn with_config(text: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ao.toml"), text).unwrap();
        Self {
            dir,
            plugins: Plugins::new(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.path().join("ao.toml")
    }

    pub fn state_dir(&self) -> PathBuf {
        self.path().join("state")
    }

    pub fn config(&self) -> OrchestratorConfig {
        OrchestratorConfig::load(&self.config_path()).unwrap()
    }

    pub fn event_log_path(&self) -> PathBuf {
        paths::event_log_path(&self.state_dir(), &self.config_path())
    }

    /// The session store a runner for this project reads.
    pub fn sessions(&self) -> FileSessionManager {
        FileSessionManager::new(
            paths::sessions_dir(&self.state_dir(), &self.config_path()),
            self.plugins.registry(),
        )
    }

    pub async fn add(&self, session: Session) {
        self.sessions().save(&session).await.unwrap();
    }

    pub async fn session(&self, id: &str) -> Session {
        self.sessions()
            .get(&SessionId::new(id))
            .await
            .unwrap()
            .unwrap_or_else(|| panic!("no session record for {}", id))
    }

    /// Runner over this project's fakes (not started).
    pub fn runner(&self) -> LifecycleRunner {
        LifecycleRunner::new(self.config(), self.state_dir()).with_registry(self.plugins.registry())
    }

    /// Start a runner and return it with its bus.
    pub fn start(&self) -> (LifecycleRunner, EventBus) {
        let mut runner = self.runner();
        runner.start(LIFECYCLE_POLL).unwrap();
        let bus = runner.event_bus().unwrap().clone();
        (runner, bus)
    }

    /// Parse every line of the event log.
    pub fn logged_events(&self) -> Vec<OrchestratorEvent> {
        std::fs::read_to_string(self.event_log_path())
            .unwrap()
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }
}

/// A freshly spawned session in a tmux pane named `ao-<id>`.
pub fn session(id: &str, project: &str) -> Session {
    Session::new(id, project, &SystemClock)
        .with_runtime_handle(RuntimeHandle::new("tmux", format!("ao-{}", id)))
}
