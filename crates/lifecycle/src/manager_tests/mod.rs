// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ao_adapters::{FakeAgent, FakeNotifyAdapter, FakeRuntime, FakeScm, FakeSessionManager};
use ao_core::{
    ActivityState, EventFilter, FakeClock, PrRef, RuntimeHandle, Session, SessionStatus,
};
use std::path::Path;
use std::sync::atomic::AtomicUsize;

mod polling;
mod reactions;
mod status;

/// Reactions and routing used by most tests.
const CONFIG: &str = r#"
[defaults]
notifiers = ["log"]

[projects.web]
scm = "github"

[projects.docs]

[reactions.ci-failed]
action = "send-to-agent"
message = "CI is failing. Fix it."
retries = 2

[reactions.changes-requested]
action = "send-to-agent"
message = "Address the review comments."
auto = false

[reactions.agent-stuck]
action = "notify"
priority = "urgent"

[reactions.approved-and-green]
action = "auto-merge"

[reactions.all-complete]
action = "notify"

[notification_routing]
urgent = ["pager"]
"#;

struct Harness {
    sessions: FakeSessionManager,
    runtime: FakeRuntime,
    agent: FakeAgent,
    scm: FakeScm,
    pager: FakeNotifyAdapter,
    log: FakeNotifyAdapter,
    clock: FakeClock,
    bus: EventBus,
    manager: LifecycleManager<FakeClock>,
}

impl Harness {
    /// Every plugin slot filled with a fake, `CONFIG` loaded.
    fn new() -> Self {
        Self::with_config(CONFIG)
    }

    fn with_config(text: &str) -> Self {
        Self::build(text, true, None)
    }

    /// No plugins at all and the builtin reactions.
    fn bare() -> Self {
        Self::build("", false, None)
    }

    fn scoped(project: &str) -> Self {
        Self::build(CONFIG, true, Some(ProjectId::new(project)))
    }

    fn build(text: &str, plugins: bool, project: Option<ProjectId>) -> Self {
        let config = OrchestratorConfig::parse(text, Path::new("/tmp/ao.toml")).unwrap();
        let sessions = FakeSessionManager::new();
        let runtime = FakeRuntime::new();
        let agent = FakeAgent::new();
        let scm = FakeScm::new();
        let pager = FakeNotifyAdapter::new();
        let log = FakeNotifyAdapter::new();
        let clock = FakeClock::new();
        let bus = EventBus::in_memory();

        let registry = if plugins {
            PluginRegistry::new()
                .with_runtime("tmux", runtime.clone())
                .with_agent("claude", agent.clone())
                .with_scm("github", scm.clone())
                .with_notifier("pager", pager.clone())
                .with_notifier("log", log.clone())
        } else {
            PluginRegistry::new()
        };

        let manager = LifecycleManager::with_clock(
            ManagerDeps {
                config: Arc::new(config),
                registry,
                sessions: Arc::new(sessions.clone()),
                bus: bus.clone(),
                project,
            },
            clock.clone(),
        );

        Self {
            sessions,
            runtime,
            agent,
            scm,
            pager,
            log,
            clock,
            bus,
            manager,
        }
    }

    fn add(&self, session: Session) {
        self.sessions.insert(session);
    }

    async fn poll(&self) {
        assert!(self.manager.poll_all().await, "poll cycle was skipped");
    }

    fn status(&self, id: &str) -> Option<SessionStatus> {
        self.manager.states().get(&SessionId::new(id)).copied()
    }

    fn events(&self) -> Vec<OrchestratorEvent> {
        self.bus.history(&EventFilter::new())
    }

    fn event_types(&self) -> Vec<EventType> {
        self.events().iter().map(|e| e.event_type).collect()
    }

    fn events_of(&self, event_type: EventType) -> Vec<OrchestratorEvent> {
        self.bus.history(&EventFilter::new().event_type(event_type))
    }
}

/// A live session in project `web` with a tmux handle.
fn session(id: &str, status: SessionStatus) -> Session {
    Session::new(id, "web", &FakeClock::new())
        .with_status(status)
        .with_activity(ActivityState::Active)
        .with_runtime_handle(RuntimeHandle::new("tmux", id))
}

fn pr_session(id: &str, number: u64, status: SessionStatus) -> Session {
    session(id, status).with_pr(PrRef::new(number))
}

fn counter() -> (Arc<AtomicUsize>, Listener) {
    let count = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&count);
    let listener: Listener = Arc::new(move |_: &OrchestratorEvent| {
        seen.fetch_add(1, Ordering::SeqCst);
    });
    (count, listener)
}

#[tokio::test]
async fn check_unknown_session_is_an_error() {
    let h = Harness::new();
    let err = h.manager.check(&SessionId::new("ghost")).await.unwrap_err();
    assert!(matches!(err, LifecycleError::SessionNotFound(id) if id == "ghost"));
    assert!(h.events().is_empty());
}

#[tokio::test]
async fn check_surfaces_session_manager_failures() {
    let h = Harness::new();
    h.add(session("s1", SessionStatus::Spawning));
    h.sessions.fail_get("s1", "disk on fire");
    let err = h.manager.check(&SessionId::new("s1")).await.unwrap_err();
    assert!(matches!(err, LifecycleError::Sessions(_)));
}

#[tokio::test]
async fn check_runs_one_session_out_of_band() {
    let h = Harness::new();
    h.add(session("s1", SessionStatus::Spawning));
    h.add(session("s2", SessionStatus::Spawning));

    let status = h.manager.check(&SessionId::new("s1")).await.unwrap();

    assert_eq!(status, SessionStatus::Working);
    assert_eq!(h.status("s1"), Some(SessionStatus::Working));
    assert_eq!(h.status("s2"), None);
    assert_eq!(h.event_types(), vec![EventType::SessionWorking]);
}

#[tokio::test]
async fn check_ignores_the_poll_guard() {
    let h = Harness::new();
    h.add(session("s1", SessionStatus::Spawning));
    h.manager.inner.polling.store(true, Ordering::SeqCst);
    assert!(!h.manager.poll_all().await);
    assert_eq!(
        h.manager.check(&SessionId::new("s1")).await.unwrap(),
        SessionStatus::Working
    );
}

#[tokio::test]
async fn states_is_a_snapshot() {
    let h = Harness::new();
    h.add(session("s1", SessionStatus::Spawning));
    h.poll().await;

    let mut states = h.manager.states();
    states.insert(SessionId::new("s1"), SessionStatus::Killed);
    states.insert(SessionId::new("s9"), SessionStatus::Working);

    assert_eq!(h.status("s1"), Some(SessionStatus::Working));
    assert_eq!(h.manager.states().len(), 1);
}

#[tokio::test]
async fn local_listeners_see_manager_events() {
    let h = Harness::new();
    let (typed, typed_listener) = counter();
    let (all, all_listener) = counter();
    h.manager.on(EventType::SessionWorking, typed_listener);
    h.manager.on(Topic::All, all_listener);

    h.add(session("s1", SessionStatus::Spawning));
    h.poll().await;

    assert_eq!(typed.load(Ordering::SeqCst), 1);
    assert_eq!(all.load(Ordering::SeqCst), 1);
    assert_eq!(h.bus.len(), 1);
}

#[tokio::test]
async fn local_listeners_ignore_events_emitted_elsewhere() {
    let h = Harness::new();
    let (count, listener) = counter();
    h.manager.on(Topic::All, listener);

    h.bus.emit(OrchestratorEvent::new(
        EventType::SessionSpawned,
        "s1",
        "web",
        "spawned by someone else",
        h.clock.now(),
    ));

    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn off_unsubscribes_and_tolerates_strangers() {
    let h = Harness::new();
    let (count, listener) = counter();
    let (_, stranger) = counter();
    h.manager.on(Topic::All, Arc::clone(&listener));
    h.manager.on(Topic::All, Arc::clone(&listener));
    h.manager.off(Topic::All, &stranger);

    h.add(session("s1", SessionStatus::Spawning));
    h.poll().await;
    assert_eq!(count.load(Ordering::SeqCst), 1);

    h.manager.off(Topic::All, &listener);
    h.sessions.set_activity("s1", ActivityState::Blocked);
    h.poll().await;
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(h.status("s1"), Some(SessionStatus::Stuck));
}
