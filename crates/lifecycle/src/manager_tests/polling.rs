// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ao_adapters::{AgentAdapter, AgentError, SessionCall, SessionManagerError};
use ao_core::PrState;
use async_trait::async_trait;
use tokio::sync::{Barrier, Notify};

fn list_calls(h: &Harness) -> usize {
    h.sessions
        .calls()
        .iter()
        .filter(|c| matches!(c, SessionCall::List))
        .count()
}

async fn wait_until(mut done: impl FnMut() -> bool) {
    for _ in 0..500 {
        if done() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached");
}

/// Session manager whose `list` parks until released.
struct GatedSessions {
    entered: Arc<Notify>,
    release: Arc<Notify>,
}

#[async_trait]
impl SessionManager for GatedSessions {
    async fn list(&self) -> Result<Vec<Session>, SessionManagerError> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(Vec::new())
    }

    async fn get(&self, _id: &SessionId) -> Result<Option<Session>, SessionManagerError> {
        Ok(None)
    }

    async fn send(&self, id: &SessionId, _message: &str) -> Result<(), SessionManagerError> {
        Err(SessionManagerError::NotFound(id.clone()))
    }

    async fn update_status(
        &self,
        id: &SessionId,
        _status: SessionStatus,
    ) -> Result<(), SessionManagerError> {
        Err(SessionManagerError::NotFound(id.clone()))
    }
}

/// Agent that panics for one session and waits on a barrier for the rest.
struct RendezvousAgent {
    barrier: Barrier,
}

#[async_trait]
impl AgentAdapter for RendezvousAgent {
    async fn detect_activity(&self, session: &Session) -> Result<ActivityState, AgentError> {
        if session.id == "bad" {
            panic!("agent plugin bug");
        }
        self.barrier.wait().await;
        Ok(ActivityState::Active)
    }
}

fn manager_with(
    sessions: Arc<dyn SessionManager>,
    registry: PluginRegistry,
) -> LifecycleManager<FakeClock> {
    LifecycleManager::with_clock(
        ManagerDeps {
            config: Arc::new(OrchestratorConfig::default()),
            registry,
            sessions,
            bus: EventBus::in_memory(),
            project: None,
        },
        FakeClock::new(),
    )
}

#[tokio::test]
async fn spawning_session_emits_working_exactly_once() {
    let h = Harness::bare();
    h.add(session("s1", SessionStatus::Spawning));

    h.poll().await;
    assert_eq!(h.status("s1"), Some(SessionStatus::Working));
    assert_eq!(h.event_types(), vec![EventType::SessionWorking]);

    let event = &h.events()[0];
    assert_eq!(event.session_id, "s1");
    assert_eq!(event.project_id, "web");
    assert_eq!(event.data["from"], "spawning");
    assert_eq!(event.data["to"], "working");

    h.poll().await;
    assert_eq!(h.events().len(), 1);
}

#[tokio::test]
async fn first_sighting_without_change_is_recorded_silently() {
    let h = Harness::new();
    h.add(session("s1", SessionStatus::Working));
    h.poll().await;
    assert_eq!(h.status("s1"), Some(SessionStatus::Working));
    assert!(h.events().is_empty());
}

#[tokio::test]
async fn transitions_are_written_back() {
    let h = Harness::new();
    h.add(session("s1", SessionStatus::Spawning));
    h.poll().await;
    assert_eq!(
        h.sessions.status_updates(),
        vec![(SessionId::new("s1"), SessionStatus::Working)]
    );
    assert_eq!(
        h.sessions.session("s1").map(|s| s.status),
        Some(SessionStatus::Working)
    );
}

#[tokio::test]
async fn overlapping_poll_is_dropped() {
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let manager = manager_with(
        Arc::new(GatedSessions {
            entered: Arc::clone(&entered),
            release: Arc::clone(&release),
        }),
        PluginRegistry::new(),
    );

    let first = tokio::spawn({
        let manager = manager.clone();
        async move { manager.poll_all().await }
    });
    entered.notified().await;

    assert!(!manager.poll_all().await);

    release.notify_one();
    assert!(first.await.unwrap());

    // The guard is cleared once the cycle ends.
    release.notify_one();
    assert!(manager.poll_all().await);
}

#[tokio::test]
async fn sessions_are_checked_concurrently() {
    let sessions = FakeSessionManager::new();
    sessions.insert(session("a", SessionStatus::Spawning));
    sessions.insert(session("b", SessionStatus::Spawning));
    let registry = PluginRegistry::new().with_agent(
        "claude",
        RendezvousAgent {
            barrier: Barrier::new(2),
        },
    );
    let manager = manager_with(Arc::new(sessions), registry);

    // Sequential checks would never get past the barrier.
    tokio::time::timeout(Duration::from_secs(5), manager.poll_all())
        .await
        .unwrap();

    assert_eq!(manager.states().len(), 2);
}

#[tokio::test]
async fn one_failing_check_does_not_affect_others() {
    let sessions = FakeSessionManager::new();
    sessions.insert(session("bad", SessionStatus::Spawning));
    sessions.insert(session("good", SessionStatus::Spawning));
    let registry = PluginRegistry::new().with_agent(
        "claude",
        RendezvousAgent {
            barrier: Barrier::new(1),
        },
    );
    let manager = manager_with(Arc::new(sessions), registry);

    assert!(manager.poll_all().await);

    let states = manager.states();
    assert_eq!(states.get(&SessionId::new("good")), Some(&SessionStatus::Working));
    assert_eq!(states.get(&SessionId::new("bad")), None);

    // The guard was released despite the panic.
    assert!(manager.poll_all().await);
}

#[tokio::test]
async fn list_failure_ends_the_cycle_quietly() {
    let h = Harness::new();
    h.add(session("s1", SessionStatus::Spawning));
    h.sessions.fail_list(Some("store locked"));

    h.poll().await;
    assert!(h.manager.states().is_empty());
    assert!(h.events().is_empty());

    h.sessions.fail_list(None);
    h.poll().await;
    assert_eq!(h.status("s1"), Some(SessionStatus::Working));
}

#[tokio::test]
async fn terminal_sessions_are_checked_once() {
    let h = Harness::new();
    h.add(session("s1", SessionStatus::Killed));

    h.poll().await;
    h.poll().await;

    assert_eq!(h.agent.calls().len(), 1);
    assert_eq!(h.status("s1"), Some(SessionStatus::Killed));
}

#[tokio::test]
async fn externally_completed_session_emits_final_transition() {
    let h = Harness::new();
    h.add(session("s1", SessionStatus::Working));
    h.poll().await;

    h.sessions.set_status("s1", SessionStatus::Merged);
    h.poll().await;
    h.poll().await;

    assert_eq!(h.status("s1"), Some(SessionStatus::Merged));
    assert_eq!(h.events_of(EventType::MergeCompleted).len(), 1);
}

#[tokio::test]
async fn all_complete_fires_once_per_batch() {
    let h = Harness::new();
    h.add(pr_session("s1", 1, SessionStatus::Approved));
    h.add(session("s2", SessionStatus::Working));
    h.scm.set_pr_state(1, PrState::Merged);
    h.runtime.set_alive("s2", false);

    h.poll().await;
    h.poll().await;

    let summaries = h.events_of(EventType::SummaryAllComplete);
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].session_id, SYSTEM_SESSION);
    assert_eq!(summaries[0].data["sessions"], 2);
    // Emitted after the per-session transitions of the same cycle.
    assert_eq!(h.event_types().last(), Some(&EventType::SummaryAllComplete));
}

#[tokio::test]
async fn all_complete_rearms_when_new_work_appears() {
    let h = Harness::new();
    h.add(session("s1", SessionStatus::Working));
    h.runtime.set_alive("s1", false);
    h.poll().await;
    assert_eq!(h.events_of(EventType::SummaryAllComplete).len(), 1);

    h.add(session("s2", SessionStatus::Spawning));
    h.poll().await;
    assert_eq!(h.events_of(EventType::SummaryAllComplete).len(), 1);

    h.runtime.set_alive("s2", false);
    h.poll().await;
    assert_eq!(h.events_of(EventType::SummaryAllComplete).len(), 2);
}

#[tokio::test]
async fn no_sessions_means_no_summary() {
    let h = Harness::new();
    h.poll().await;
    assert!(h.events().is_empty());
}

#[tokio::test]
async fn scoped_manager_only_polls_its_project() {
    let h = Harness::scoped("web");
    h.add(session("a", SessionStatus::Spawning));
    h.add(Session {
        project_id: ProjectId::new("docs"),
        ..session("b", SessionStatus::Spawning)
    });

    h.poll().await;

    assert_eq!(h.status("a"), Some(SessionStatus::Working));
    assert_eq!(h.status("b"), None);
}

#[tokio::test]
async fn start_twice_runs_one_timer() {
    let h = Harness::new();
    h.manager.start(Duration::from_secs(3600));
    h.manager.start(Duration::from_secs(3600));
    assert!(h.manager.is_running());

    wait_until(|| list_calls(&h) >= 1).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(list_calls(&h), 1);

    h.manager.stop();
    h.manager.stop();
    assert!(!h.manager.is_running());
}

#[tokio::test]
async fn stop_halts_polling() {
    let h = Harness::new();
    h.manager.start(Duration::from_millis(10));
    wait_until(|| list_calls(&h) >= 2).await;

    h.manager.stop();
    tokio::time::sleep(Duration::from_millis(30)).await;
    let after_stop = list_calls(&h);
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(list_calls(&h), after_stop);

    h.manager.start(Duration::from_millis(10));
    wait_until(|| list_calls(&h) > after_stop).await;
    h.manager.stop();
}

#[tokio::test]
async fn start_polls_immediately() {
    let h = Harness::new();
    h.add(session("s1", SessionStatus::Spawning));
    h.manager.start(Duration::from_secs(3600));
    wait_until(|| h.status("s1") == Some(SessionStatus::Working)).await;
    h.manager.stop();
}
