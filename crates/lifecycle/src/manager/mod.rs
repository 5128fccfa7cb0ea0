// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle manager: polls sessions, tracks their status and drives
//! reactions.
//!
//! All mutable state (last-known statuses, reaction trackers, the
//! all-complete flag) sits behind one mutex that is never held across an
//! `.await`. A transition is decided by swapping the status entry under
//! that lock, so two checks of the same session cannot both observe the
//! same transition.

mod reaction;
mod status;

pub use reaction::ReactionResult;
pub use status::{event_for_status, reaction_key_for_event, reaction_key_for_status};

use crate::config::OrchestratorConfig;
use crate::error::LifecycleError;
use crate::event_bus::{EventBus, Listener, ListenerSet, Topic};
use ao_adapters::{PluginRegistry, SessionManager};
use ao_core::{
    Clock, EventType, OrchestratorEvent, ProjectId, ReactionTracker, ReactionTrackers, Session,
    SessionId, SessionStatus, SystemClock,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Pseudo-session that owns summary events and the all-complete reaction.
pub const SYSTEM_SESSION: &str = "system";

/// Everything the manager needs from its host.
#[derive(Clone)]
pub struct ManagerDeps {
    pub config: Arc<OrchestratorConfig>,
    pub registry: PluginRegistry,
    pub sessions: Arc<dyn SessionManager>,
    pub bus: EventBus,
    /// Restrict polling to one project's sessions.
    pub project: Option<ProjectId>,
}

#[derive(Default)]
struct ManagerState {
    statuses: HashMap<SessionId, SessionStatus>,
    trackers: ReactionTrackers,
    all_complete_emitted: bool,
}

struct Inner<C: Clock> {
    deps: ManagerDeps,
    clock: C,
    state: Mutex<ManagerState>,
    polling: AtomicBool,
    listeners: ListenerSet,
    timer: Mutex<Option<JoinHandle<()>>>,
}

/// Handle to a lifecycle manager. Clones share state.
pub struct LifecycleManager<C: Clock = SystemClock> {
    inner: Arc<Inner<C>>,
}

impl<C: Clock> Clone for LifecycleManager<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Clears the re-entrancy flag when a poll cycle ends, however it ends.
struct PollGuard<'a>(&'a AtomicBool);

impl Drop for PollGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl LifecycleManager<SystemClock> {
    pub fn new(deps: ManagerDeps) -> Self {
        Self::with_clock(deps, SystemClock)
    }
}

impl<C: Clock> LifecycleManager<C> {
    pub fn with_clock(deps: ManagerDeps, clock: C) -> Self {
        Self {
            inner: Arc::new(Inner {
                deps,
                clock,
                state: Mutex::new(ManagerState::default()),
                polling: AtomicBool::new(false),
                listeners: ListenerSet::default(),
                timer: Mutex::new(None),
            }),
        }
    }

    fn from_inner(inner: Arc<Inner<C>>) -> Self {
        Self { inner }
    }

    /// Begin polling every `interval`, starting with an immediate cycle.
    ///
    /// Calling `start` on a running manager does nothing. Must be called
    /// from within a tokio runtime.
    pub fn start(&self, interval: Duration) {
        let mut timer = self.inner.timer.lock();
        if timer.is_some() {
            debug!("lifecycle manager already started");
            return;
        }
        // tokio intervals reject a zero period
        let interval = interval.max(Duration::from_millis(1));
        let weak: Weak<Inner<C>> = Arc::downgrade(&self.inner);
        *timer = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                let manager = LifecycleManager::from_inner(inner);
                tokio::spawn(async move {
                    manager.poll_all().await;
                });
            }
        }));
        info!(interval_ms = interval.as_millis() as u64, "lifecycle polling started");
    }

    /// Stop the poll timer. A cycle already in flight runs to completion.
    pub fn stop(&self) {
        if let Some(handle) = self.inner.timer.lock().take() {
            handle.abort();
            info!("lifecycle polling stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.timer.lock().is_some()
    }

    /// Run one poll cycle over every session in scope.
    ///
    /// Returns false without doing anything when another cycle is in
    /// flight.
    pub async fn poll_all(&self) -> bool {
        if self
            .inner
            .polling
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("poll cycle already in flight, skipping tick");
            return false;
        }
        let _guard = PollGuard(&self.inner.polling);
        self.run_cycle().await;
        true
    }

    async fn run_cycle(&self) {
        let sessions: Vec<Session> = match self.inner.deps.sessions.list().await {
            Ok(sessions) => sessions.into_iter().filter(|s| self.in_scope(s)).collect(),
            Err(e) => {
                warn!(error = %e, "failed to list sessions");
                return;
            }
        };

        // Terminal sessions are only checked while their reported status
        // still differs from what we last saw.
        let selected: Vec<Session> = {
            let state = self.inner.state.lock();
            sessions
                .iter()
                .filter(|s| {
                    !s.status.is_terminal() || state.statuses.get(&s.id) != Some(&s.status)
                })
                .cloned()
                .collect()
        };
        debug!(total = sessions.len(), selected = selected.len(), "poll cycle");

        let mut checks = JoinSet::new();
        for session in selected {
            let manager = self.clone();
            checks.spawn(async move { manager.check_session(session).await });
        }
        while let Some(joined) = checks.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "session check task failed");
            }
        }

        self.update_all_complete(&sessions).await;
    }

    async fn update_all_complete(&self, sessions: &[Session]) {
        let fire = {
            let mut state = self.inner.state.lock();
            let all_terminal = !sessions.is_empty()
                && sessions.iter().all(|s| {
                    state
                        .statuses
                        .get(&s.id)
                        .copied()
                        .unwrap_or(s.status)
                        .is_terminal()
                });
            if all_terminal {
                !std::mem::replace(&mut state.all_complete_emitted, true)
            } else {
                state.all_complete_emitted = false;
                false
            }
        };
        if !fire {
            return;
        }

        let project = self
            .inner
            .deps
            .project
            .clone()
            .or_else(|| sessions.first().map(|s| s.project_id.clone()))
            .unwrap_or_else(|| ProjectId::new(SYSTEM_SESSION));
        let event = OrchestratorEvent::new(
            EventType::SummaryAllComplete,
            SYSTEM_SESSION,
            project.clone(),
            format!("All {} sessions are complete", sessions.len()),
            self.inner.clock.now(),
        )
        .with_data("sessions", sessions.len());
        info!(sessions = sessions.len(), "all sessions complete");
        self.emit(event.clone());
        self.react(&project, &event).await;
    }

    /// Check one session now, outside the poll cycle.
    pub async fn check(&self, id: &SessionId) -> Result<SessionStatus, LifecycleError> {
        let session = self
            .inner
            .deps
            .sessions
            .get(id)
            .await?
            .ok_or_else(|| LifecycleError::SessionNotFound(id.clone()))?;
        let reported = session.status;
        self.check_session(session).await;
        let state = self.inner.state.lock();
        Ok(state.statuses.get(id).copied().unwrap_or(reported))
    }

    async fn check_session(&self, session: Session) {
        let new_status = self.determine_status(&session).await;

        let (previous, retry) = {
            let mut state = self.inner.state.lock();
            let previous = state
                .statuses
                .insert(session.id.clone(), new_status)
                .unwrap_or(session.status);
            if previous == new_status {
                let retry = reaction_key_for_status(new_status).filter(|key| {
                    state
                        .trackers
                        .get(&session.id, key)
                        .is_some_and(|t| t.pending_retry)
                });
                (previous, retry)
            } else {
                if !new_status.is_terminal() {
                    state.all_complete_emitted = false;
                }
                if let Some(key) = reaction_key_for_status(previous) {
                    state.trackers.clear(&session.id, key);
                }
                (previous, None)
            }
        };

        if previous == new_status {
            if let (Some(key), Some(event_type)) = (retry, event_for_status(new_status)) {
                debug!(session_id = %session.id, reaction = key, "retrying undelivered reaction");
                let event = self.status_event(event_type, &session, previous, new_status);
                self.react(&session.project_id, &event).await;
            }
            return;
        }

        info!(
            session_id = %session.id,
            project_id = %session.project_id,
            from = %previous,
            to = %new_status,
            "session status changed"
        );
        if let Err(e) = self
            .inner
            .deps
            .sessions
            .update_status(&session.id, new_status)
            .await
        {
            warn!(session_id = %session.id, error = %e, "failed to persist session status");
        }

        let Some(event_type) = event_for_status(new_status) else {
            return;
        };
        let event = self.status_event(event_type, &session, previous, new_status);
        self.emit(event.clone());
        self.react(&session.project_id, &event).await;
    }

    fn status_event(
        &self,
        event_type: EventType,
        session: &Session,
        from: SessionStatus,
        to: SessionStatus,
    ) -> OrchestratorEvent {
        OrchestratorEvent::new(
            event_type,
            session.id.clone(),
            session.project_id.clone(),
            format!("Session {} is now {} (was {})", session.id, to, from),
            self.inner.clock.now(),
        )
        .with_data("from", from.as_str())
        .with_data("to", to.as_str())
    }

    /// Run the reaction configured for `event`, if any and if enabled.
    async fn react(&self, project: &ProjectId, event: &OrchestratorEvent) {
        let Some(key) = reaction_key_for_event(event.event_type) else {
            return;
        };
        let Some(reaction) = self.inner.deps.config.reaction_for(project, key) else {
            return;
        };
        if !reaction.auto || reaction.action.is_none() {
            return;
        }
        if let Some(result) = self.execute_reaction(key, &reaction, event).await {
            debug!(
                session_id = %event.session_id,
                reaction = key,
                success = result.success,
                escalated = result.escalated,
                "reaction finished"
            );
        }
    }

    fn in_scope(&self, session: &Session) -> bool {
        self.inner
            .deps
            .project
            .as_ref()
            .is_none_or(|p| *p == session.project_id)
    }

    /// Publish to the shared bus, then to manager-local listeners.
    fn emit(&self, event: OrchestratorEvent) {
        self.inner.deps.bus.emit(event.clone());
        self.inner.listeners.dispatch(&event);
    }

    /// Snapshot of the last-known status of every session seen so far.
    pub fn states(&self) -> HashMap<SessionId, SessionStatus> {
        self.inner.state.lock().statuses.clone()
    }

    pub fn tracker(&self, session_id: &SessionId, reaction_key: &str) -> Option<ReactionTracker> {
        self.inner
            .state
            .lock()
            .trackers
            .get(session_id, reaction_key)
            .cloned()
    }

    pub fn on(&self, topic: impl Into<Topic>, listener: Listener) {
        self.inner.listeners.on(topic.into(), listener);
    }

    pub fn off(&self, topic: impl Into<Topic>, listener: &Listener) {
        self.inner.listeners.off(topic.into(), listener);
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.inner.deps.bus
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.inner.deps.config
    }
}

#[cfg(test)]
#[path = "../manager_tests/mod.rs"]
mod tests;
