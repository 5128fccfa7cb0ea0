// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status determination and the status/event/reaction tables.

use super::LifecycleManager;
use ao_adapters::{ScmAdapter, ScmError};
use ao_core::{
    ActivityState, CiStatus, Clock, EventType, PrRef, PrState, ReviewDecision, Session,
    SessionStatus,
};
use tracing::{debug, warn};

/// Event emitted when a session enters `status`. `Spawning` emits nothing.
pub fn event_for_status(status: SessionStatus) -> Option<EventType> {
    let event_type = match status {
        SessionStatus::Spawning => return None,
        SessionStatus::Working => EventType::SessionWorking,
        SessionStatus::PrOpen => EventType::PrCreated,
        SessionStatus::CiFailed => EventType::CiFailing,
        SessionStatus::ReviewPending => EventType::ReviewPending,
        SessionStatus::ChangesRequested => EventType::ReviewChangesRequested,
        SessionStatus::Approved => EventType::ReviewApproved,
        SessionStatus::Mergeable => EventType::MergeReady,
        SessionStatus::Merged => EventType::MergeCompleted,
        SessionStatus::NeedsInput => EventType::SessionNeedsInput,
        SessionStatus::Stuck => EventType::SessionStuck,
        SessionStatus::Errored => EventType::SessionErrored,
        SessionStatus::Killed => EventType::SessionKilled,
    };
    Some(event_type)
}

/// Configuration key of the reaction an event triggers.
pub fn reaction_key_for_event(event_type: EventType) -> Option<&'static str> {
    match event_type {
        EventType::CiFailing => Some("ci-failed"),
        EventType::ReviewChangesRequested => Some("changes-requested"),
        EventType::MergeConflicts => Some("merge-conflicts"),
        EventType::MergeReady => Some("approved-and-green"),
        EventType::SessionStuck => Some("agent-stuck"),
        EventType::SessionNeedsInput => Some("agent-needs-input"),
        EventType::SessionKilled => Some("agent-exited"),
        EventType::SummaryAllComplete => Some("all-complete"),
        _ => None,
    }
}

pub fn reaction_key_for_status(status: SessionStatus) -> Option<&'static str> {
    event_for_status(status).and_then(reaction_key_for_event)
}

fn status_for_activity(activity: ActivityState) -> Option<SessionStatus> {
    match activity {
        ActivityState::Exited => Some(SessionStatus::Killed),
        ActivityState::Blocked => Some(SessionStatus::Stuck),
        ActivityState::WaitingInput => Some(SessionStatus::NeedsInput),
        ActivityState::Active | ActivityState::Idle | ActivityState::Unknown => None,
    }
}

async fn pr_status(scm: &dyn ScmAdapter, pr: &PrRef) -> Result<SessionStatus, ScmError> {
    match scm.pr_state(pr).await? {
        PrState::Merged => return Ok(SessionStatus::Merged),
        PrState::Closed => return Ok(SessionStatus::Killed),
        PrState::Open => {}
    }
    if scm.ci_summary(pr).await? == CiStatus::Failing {
        return Ok(SessionStatus::CiFailed);
    }
    let status = match scm.review_decision(pr).await? {
        ReviewDecision::ChangesRequested => SessionStatus::ChangesRequested,
        ReviewDecision::Approved if scm.mergeability(pr).await?.mergeable => {
            SessionStatus::Mergeable
        }
        ReviewDecision::Approved => SessionStatus::Approved,
        ReviewDecision::Pending => SessionStatus::ReviewPending,
        ReviewDecision::None => SessionStatus::PrOpen,
    };
    Ok(status)
}

impl<C: Clock> LifecycleManager<C> {
    /// First match wins: runtime liveness, agent activity, PR signals, then
    /// promotion out of `Spawning`.
    ///
    /// Collaborator failures never surface: a failed liveness probe counts
    /// as alive, a failed activity probe falls back to the recorded
    /// activity, and any SCM failure keeps the current status.
    pub(super) async fn determine_status(&self, session: &Session) -> SessionStatus {
        let current = session.status;
        let deps = &self.inner.deps;

        if let Some(handle) = &session.runtime_handle {
            if let Some(runtime) = deps.registry.runtime(&handle.runtime) {
                match runtime.is_alive(handle).await {
                    Ok(false) => return SessionStatus::Killed,
                    Ok(true) => {}
                    Err(e) => {
                        debug!(session_id = %session.id, error = %e, "liveness probe failed, assuming alive");
                    }
                }
            }
        }

        if let Some(agent) = deps.registry.agent(deps.config.agent_for(&session.project_id)) {
            let activity = match agent.detect_activity(session).await {
                Ok(activity) => activity,
                Err(e) => {
                    debug!(session_id = %session.id, error = %e, "activity detection failed");
                    session.activity
                }
            };
            if let Some(status) = status_for_activity(activity) {
                return status;
            }
        }

        let scm = deps
            .config
            .scm_for(&session.project_id)
            .and_then(|name| deps.registry.scm(name));
        if let (Some(pr), Some(scm)) = (&session.pr, scm) {
            return match pr_status(scm.as_ref(), pr).await {
                Ok(status) => status,
                Err(e) => {
                    warn!(
                        session_id = %session.id,
                        pr = pr.number,
                        error = %e,
                        "scm check failed, keeping status {}",
                        current
                    );
                    current
                }
            };
        }

        match current {
            SessionStatus::Spawning => SessionStatus::Working,
            other => other,
        }
    }
}
