// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reaction execution, escalation and human notification.

use super::LifecycleManager;
use ao_core::{
    Clock, EventPriority, EventType, OrchestratorEvent, ReactionAction, ReactionConfig,
};
use tracing::{info, warn};

/// Outcome of one reaction attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionResult {
    pub reaction_key: String,
    pub action: ReactionAction,
    /// False only when a message could not be delivered to the agent.
    pub success: bool,
    pub escalated: bool,
}

impl<C: Clock> LifecycleManager<C> {
    /// Record an attempt for `(event.session_id, key)` and either escalate
    /// to humans or perform the configured action.
    ///
    /// Returns `None` when the reaction has no action.
    pub(super) async fn execute_reaction(
        &self,
        key: &str,
        reaction: &ReactionConfig,
        event: &OrchestratorEvent,
    ) -> Option<ReactionResult> {
        let action = reaction.action?;
        let session_id = &event.session_id;
        let now = self.inner.clock.now();
        let tracker = self
            .inner
            .state
            .lock()
            .trackers
            .record_attempt(session_id, key, now);

        let result = |success, escalated| ReactionResult {
            reaction_key: key.to_string(),
            action,
            success,
            escalated,
        };

        if reaction.should_escalate(&tracker, now) {
            let priority = reaction.priority.unwrap_or(EventPriority::Urgent);
            warn!(
                session_id = %session_id,
                reaction = key,
                attempts = tracker.attempts,
                "reaction escalated to humans"
            );
            self.inner
                .state
                .lock()
                .trackers
                .set_pending_retry(session_id, key, false);
            let escalation = OrchestratorEvent::new(
                EventType::ReactionEscalated,
                session_id.clone(),
                event.project_id.clone(),
                format!(
                    "Reaction '{}' escalated after {} attempts: {}",
                    key, tracker.attempts, event.message
                ),
                now,
            )
            .with_priority(priority)
            .with_data("reaction", key)
            .with_data("attempts", tracker.attempts)
            .with_data("trigger", event.event_type.as_str());
            self.emit(escalation.clone());
            self.notify_humans(&escalation, priority).await;
            return Some(result(true, true));
        }

        match action {
            ReactionAction::SendToAgent => {
                let message = reaction.message.as_deref().unwrap_or(&event.message);
                match self.inner.deps.sessions.send(session_id, message).await {
                    Ok(()) => {
                        info!(
                            session_id = %session_id,
                            reaction = key,
                            attempts = tracker.attempts,
                            "sent reaction message to agent"
                        );
                        self.inner
                            .state
                            .lock()
                            .trackers
                            .set_pending_retry(session_id, key, false);
                        self.emit(
                            OrchestratorEvent::new(
                                EventType::ReactionTriggered,
                                session_id.clone(),
                                event.project_id.clone(),
                                format!("Reaction '{}' sent to agent", key),
                                now,
                            )
                            .with_data("reaction", key)
                            .with_data("attempts", tracker.attempts),
                        );
                        Some(result(true, false))
                    }
                    Err(e) => {
                        warn!(
                            session_id = %session_id,
                            reaction = key,
                            error = %e,
                            "failed to send reaction message, will retry next poll"
                        );
                        self.inner
                            .state
                            .lock()
                            .trackers
                            .set_pending_retry(session_id, key, true);
                        Some(result(false, false))
                    }
                }
            }
            ReactionAction::Notify => {
                let priority = reaction.priority.unwrap_or(EventPriority::Info);
                self.notify_humans(event, priority).await;
                Some(result(true, false))
            }
            ReactionAction::AutoMerge => {
                // Merging is left to a human for now.
                self.notify_humans(event, EventPriority::Action).await;
                Some(result(true, false))
            }
        }
    }

    /// Best-effort delivery to every notifier routed for `priority`.
    pub(super) async fn notify_humans(&self, event: &OrchestratorEvent, priority: EventPriority) {
        let event = event.clone().with_priority(priority);
        let deps = &self.inner.deps;
        for name in deps.config.notifiers_for(priority) {
            let Some(notifier) = deps.registry.notifier(name) else {
                warn!(notifier = %name, "no notifier plugin with this name");
                continue;
            };
            if let Err(e) = notifier.notify(&event).await {
                warn!(notifier = %name, event_type = %event.event_type, error = %e, "notification failed");
            }
        }
    }
}
