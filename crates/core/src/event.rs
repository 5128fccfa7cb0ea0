// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle events emitted by the orchestrator.
//!
//! Events are created once and never mutated. On disk they serialize as one
//! JSON object per line with the keys
//! `{"id","type","priority","sessionId","projectId","timestamp","message","data"}`.

use crate::id::EventId;
use crate::session::{ProjectId, SessionId};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    // -- session --
    #[serde(rename = "session.spawned")]
    SessionSpawned,
    #[serde(rename = "session.working")]
    SessionWorking,
    #[serde(rename = "session.needs_input")]
    SessionNeedsInput,
    #[serde(rename = "session.stuck")]
    SessionStuck,
    #[serde(rename = "session.errored")]
    SessionErrored,
    #[serde(rename = "session.killed")]
    SessionKilled,

    // -- pr / ci / review --
    #[serde(rename = "pr.created")]
    PrCreated,
    #[serde(rename = "pr.closed")]
    PrClosed,
    #[serde(rename = "ci.passing")]
    CiPassing,
    #[serde(rename = "ci.failing")]
    CiFailing,
    #[serde(rename = "review.pending")]
    ReviewPending,
    #[serde(rename = "review.changes_requested")]
    ReviewChangesRequested,
    #[serde(rename = "review.approved")]
    ReviewApproved,

    // -- merge --
    #[serde(rename = "merge.ready")]
    MergeReady,
    #[serde(rename = "merge.conflicts")]
    MergeConflicts,
    #[serde(rename = "merge.completed")]
    MergeCompleted,

    // -- reactions --
    #[serde(rename = "reaction.triggered")]
    ReactionTriggered,
    #[serde(rename = "reaction.escalated")]
    ReactionEscalated,

    // -- summary --
    #[serde(rename = "summary.all_complete")]
    SummaryAllComplete,
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::SessionSpawned => "session.spawned",
            EventType::SessionWorking => "session.working",
            EventType::SessionNeedsInput => "session.needs_input",
            EventType::SessionStuck => "session.stuck",
            EventType::SessionErrored => "session.errored",
            EventType::SessionKilled => "session.killed",
            EventType::PrCreated => "pr.created",
            EventType::PrClosed => "pr.closed",
            EventType::CiPassing => "ci.passing",
            EventType::CiFailing => "ci.failing",
            EventType::ReviewPending => "review.pending",
            EventType::ReviewChangesRequested => "review.changes_requested",
            EventType::ReviewApproved => "review.approved",
            EventType::MergeReady => "merge.ready",
            EventType::MergeConflicts => "merge.conflicts",
            EventType::MergeCompleted => "merge.completed",
            EventType::ReactionTriggered => "reaction.triggered",
            EventType::ReactionEscalated => "reaction.escalated",
            EventType::SummaryAllComplete => "summary.all_complete",
        }
    }

    /// Default priority for this event type.
    pub fn priority(self) -> EventPriority {
        EventPriority::infer(self.as_str())
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Urgency of an event, used to route human notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventPriority {
    Urgent,
    Action,
    Warning,
    Info,
}

impl EventPriority {
    /// Infer a priority from an event type name by substring rules.
    ///
    /// Rules are checked in order and the first match wins.
    pub fn infer(type_name: &str) -> Self {
        let has = |needles: &[&str]| needles.iter().any(|n| type_name.contains(n));
        if has(&["stuck", "needs_input", "errored"]) {
            EventPriority::Urgent
        } else if has(&["approved", "ready", "merged", "completed"]) {
            EventPriority::Action
        } else if has(&["fail", "changes_requested", "conflicts"]) {
            EventPriority::Warning
        } else {
            EventPriority::Info
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventPriority::Urgent => "urgent",
            EventPriority::Action => "action",
            EventPriority::Warning => "warning",
            EventPriority::Info => "info",
        }
    }
}

impl fmt::Display for EventPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable lifecycle event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestratorEvent {
    pub id: EventId,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub priority: EventPriority,
    pub session_id: SessionId,
    pub project_id: ProjectId,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    #[serde(default)]
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl OrchestratorEvent {
    /// Create an event with the priority inferred from its type.
    ///
    /// The timestamp is truncated to milliseconds so that the log round-trip
    /// reproduces it exactly.
    pub fn new(
        event_type: EventType,
        session_id: impl Into<SessionId>,
        project_id: impl Into<ProjectId>,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EventId::generate(),
            event_type,
            priority: event_type.priority(),
            session_id: session_id.into(),
            project_id: project_id.into(),
            timestamp: now.trunc_subsecs(3),
            message: message.into(),
            data: serde_json::Map::new(),
        }
    }

    /// Override the inferred priority.
    pub fn with_priority(mut self, priority: EventPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Attach a data field.
    pub fn with_data(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }
}

/// Optional predicates for querying event history. All set fields must match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventFilter {
    pub session_id: Option<SessionId>,
    pub project_id: Option<ProjectId>,
    pub event_type: Option<EventType>,
    pub priority: Option<EventPriority>,
    /// Inclusive lower bound on the event timestamp.
    pub since: Option<DateTime<Utc>>,
    /// Keep only the last N matching events, in arrival order.
    pub limit: Option<usize>,
}

impl EventFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(mut self, id: impl Into<SessionId>) -> Self {
        self.session_id = Some(id.into());
        self
    }

    pub fn project(mut self, id: impl Into<ProjectId>) -> Self {
        self.project_id = Some(id.into());
        self
    }

    pub fn event_type(mut self, event_type: EventType) -> Self {
        self.event_type = Some(event_type);
        self
    }

    pub fn priority(mut self, priority: EventPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Check every predicate except `limit`.
    pub fn matches(&self, event: &OrchestratorEvent) -> bool {
        self.session_id.as_ref().is_none_or(|id| *id == event.session_id)
            && self.project_id.as_ref().is_none_or(|id| *id == event.project_id)
            && self.event_type.is_none_or(|t| t == event.event_type)
            && self.priority.is_none_or(|p| p == event.priority)
            && self.since.is_none_or(|since| event.timestamp >= since)
    }

    /// Apply the filter to events in arrival order.
    pub fn apply<'a>(
        &self,
        events: impl IntoIterator<Item = &'a OrchestratorEvent>,
    ) -> Vec<OrchestratorEvent> {
        let mut matched: Vec<OrchestratorEvent> = events
            .into_iter()
            .filter(|e| self.matches(e))
            .cloned()
            .collect();
        if let Some(limit) = self.limit {
            let skip = matched.len().saturating_sub(limit);
            matched.drain(..skip);
        }
        matched
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
