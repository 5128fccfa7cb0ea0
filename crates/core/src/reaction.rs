// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reaction configuration: what to do automatically when an event fires,
//! and when to give up and hand off to a human.

use crate::event::EventPriority;
use crate::reaction_tracker::ReactionTracker;
use crate::time_fmt::parse_duration;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::time::Duration;

/// Automated response to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReactionAction {
    /// Send the configured message to the agent.
    SendToAgent,
    /// Notify humans.
    Notify,
    /// Placeholder for an automatic merge; currently notifies humans.
    AutoMerge,
}

/// Escalation threshold: a number of attempts or an elapsed time.
///
/// Deserializes from either an integer (`3`) or a duration string (`"10m"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalateAfter {
    Attempts(u32),
    Elapsed(Duration),
}

impl<'de> Deserialize<'de> for EscalateAfter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Count(u32),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Count(n) => Ok(EscalateAfter::Attempts(n)),
            Raw::Text(s) => parse_duration(&s)
                .map(EscalateAfter::Elapsed)
                .map_err(serde::de::Error::custom),
        }
    }
}

impl Serialize for EscalateAfter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            EscalateAfter::Attempts(n) => serializer.serialize_u32(*n),
            EscalateAfter::Elapsed(d) => serializer.serialize_str(&format!("{}s", d.as_secs())),
        }
    }
}

fn default_auto() -> bool {
    true
}

/// Per-key reaction configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionConfig {
    /// Disabled reactions are never executed.
    #[serde(default = "default_auto")]
    pub auto: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ReactionAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Attempts allowed before escalating. `None` means unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalate_after: Option<EscalateAfter>,
    /// Priority for notifications raised by this reaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<EventPriority>,
}

impl ReactionConfig {
    pub fn new(action: ReactionAction) -> Self {
        Self {
            auto: true,
            action: Some(action),
            message: None,
            retries: None,
            escalate_after: None,
            priority: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    pub fn with_escalate_after(mut self, escalate_after: EscalateAfter) -> Self {
        self.escalate_after = Some(escalate_after);
        self
    }

    pub fn with_priority(mut self, priority: EventPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.auto = false;
        self
    }

    /// Whether the tracked attempts have exhausted this reaction.
    pub fn should_escalate(&self, tracker: &ReactionTracker, now: DateTime<Utc>) -> bool {
        if self.retries.is_some_and(|max| tracker.attempts > max) {
            return true;
        }
        match self.escalate_after {
            Some(EscalateAfter::Attempts(max)) => tracker.attempts > max,
            Some(EscalateAfter::Elapsed(limit)) => {
                let elapsed = (now - tracker.first_triggered).to_std().unwrap_or_default();
                elapsed > limit
            }
            None => false,
        }
    }
}

#[cfg(test)]
#[path = "reaction_tests.rs"]
mod tests;
