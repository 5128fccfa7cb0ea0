// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Attempt tracking for reactions.
//!
//! Trackers are keyed by `(session, reaction key)` and are discarded when the
//! session leaves the status that triggered the reaction, so a later
//! recurrence starts counting from one again.

use crate::session::SessionId;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Attempt state for one reaction on one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionTracker {
    pub attempts: u32,
    pub first_triggered: DateTime<Utc>,
    /// Last attempt failed to deliver; the next poll with an unchanged
    /// status should run the reaction again.
    pub pending_retry: bool,
}

/// All reaction trackers owned by one lifecycle manager.
#[derive(Debug, Clone, Default)]
pub struct ReactionTrackers {
    trackers: HashMap<(SessionId, String), ReactionTracker>,
}

impl ReactionTrackers {
    /// Record a trigger and return the updated tracker.
    pub fn record_attempt(
        &mut self,
        session_id: &SessionId,
        reaction_key: &str,
        now: DateTime<Utc>,
    ) -> ReactionTracker {
        let tracker = self
            .trackers
            .entry((session_id.clone(), reaction_key.to_string()))
            .or_insert(ReactionTracker {
                attempts: 0,
                first_triggered: now,
                pending_retry: false,
            });
        tracker.attempts += 1;
        tracker.clone()
    }

    pub fn get(&self, session_id: &SessionId, reaction_key: &str) -> Option<&ReactionTracker> {
        self.trackers
            .get(&(session_id.clone(), reaction_key.to_string()))
    }

    /// Mark whether the latest attempt needs a retry. No-op without a tracker.
    pub fn set_pending_retry(&mut self, session_id: &SessionId, reaction_key: &str, pending: bool) {
        if let Some(tracker) = self
            .trackers
            .get_mut(&(session_id.clone(), reaction_key.to_string()))
        {
            tracker.pending_retry = pending;
        }
    }

    /// Discard the tracker for one reaction on one session.
    pub fn clear(&mut self, session_id: &SessionId, reaction_key: &str) {
        self.trackers
            .remove(&(session_id.clone(), reaction_key.to_string()));
    }

    pub fn len(&self) -> usize {
        self.trackers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trackers.is_empty()
    }
}

#[cfg(test)]
#[path = "reaction_tracker_tests.rs"]
mod tests;
