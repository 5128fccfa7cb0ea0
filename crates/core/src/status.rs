// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session status and agent activity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a session, from spawn to merge.
///
/// `Merged` and `Killed` are terminal: once there, the session is only
/// revisited to emit its final transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Spawning,
    Working,
    PrOpen,
    CiFailed,
    ReviewPending,
    ChangesRequested,
    Approved,
    Mergeable,
    Merged,
    NeedsInput,
    Stuck,
    Errored,
    Killed,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Merged | SessionStatus::Killed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Spawning => "spawning",
            SessionStatus::Working => "working",
            SessionStatus::PrOpen => "pr_open",
            SessionStatus::CiFailed => "ci_failed",
            SessionStatus::ReviewPending => "review_pending",
            SessionStatus::ChangesRequested => "changes_requested",
            SessionStatus::Approved => "approved",
            SessionStatus::Mergeable => "mergeable",
            SessionStatus::Merged => "merged",
            SessionStatus::NeedsInput => "needs_input",
            SessionStatus::Stuck => "stuck",
            SessionStatus::Errored => "errored",
            SessionStatus::Killed => "killed",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the agent inside a session appears to be doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityState {
    /// Processing or running tools
    Active,
    /// Alive but not doing anything
    Idle,
    /// Hit an error it cannot get past on its own
    Blocked,
    /// Waiting on a permission prompt or question
    WaitingInput,
    /// Agent process is gone
    Exited,
    #[default]
    Unknown,
}

impl fmt::Display for ActivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActivityState::Active => "active",
            ActivityState::Idle => "idle",
            ActivityState::Blocked => "blocked",
            ActivityState::WaitingInput => "waiting_input",
            ActivityState::Exited => "exited",
            ActivityState::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
