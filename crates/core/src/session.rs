// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session records as owned by the session manager.
//!
//! The lifecycle core only reads sessions; the single write-back it performs
//! is the status field, through the session manager's metadata update.

use crate::clock::Clock;
use crate::status::{ActivityState, SessionStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Stable identifier of one tracked unit of work (branch + agent + PR).
    pub struct SessionId;
}

crate::define_id! {
    /// Identifier of a configured project.
    pub struct ProjectId;
}

/// Handle used to query the execution context of a session.
///
/// `runtime` names the runtime plugin that owns `id` (e.g. `"tmux"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeHandle {
    pub runtime: String,
    pub id: String,
}

impl RuntimeHandle {
    pub fn new(runtime: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            runtime: runtime.into(),
            id: id.into(),
        }
    }
}

/// Reference to the pull request opened for a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrRef {
    pub number: u64,
    #[serde(default)]
    pub url: String,
    /// `owner/name` of the hosting repository, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

impl PrRef {
    pub fn new(number: u64) -> Self {
        Self {
            number,
            url: String::new(),
            repo: None,
            branch: None,
        }
    }
}

/// A tracked session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub project_id: ProjectId,
    pub status: SessionStatus,
    #[serde(default)]
    pub activity: ActivityState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr: Option<PrRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_handle: Option<RuntimeHandle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a freshly spawned session.
    pub fn new(id: impl Into<SessionId>, project_id: impl Into<ProjectId>, clock: &impl Clock) -> Self {
        let now = clock.now();
        Self {
            id: id.into(),
            project_id: project_id.into(),
            status: SessionStatus::Spawning,
            activity: ActivityState::Unknown,
            pr: None,
            runtime_handle: None,
            branch: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_status(mut self, status: SessionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_activity(mut self, activity: ActivityState) -> Self {
        self.activity = activity;
        self
    }

    pub fn with_pr(mut self, pr: PrRef) -> Self {
        self.pr = Some(pr);
        self
    }

    pub fn with_runtime_handle(mut self, handle: RuntimeHandle) -> Self {
        self.runtime_handle = Some(handle);
        self
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
