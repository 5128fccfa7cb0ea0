// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pull-request signals reported by source-control plugins.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrState {
    Open,
    Merged,
    Closed,
}

/// Aggregate CI result for a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CiStatus {
    Passing,
    Failing,
    Pending,
    /// No checks configured, or the PR is no longer open.
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approved,
    ChangesRequested,
    Pending,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CiCheckStatus {
    Pending,
    Running,
    Passed,
    Failed,
    Skipped,
}

/// One CI check on a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CiCheck {
    pub name: String,
    pub status: CiCheckStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl CiCheck {
    pub fn new(name: impl Into<String>, status: CiCheckStatus) -> Self {
        Self {
            name: name.into(),
            status,
            url: None,
        }
    }
}

/// Merge readiness of a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Mergeability {
    pub mergeable: bool,
    pub ci_passing: bool,
    pub approved: bool,
    pub no_conflicts: bool,
    /// Human-readable reasons the PR cannot merge yet.
    #[serde(default)]
    pub blockers: Vec<String>,
}

impl Mergeability {
    pub fn ready() -> Self {
        Self {
            mergeable: true,
            ci_passing: true,
            approved: true,
            no_conflicts: true,
            blockers: Vec::new(),
        }
    }

    pub fn blocked(blocker: impl Into<String>) -> Self {
        Self {
            blockers: vec![blocker.into()],
            ..Self::default()
        }
    }
}
