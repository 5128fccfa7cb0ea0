// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! GitHub SCM via the `gh` CLI

use super::{ScmAdapter, ScmError};
use crate::subprocess::{run_for_stdout, run_with_timeout, GH_TIMEOUT};
use ao_core::{
    CiCheck, CiCheckStatus, CiStatus, Mergeability, PrRef, PrState, ReviewDecision,
};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

/// `gh pr checks` exit code when some checks are still pending.
const GH_CHECKS_PENDING: i32 = 8;

#[derive(Clone, Copy, Debug, Default)]
pub struct GitHubScm;

impl GitHubScm {
    pub fn new() -> Self {
        Self
    }

    async fn pr_view(&self, pr: &PrRef, fields: &str) -> Result<PrView, ScmError> {
        let cmd = gh_pr_command("view", pr, fields);
        let stdout = run_for_stdout(cmd, GH_TIMEOUT, "gh pr view")
            .await
            .map_err(ScmError::CommandFailed)?;
        serde_json::from_str(&stdout).map_err(|e| ScmError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl ScmAdapter for GitHubScm {
    async fn pr_state(&self, pr: &PrRef) -> Result<PrState, ScmError> {
        let view = self.pr_view(pr, "state").await?;
        parse_pr_state(view.state.as_deref().unwrap_or_default())
    }

    async fn ci_checks(&self, pr: &PrRef) -> Result<Vec<CiCheck>, ScmError> {
        let cmd = gh_pr_command("checks", pr, "name,state,link");
        let output = run_with_timeout(cmd, GH_TIMEOUT, "gh pr checks")
            .await
            .map_err(ScmError::CommandFailed)?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        // gh exits non-zero for failing (1) and pending (8) checks but still
        // prints the JSON list.
        if output.status.success() || output.status.code() == Some(GH_CHECKS_PENDING) {
            return parse_checks(&stdout);
        }
        if stderr.contains("no checks reported") {
            return Ok(Vec::new());
        }
        if stdout.trim_start().starts_with('[') {
            return parse_checks(&stdout);
        }
        Err(ScmError::CommandFailed(format!(
            "gh pr checks exited with {}: {}",
            output.status,
            stderr.trim()
        )))
    }

    async fn review_decision(&self, pr: &PrRef) -> Result<ReviewDecision, ScmError> {
        let view = self.pr_view(pr, "reviewDecision").await?;
        Ok(parse_review_decision(
            view.review_decision.as_deref().unwrap_or_default(),
        ))
    }

    async fn mergeability(&self, pr: &PrRef) -> Result<Mergeability, ScmError> {
        let view = self
            .pr_view(pr, "mergeable,mergeStateStatus,reviewDecision")
            .await?;
        let ci = self.ci_summary(pr).await?;
        Ok(mergeability_of(&view, ci))
    }
}

fn gh_pr_command(subcommand: &str, pr: &PrRef, fields: &str) -> Command {
    let mut cmd = Command::new("gh");
    cmd.args(["pr", subcommand, &pr.number.to_string(), "--json", fields]);
    if let Some(repo) = &pr.repo {
        cmd.args(["--repo", repo]);
    }
    cmd
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PrView {
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    review_decision: Option<String>,
    #[serde(default)]
    mergeable: Option<String>,
    #[serde(default)]
    merge_state_status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GhCheck {
    name: String,
    state: String,
    #[serde(default)]
    link: Option<String>,
}

fn parse_pr_state(state: &str) -> Result<PrState, ScmError> {
    match state {
        "OPEN" => Ok(PrState::Open),
        "MERGED" => Ok(PrState::Merged),
        "CLOSED" => Ok(PrState::Closed),
        other => Err(ScmError::InvalidResponse(format!(
            "unknown PR state: {:?}",
            other
        ))),
    }
}

fn parse_checks(json: &str) -> Result<Vec<CiCheck>, ScmError> {
    let raw: Vec<GhCheck> =
        serde_json::from_str(json).map_err(|e| ScmError::InvalidResponse(e.to_string()))?;
    Ok(raw
        .into_iter()
        .map(|c| CiCheck {
            status: check_status(&c.state),
            name: c.name,
            url: c.link.filter(|l| !l.is_empty()),
        })
        .collect())
}

fn check_status(state: &str) -> CiCheckStatus {
    match state {
        "SUCCESS" | "NEUTRAL" => CiCheckStatus::Passed,
        "SKIPPED" => CiCheckStatus::Skipped,
        "IN_PROGRESS" => CiCheckStatus::Running,
        "QUEUED" | "PENDING" | "WAITING" | "REQUESTED" | "EXPECTED" => CiCheckStatus::Pending,
        // FAILURE, ERROR, CANCELLED, TIMED_OUT, ACTION_REQUIRED, STARTUP_FAILURE
        _ => CiCheckStatus::Failed,
    }
}

fn parse_review_decision(decision: &str) -> ReviewDecision {
    match decision {
        "APPROVED" => ReviewDecision::Approved,
        "CHANGES_REQUESTED" => ReviewDecision::ChangesRequested,
        "REVIEW_REQUIRED" => ReviewDecision::Pending,
        _ => ReviewDecision::None,
    }
}

fn mergeability_of(view: &PrView, ci: CiStatus) -> Mergeability {
    let no_conflicts = view.mergeable.as_deref() == Some("MERGEABLE");
    let ci_passing = matches!(ci, CiStatus::Passing | CiStatus::None);
    let approved = matches!(
        parse_review_decision(view.review_decision.as_deref().unwrap_or_default()),
        ReviewDecision::Approved | ReviewDecision::None
    );

    let mut blockers = Vec::new();
    if !no_conflicts {
        blockers.push(match view.mergeable.as_deref() {
            Some("CONFLICTING") => "merge conflicts".to_string(),
            _ => "mergeability not yet computed".to_string(),
        });
    }
    if !ci_passing {
        blockers.push(format!("CI is {}", ci_label(ci)));
    }
    if !approved {
        blockers.push("review approval required".to_string());
    }
    if view.merge_state_status.as_deref() == Some("BEHIND") {
        blockers.push("branch is behind base".to_string());
    }

    Mergeability {
        mergeable: blockers.is_empty(),
        ci_passing,
        approved,
        no_conflicts,
        blockers,
    }
}

fn ci_label(ci: CiStatus) -> &'static str {
    match ci {
        CiStatus::Passing => "passing",
        CiStatus::Failing => "failing",
        CiStatus::Pending => "pending",
        CiStatus::None => "absent",
    }
}

#[cfg(test)]
#[path = "github_tests.rs"]
mod tests;
