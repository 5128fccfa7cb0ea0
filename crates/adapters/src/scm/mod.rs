// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SCM plugins: pull-request state, CI, review and merge readiness

mod github;

pub use github::GitHubScm;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeScm, ScmCall};

use ao_core::{CiCheck, CiCheckStatus, CiStatus, Mergeability, PrRef, PrState, ReviewDecision};
use async_trait::async_trait;
use thiserror::Error;

/// Errors from SCM operations
#[derive(Debug, Error)]
pub enum ScmError {
    #[error("command failed: {0}")]
    CommandFailed(String),
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait ScmAdapter: Send + Sync + 'static {
    async fn pr_state(&self, pr: &PrRef) -> Result<PrState, ScmError>;

    async fn ci_checks(&self, pr: &PrRef) -> Result<Vec<CiCheck>, ScmError>;

    /// Aggregate CI status. Fails closed, see [`summarize_ci`].
    async fn ci_summary(&self, pr: &PrRef) -> Result<CiStatus, ScmError> {
        summarize_ci(self, pr).await
    }

    async fn review_decision(&self, pr: &PrRef) -> Result<ReviewDecision, ScmError>;

    async fn mergeability(&self, pr: &PrRef) -> Result<Mergeability, ScmError>;
}

/// Reduce a PR's checks to one CI status.
///
/// When the checks cannot be fetched the result is `Failing`, so a broken
/// CI query never reads as green. The exception is a PR that is already
/// merged or closed, whose checks no longer matter: that reports `None`.
pub async fn summarize_ci<S>(scm: &S, pr: &PrRef) -> Result<CiStatus, ScmError>
where
    S: ScmAdapter + ?Sized,
{
    let error = match scm.ci_checks(pr).await {
        Ok(checks) => return Ok(ci_status_of(&checks)),
        Err(e) => e,
    };
    match scm.pr_state(pr).await {
        Ok(PrState::Merged | PrState::Closed) => Ok(CiStatus::None),
        _ => {
            tracing::warn!(pr = pr.number, error = %error, "ci checks unavailable, treating as failing");
            Ok(CiStatus::Failing)
        }
    }
}

/// Aggregate individual check results: any failure fails, any unfinished
/// check is pending, no checks at all is `None`.
pub fn ci_status_of(checks: &[CiCheck]) -> CiStatus {
    if checks.is_empty() {
        return CiStatus::None;
    }
    if checks.iter().any(|c| c.status == CiCheckStatus::Failed) {
        return CiStatus::Failing;
    }
    if checks
        .iter()
        .any(|c| matches!(c.status, CiCheckStatus::Pending | CiCheckStatus::Running))
    {
        return CiStatus::Pending;
    }
    CiStatus::Passing
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
