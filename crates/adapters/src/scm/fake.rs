// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake SCM for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ScmAdapter, ScmError};
use ao_core::{CiCheck, Mergeability, PrRef, PrState, ReviewDecision};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Recorded SCM call, by PR number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScmCall {
    PrState(u64),
    CiChecks(u64),
    ReviewDecision(u64),
    Mergeability(u64),
}

#[derive(Clone)]
struct FakePr {
    state: PrState,
    checks: Vec<CiCheck>,
    checks_error: Option<String>,
    review: ReviewDecision,
    mergeability: Mergeability,
    error: Option<String>,
}

impl Default for FakePr {
    fn default() -> Self {
        Self {
            state: PrState::Open,
            checks: Vec::new(),
            checks_error: None,
            review: ReviewDecision::None,
            mergeability: Mergeability::default(),
            error: None,
        }
    }
}

#[derive(Default)]
struct FakeScmState {
    prs: HashMap<u64, FakePr>,
    calls: Vec<ScmCall>,
}

/// Fake SCM keyed by PR number. Unknown PRs are open with no checks.
#[derive(Clone, Default)]
pub struct FakeScm {
    inner: Arc<Mutex<FakeScmState>>,
}

impl FakeScm {
    pub fn new() -> Self {
        Self::default()
    }

    fn update(&self, number: u64, f: impl FnOnce(&mut FakePr)) {
        f(self.inner.lock().prs.entry(number).or_default());
    }

    pub fn set_pr_state(&self, number: u64, state: PrState) {
        self.update(number, |pr| pr.state = state);
    }

    pub fn set_ci_checks(&self, number: u64, checks: Vec<CiCheck>) {
        self.update(number, |pr| {
            pr.checks = checks;
            pr.checks_error = None;
        });
    }

    /// Make `ci_checks` fail while other queries keep working.
    pub fn fail_ci_checks(&self, number: u64, message: &str) {
        self.update(number, |pr| pr.checks_error = Some(message.to_string()));
    }

    pub fn set_review(&self, number: u64, review: ReviewDecision) {
        self.update(number, |pr| pr.review = review);
    }

    pub fn set_mergeability(&self, number: u64, mergeability: Mergeability) {
        self.update(number, |pr| pr.mergeability = mergeability);
    }

    /// Make every query for this PR fail (`clear_failure` undoes it).
    pub fn fail_all(&self, number: u64, message: &str) {
        self.update(number, |pr| pr.error = Some(message.to_string()));
    }

    pub fn clear_failure(&self, number: u64) {
        self.update(number, |pr| {
            pr.error = None;
            pr.checks_error = None;
        });
    }

    pub fn calls(&self) -> Vec<ScmCall> {
        self.inner.lock().calls.clone()
    }

    fn lookup(&self, call: ScmCall, number: u64) -> Result<FakePr, ScmError> {
        let mut inner = self.inner.lock();
        inner.calls.push(call);
        let pr = inner.prs.get(&number).cloned().unwrap_or_default();
        match &pr.error {
            Some(msg) => Err(ScmError::CommandFailed(msg.clone())),
            None => Ok(pr),
        }
    }
}

#[async_trait]
impl ScmAdapter for FakeScm {
    async fn pr_state(&self, pr: &PrRef) -> Result<PrState, ScmError> {
        Ok(self.lookup(ScmCall::PrState(pr.number), pr.number)?.state)
    }

    async fn ci_checks(&self, pr: &PrRef) -> Result<Vec<CiCheck>, ScmError> {
        let fake = self.lookup(ScmCall::CiChecks(pr.number), pr.number)?;
        match fake.checks_error {
            Some(msg) => Err(ScmError::CommandFailed(msg)),
            None => Ok(fake.checks),
        }
    }

    async fn review_decision(&self, pr: &PrRef) -> Result<ReviewDecision, ScmError> {
        Ok(self
            .lookup(ScmCall::ReviewDecision(pr.number), pr.number)?
            .review)
    }

    async fn mergeability(&self, pr: &PrRef) -> Result<Mergeability, ScmError> {
        Ok(self
            .lookup(ScmCall::Mergeability(pr.number), pr.number)?
            .mergeability)
    }
}
