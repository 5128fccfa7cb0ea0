// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::runtime::{RuntimeAdapter, RuntimeError};
use crate::scm::{ScmAdapter, ScmError};
use ao_core::{CiCheck, CiStatus, Mergeability, PrRef, PrState, ReviewDecision, RuntimeHandle};
use async_trait::async_trait;
use std::time::Instant;
use tracing::Instrument;

/// Wrapper that adds tracing to any RuntimeAdapter
pub struct TracedRuntime<R> {
    name: &'static str,
    inner: R,
}

impl<R> TracedRuntime<R> {
    pub fn new(name: &'static str, inner: R) -> Self {
        Self { name, inner }
    }
}

#[async_trait]
impl<R: RuntimeAdapter> RuntimeAdapter for TracedRuntime<R> {
    async fn is_alive(&self, handle: &RuntimeHandle) -> Result<bool, RuntimeError> {
        let result = self.inner.is_alive(handle).await;
        match &result {
            Ok(alive) => tracing::trace!(runtime = self.name, id = %handle.id, alive, "checked"),
            Err(e) => tracing::warn!(runtime = self.name, id = %handle.id, error = %e, "liveness probe failed"),
        }
        result
    }

    async fn send_message(
        &self,
        handle: &RuntimeHandle,
        message: &str,
    ) -> Result<(), RuntimeError> {
        async {
            tracing::debug!(message_len = message.len(), "sending");
            let start = Instant::now();
            let result = self.inner.send_message(handle, message).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(()) => tracing::info!(elapsed_ms, "message delivered"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "send failed"),
            }
            result
        }
        .instrument(tracing::info_span!("runtime.send", runtime = self.name, id = %handle.id))
        .await
    }
}

/// Wrapper that adds tracing to any ScmAdapter
pub struct TracedScm<S> {
    name: &'static str,
    inner: S,
}

impl<S> TracedScm<S> {
    pub fn new(name: &'static str, inner: S) -> Self {
        Self { name, inner }
    }

    fn log<T: std::fmt::Debug>(
        &self,
        op: &'static str,
        pr: &PrRef,
        start: Instant,
        result: &Result<T, ScmError>,
    ) {
        let elapsed_ms = start.elapsed().as_millis() as u64;
        match result {
            Ok(value) => {
                tracing::debug!(scm = self.name, op, pr = pr.number, elapsed_ms, ?value, "ok")
            }
            Err(e) => {
                tracing::warn!(scm = self.name, op, pr = pr.number, elapsed_ms, error = %e, "failed")
            }
        }
    }
}

#[async_trait]
impl<S: ScmAdapter> ScmAdapter for TracedScm<S> {
    async fn pr_state(&self, pr: &PrRef) -> Result<PrState, ScmError> {
        let start = Instant::now();
        let result = self.inner.pr_state(pr).await;
        self.log("pr_state", pr, start, &result);
        result
    }

    async fn ci_checks(&self, pr: &PrRef) -> Result<Vec<CiCheck>, ScmError> {
        let start = Instant::now();
        let result = self.inner.ci_checks(pr).await;
        self.log("ci_checks", pr, start, &result);
        result
    }

    async fn ci_summary(&self, pr: &PrRef) -> Result<CiStatus, ScmError> {
        let start = Instant::now();
        let result = self.inner.ci_summary(pr).await;
        self.log("ci_summary", pr, start, &result);
        result
    }

    async fn review_decision(&self, pr: &PrRef) -> Result<ReviewDecision, ScmError> {
        let start = Instant::now();
        let result = self.inner.review_decision(pr).await;
        self.log("review_decision", pr, start, &result);
        result
    }

    async fn mergeability(&self, pr: &PrRef) -> Result<Mergeability, ScmError> {
        let start = Instant::now();
        let result = self.inner.mergeability(pr).await;
        self.log("mergeability", pr, start, &result);
        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
