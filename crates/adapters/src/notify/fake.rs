// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake notification adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{NotifyAdapter, NotifyError};
use ao_core::OrchestratorEvent;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Default)]
struct FakeNotifyState {
    calls: Vec<OrchestratorEvent>,
    error: Option<String>,
}

/// Fake notification adapter for testing
#[derive(Clone, Default)]
pub struct FakeNotifyAdapter {
    inner: Arc<Mutex<FakeNotifyState>>,
}

impl FakeNotifyAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `notify` fail (`None` restores delivery).
    pub fn set_error(&self, message: Option<&str>) {
        self.inner.lock().error = message.map(str::to_string);
    }

    /// Every event passed to `notify`, including failed deliveries.
    pub fn calls(&self) -> Vec<OrchestratorEvent> {
        self.inner.lock().calls.clone()
    }
}

#[async_trait]
impl NotifyAdapter for FakeNotifyAdapter {
    async fn notify(&self, event: &OrchestratorEvent) -> Result<(), NotifyError> {
        let mut inner = self.inner.lock();
        inner.calls.push(event.clone());
        match &inner.error {
            Some(msg) => Err(NotifyError::SendFailed(msg.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
