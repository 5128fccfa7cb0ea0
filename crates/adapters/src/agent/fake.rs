// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake agent adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{AgentAdapter, AgentError};
use ao_core::{ActivityState, Session, SessionId};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
struct FakeAgentState {
    activity: HashMap<SessionId, ActivityState>,
    errors: HashMap<SessionId, String>,
    calls: Vec<SessionId>,
}

/// Fake agent: reports the session's recorded activity unless overridden.
#[derive(Clone, Default)]
pub struct FakeAgent {
    inner: Arc<Mutex<FakeAgentState>>,
}

impl FakeAgent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_activity(&self, id: &str, activity: ActivityState) {
        let mut inner = self.inner.lock();
        inner.errors.remove(id);
        inner.activity.insert(SessionId::new(id), activity);
    }

    pub fn fail_detection(&self, id: &str, message: &str) {
        self.inner
            .lock()
            .errors
            .insert(SessionId::new(id), message.to_string());
    }

    /// Sessions probed, in call order.
    pub fn calls(&self) -> Vec<SessionId> {
        self.inner.lock().calls.clone()
    }
}

#[async_trait]
impl AgentAdapter for FakeAgent {
    async fn detect_activity(&self, session: &Session) -> Result<ActivityState, AgentError> {
        let mut inner = self.inner.lock();
        inner.calls.push(session.id.clone());
        if let Some(msg) = inner.errors.get(&session.id) {
            return Err(AgentError::DetectionFailed(msg.clone()));
        }
        Ok(inner
            .activity
            .get(&session.id)
            .copied()
            .unwrap_or(session.activity))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
