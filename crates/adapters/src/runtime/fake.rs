// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake runtime for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{RuntimeAdapter, RuntimeError};
use ao_core::RuntimeHandle;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Recorded runtime call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeCall {
    IsAlive { id: String },
    SendMessage { id: String, message: String },
}

#[derive(Default)]
struct FakeRuntimeState {
    dead: HashSet<String>,
    probe_errors: HashMap<String, String>,
    send_error: Option<String>,
    calls: Vec<RuntimeCall>,
}

/// Fake runtime: every handle is alive unless marked dead.
#[derive(Clone, Default)]
pub struct FakeRuntime {
    inner: Arc<Mutex<FakeRuntimeState>>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_alive(&self, id: &str, alive: bool) {
        let mut inner = self.inner.lock();
        if alive {
            inner.dead.remove(id);
        } else {
            inner.dead.insert(id.to_string());
        }
    }

    /// Make `is_alive` fail for one handle.
    pub fn fail_probe(&self, id: &str, message: &str) {
        self.inner
            .lock()
            .probe_errors
            .insert(id.to_string(), message.to_string());
    }

    /// Make every `send_message` fail (`None` restores delivery).
    pub fn set_send_error(&self, message: Option<&str>) {
        self.inner.lock().send_error = message.map(str::to_string);
    }

    pub fn calls(&self) -> Vec<RuntimeCall> {
        self.inner.lock().calls.clone()
    }

    /// Messages delivered successfully, as `(handle id, message)`.
    pub fn sent_messages(&self) -> Vec<(String, String)> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                RuntimeCall::SendMessage { id, message } => Some((id.clone(), message.clone())),
                RuntimeCall::IsAlive { .. } => None,
            })
            .collect()
    }
}

#[async_trait]
impl RuntimeAdapter for FakeRuntime {
    async fn is_alive(&self, handle: &RuntimeHandle) -> Result<bool, RuntimeError> {
        let mut inner = self.inner.lock();
        inner.calls.push(RuntimeCall::IsAlive {
            id: handle.id.clone(),
        });
        if let Some(msg) = inner.probe_errors.get(&handle.id) {
            return Err(RuntimeError::CommandFailed(msg.clone()));
        }
        Ok(!inner.dead.contains(&handle.id))
    }

    async fn send_message(
        &self,
        handle: &RuntimeHandle,
        message: &str,
    ) -> Result<(), RuntimeError> {
        let mut inner = self.inner.lock();
        if let Some(msg) = &inner.send_error {
            return Err(RuntimeError::CommandFailed(msg.clone()));
        }
        inner.calls.push(RuntimeCall::SendMessage {
            id: handle.id.clone(),
            message: message.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
