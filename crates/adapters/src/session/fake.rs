// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake session manager for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{SessionManager, SessionManagerError};
use ao_core::{ActivityState, PrRef, Session, SessionId, SessionStatus};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Recorded session manager call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCall {
    List,
    Get { id: SessionId },
    Send { id: SessionId, message: String },
    UpdateStatus { id: SessionId, status: SessionStatus },
}

#[derive(Default)]
struct FakeSessionState {
    sessions: BTreeMap<SessionId, Session>,
    list_error: Option<String>,
    send_error: Option<String>,
    get_errors: BTreeMap<SessionId, String>,
    calls: Vec<SessionCall>,
}

/// In-memory session manager; sessions list in id order.
#[derive(Clone, Default)]
pub struct FakeSessionManager {
    inner: Arc<Mutex<FakeSessionState>>,
}

impl FakeSessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: Session) {
        self.inner
            .lock()
            .sessions
            .insert(session.id.clone(), session);
    }

    pub fn remove(&self, id: &str) {
        self.inner.lock().sessions.remove(id);
    }

    pub fn session(&self, id: &str) -> Option<Session> {
        self.inner.lock().sessions.get(id).cloned()
    }

    /// Change a stored status directly, as another process would.
    pub fn set_status(&self, id: &str, status: SessionStatus) {
        if let Some(s) = self.inner.lock().sessions.get_mut(id) {
            s.status = status;
        }
    }

    pub fn set_activity(&self, id: &str, activity: ActivityState) {
        if let Some(s) = self.inner.lock().sessions.get_mut(id) {
            s.activity = activity;
        }
    }

    pub fn set_pr(&self, id: &str, pr: PrRef) {
        if let Some(s) = self.inner.lock().sessions.get_mut(id) {
            s.pr = Some(pr);
        }
    }

    pub fn fail_list(&self, message: Option<&str>) {
        self.inner.lock().list_error = message.map(str::to_string);
    }

    pub fn fail_send(&self, message: Option<&str>) {
        self.inner.lock().send_error = message.map(str::to_string);
    }

    /// Make `get` fail for one session.
    pub fn fail_get(&self, id: &str, message: &str) {
        self.inner
            .lock()
            .get_errors
            .insert(SessionId::new(id), message.to_string());
    }

    pub fn calls(&self) -> Vec<SessionCall> {
        self.inner.lock().calls.clone()
    }

    /// Successfully delivered messages, as `(session id, message)`.
    pub fn sent(&self) -> Vec<(SessionId, String)> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                SessionCall::Send { id, message } => Some((id.clone(), message.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn status_updates(&self) -> Vec<(SessionId, SessionStatus)> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                SessionCall::UpdateStatus { id, status } => Some((id.clone(), *status)),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl SessionManager for FakeSessionManager {
    async fn list(&self) -> Result<Vec<Session>, SessionManagerError> {
        let mut inner = self.inner.lock();
        inner.calls.push(SessionCall::List);
        if let Some(msg) = &inner.list_error {
            return Err(SessionManagerError::Other(msg.clone()));
        }
        Ok(inner.sessions.values().cloned().collect())
    }

    async fn get(&self, id: &SessionId) -> Result<Option<Session>, SessionManagerError> {
        let mut inner = self.inner.lock();
        inner.calls.push(SessionCall::Get { id: id.clone() });
        if let Some(msg) = inner.get_errors.get(id) {
            return Err(SessionManagerError::Other(msg.clone()));
        }
        Ok(inner.sessions.get(id).cloned())
    }

    async fn send(&self, id: &SessionId, message: &str) -> Result<(), SessionManagerError> {
        let mut inner = self.inner.lock();
        if let Some(msg) = &inner.send_error {
            return Err(SessionManagerError::Other(msg.clone()));
        }
        if !inner.sessions.contains_key(id) {
            return Err(SessionManagerError::NotFound(id.clone()));
        }
        inner.calls.push(SessionCall::Send {
            id: id.clone(),
            message: message.to_string(),
        });
        Ok(())
    }

    async fn update_status(
        &self,
        id: &SessionId,
        status: SessionStatus,
    ) -> Result<(), SessionManagerError> {
        let mut inner = self.inner.lock();
        let session = inner
            .sessions
            .get_mut(id)
            .ok_or_else(|| SessionManagerError::NotFound(id.clone()))?;
        session.status = status;
        inner.calls.push(SessionCall::UpdateStatus {
            id: id.clone(),
            status,
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
