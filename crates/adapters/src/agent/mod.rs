// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent plugins: activity classification for a running coding assistant

mod claude;

pub use claude::{classify_pane, ClaudeAgent};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeAgent;

use crate::runtime::RuntimeError;
use ao_core::{ActivityState, Session, SessionId};
use async_trait::async_trait;
use thiserror::Error;

/// Errors from agent operations
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("session {0} has no runtime handle")]
    NoRuntimeHandle(SessionId),
    #[error("activity detection failed: {0}")]
    DetectionFailed(String),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// Classifies what the agent inside a session is doing.
#[async_trait]
pub trait AgentAdapter: Send + Sync + 'static {
    async fn detect_activity(&self, session: &Session) -> Result<ActivityState, AgentError>;
}
