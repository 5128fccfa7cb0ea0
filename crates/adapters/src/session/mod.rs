// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session manager: persistence, listing and messaging of sessions

mod file;

pub use file::FileSessionManager;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeSessionManager, SessionCall};

use crate::runtime::RuntimeError;
use ao_core::{Session, SessionId, SessionStatus};
use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from session manager operations
#[derive(Debug, Error)]
pub enum SessionManagerError {
    #[error("session not found: {0}")]
    NotFound(SessionId),
    #[error("session {0} has no runtime handle")]
    NoRuntimeHandle(SessionId),
    #[error("no runtime plugin named {0:?}")]
    UnknownRuntime(String),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("corrupt session record {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0}")]
    Other(String),
}

/// Owner of session records.
///
/// The lifecycle core only reads sessions, messages them and writes back
/// their status.
#[async_trait]
pub trait SessionManager: Send + Sync + 'static {
    async fn list(&self) -> Result<Vec<Session>, SessionManagerError>;

    async fn get(&self, id: &SessionId) -> Result<Option<Session>, SessionManagerError>;

    /// Deliver a message to the agent running in the session.
    async fn send(&self, id: &SessionId, message: &str) -> Result<(), SessionManagerError>;

    async fn update_status(
        &self,
        id: &SessionId,
        status: SessionStatus,
    ) -> Result<(), SessionManagerError>;
}
