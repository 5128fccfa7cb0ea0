// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime plugins: liveness and messaging for a session's execution context

mod process;
mod tmux;

pub use process::ProcessRuntime;
pub use tmux::TmuxRuntime;

pub(crate) use tmux::tmux_output;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeRuntime, RuntimeCall};

use ao_core::RuntimeHandle;
use async_trait::async_trait;
use thiserror::Error;

/// Errors from runtime operations
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("runtime target not found: {0}")]
    NotFound(String),
    #[error("command failed: {0}")]
    CommandFailed(String),
    #[error("{runtime} runtime does not support {operation}")]
    Unsupported {
        runtime: &'static str,
        operation: &'static str,
    },
}

/// Execution context a session's agent runs in (terminal multiplexer, OS process).
#[async_trait]
pub trait RuntimeAdapter: Send + Sync + 'static {
    /// Whether the execution context behind `handle` still exists.
    async fn is_alive(&self, handle: &RuntimeHandle) -> Result<bool, RuntimeError>;

    /// Deliver a text message to the agent as if typed by a human.
    async fn send_message(&self, handle: &RuntimeHandle, message: &str)
        -> Result<(), RuntimeError>;
}
