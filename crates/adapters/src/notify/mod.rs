// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification adapters

mod desktop;
mod noop;

pub use desktop::DesktopNotifyAdapter;
pub use noop::NoOpNotifyAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeNotifyAdapter;

use ao_core::OrchestratorEvent;
use async_trait::async_trait;
use thiserror::Error;

/// Errors from notify operations
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("send failed: {0}")]
    SendFailed(String),
}

/// Adapter for human-facing alerts
#[async_trait]
pub trait NotifyAdapter: Send + Sync + 'static {
    async fn notify(&self, event: &OrchestratorEvent) -> Result<(), NotifyError>;
}

/// Notification title for an event, e.g. `[urgent] session.stuck`.
pub fn title_of(event: &OrchestratorEvent) -> String {
    format!("[{}] {}", event.priority.as_str(), event.event_type.as_str())
}
