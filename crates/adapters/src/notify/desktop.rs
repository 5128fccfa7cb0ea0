// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Desktop notification adapter using notify-rust.
//!
//! On macOS the first notification makes `mac-notification-sys` run an
//! AppleScript bundle lookup, which blocks forever in a daemon without
//! Automation permissions. The bundle identifier is set up front instead.

use super::{title_of, NotifyAdapter, NotifyError};
use ao_core::OrchestratorEvent;
use async_trait::async_trait;

#[derive(Clone, Copy, Debug, Default)]
pub struct DesktopNotifyAdapter;

impl DesktopNotifyAdapter {
    pub fn new() -> Self {
        #[cfg(target_os = "macos")]
        {
            let _ = mac_notification_sys::set_application("com.apple.Terminal");
        }
        Self
    }
}

#[async_trait]
impl NotifyAdapter for DesktopNotifyAdapter {
    async fn notify(&self, event: &OrchestratorEvent) -> Result<(), NotifyError> {
        let title = title_of(event);
        let body = format!("{}: {}", event.session_id, event.message);
        // show() is synchronous; fire-and-forget on the blocking pool.
        tokio::task::spawn_blocking(move || {
            match notify_rust::Notification::new()
                .summary(&title)
                .body(&body)
                .show()
            {
                Ok(_) => tracing::debug!(%title, "desktop notification sent"),
                Err(e) => tracing::warn!(%title, error = %e, "desktop notification failed"),
            }
        });
        Ok(())
    }
}
