// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plain OS process runtime

use super::{RuntimeAdapter, RuntimeError};
use crate::subprocess::{run_with_timeout, PROBE_TIMEOUT};
use ao_core::RuntimeHandle;
use async_trait::async_trait;
use tokio::process::Command;

/// Runtime for agents launched as bare processes; the handle id is the pid.
///
/// Liveness uses `kill -0`. There is no input channel, so messaging is
/// reported as unsupported.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessRuntime;

impl ProcessRuntime {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RuntimeAdapter for ProcessRuntime {
    async fn is_alive(&self, handle: &RuntimeHandle) -> Result<bool, RuntimeError> {
        let pid = parse_pid(&handle.id)?;
        let mut cmd = Command::new("kill");
        cmd.args(["-0", &pid.to_string()]);
        let output = run_with_timeout(cmd, PROBE_TIMEOUT, "kill -0")
            .await
            .map_err(RuntimeError::CommandFailed)?;
        Ok(output.status.success())
    }

    async fn send_message(
        &self,
        _handle: &RuntimeHandle,
        _message: &str,
    ) -> Result<(), RuntimeError> {
        Err(RuntimeError::Unsupported {
            runtime: "process",
            operation: "send_message",
        })
    }
}

fn parse_pid(id: &str) -> Result<u32, RuntimeError> {
    id.trim()
        .parse::<u32>()
        .ok()
        .filter(|pid| *pid > 0)
        .ok_or_else(|| RuntimeError::NotFound(format!("invalid pid: {}", id)))
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
