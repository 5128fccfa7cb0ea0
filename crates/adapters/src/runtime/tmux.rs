// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tmux runtime

use super::{RuntimeAdapter, RuntimeError};
use crate::subprocess::{run_with_timeout, TMUX_TIMEOUT};
use ao_core::RuntimeHandle;
use async_trait::async_trait;
use tokio::process::Command;

/// Runtime backed by a detached tmux session; the handle id is the tmux target.
#[derive(Clone, Copy, Debug, Default)]
pub struct TmuxRuntime;

impl TmuxRuntime {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RuntimeAdapter for TmuxRuntime {
    async fn is_alive(&self, handle: &RuntimeHandle) -> Result<bool, RuntimeError> {
        let mut cmd = Command::new("tmux");
        cmd.args(["has-session", "-t", &handle.id]);
        let output = run_with_timeout(cmd, TMUX_TIMEOUT, "tmux has-session")
            .await
            .map_err(RuntimeError::CommandFailed)?;
        Ok(output.status.success())
    }

    async fn send_message(
        &self,
        handle: &RuntimeHandle,
        message: &str,
    ) -> Result<(), RuntimeError> {
        let target = handle.id.as_str();
        // -l = literal mode, -- = end of options (text may start with -)
        tmux_output(
            &["send-keys", "-t", target, "-l", "--", message],
            "tmux send-keys literal",
        )
        .await?;
        tmux_output(&["send-keys", "-t", target, "Enter"], "tmux send-keys enter").await?;
        Ok(())
    }
}

/// Run a tmux command and return the output, returning `NotFound` on non-zero exit.
pub(crate) async fn tmux_output(
    args: &[&str],
    description: &str,
) -> Result<std::process::Output, RuntimeError> {
    let mut cmd = Command::new("tmux");
    cmd.args(args);
    let output = run_with_timeout(cmd, TMUX_TIMEOUT, description)
        .await
        .map_err(RuntimeError::CommandFailed)?;
    if !output.status.success() {
        return Err(RuntimeError::NotFound(target_of(args).to_string()));
    }
    Ok(output)
}

fn target_of<'a>(args: &[&'a str]) -> &'a str {
    args.windows(2)
        .find(|w| w[0] == "-t")
        .map(|w| w[1])
        .unwrap_or("unknown")
}

#[cfg(test)]
#[path = "tmux_tests.rs"]
mod tests;
