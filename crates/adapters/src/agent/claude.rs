// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Claude Code activity detection from the tmux pane

use super::{AgentAdapter, AgentError};
use crate::runtime::tmux_output;
use ao_core::{ActivityState, Session};
use async_trait::async_trait;

/// Lines of scrollback inspected when classifying the pane.
const CAPTURE_LINES: &str = "-40";

/// Commands that mean the agent exited and left its parent shell in the pane.
const SHELLS: &[&str] = &["bash", "zsh", "sh", "fish", "dash"];

const WAITING_PATTERNS: &[&str] = &[
    "do you want to proceed?",
    "do you want to make this edit",
    "do you want to create",
    "would you like to",
    "[y/n]",
    "(y/n)",
];

const BLOCKED_PATTERNS: &[&str] = &[
    "api error",
    "rate limit",
    "usage limit reached",
    "overloaded_error",
    "credit balance is too low",
];

/// Agent plugin for Claude Code running inside a tmux session.
///
/// Sessions on other runtimes cannot be inspected and report `Unknown`, so
/// the caller falls back to the recorded activity.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClaudeAgent;

impl ClaudeAgent {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AgentAdapter for ClaudeAgent {
    async fn detect_activity(&self, session: &Session) -> Result<ActivityState, AgentError> {
        let handle = session
            .runtime_handle
            .as_ref()
            .ok_or_else(|| AgentError::NoRuntimeHandle(session.id.clone()))?;
        if handle.runtime != "tmux" {
            return Ok(ActivityState::Unknown);
        }

        let info = tmux_output(
            &[
                "display-message",
                "-t",
                &handle.id,
                "-p",
                "#{pane_dead} #{pane_current_command}",
            ],
            "tmux display-message",
        )
        .await?;
        if !agent_process_present(&String::from_utf8_lossy(&info.stdout)) {
            return Ok(ActivityState::Exited);
        }

        let pane = tmux_output(
            &["capture-pane", "-t", &handle.id, "-p", "-S", CAPTURE_LINES],
            "tmux capture-pane",
        )
        .await?;
        Ok(classify_pane(&String::from_utf8_lossy(&pane.stdout)))
    }
}

/// Parse `#{pane_dead} #{pane_current_command}` output.
fn agent_process_present(info: &str) -> bool {
    let mut parts = info.split_whitespace();
    let dead = parts.next().unwrap_or("0");
    let command = parts.next().unwrap_or("");
    if dead == "1" {
        return false;
    }
    !SHELLS.contains(&command)
}

/// Classify captured pane text.
///
/// Only the tail of the pane counts; a prompt that scrolled away has
/// already been answered.
pub fn classify_pane(text: &str) -> ActivityState {
    let tail: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .rev()
        .take(15)
        .map(str::to_lowercase)
        .collect();
    if tail.is_empty() {
        return ActivityState::Unknown;
    }

    let any = |patterns: &[&str]| {
        tail.iter()
            .any(|line| patterns.iter().any(|p| line.contains(p)))
    };
    if any(WAITING_PATTERNS) {
        ActivityState::WaitingInput
    } else if any(BLOCKED_PATTERNS) {
        ActivityState::Blocked
    } else {
        ActivityState::Active
    }
}

#[cfg(test)]
#[path = "claude_tests.rs"]
mod tests;
