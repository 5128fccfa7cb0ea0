// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ao_core::{FakeClock, RuntimeHandle};
use yare::parameterized;

#[parameterized(
    working = { "● Reading src/main.rs\n  ✻ Thinking… (esc to interrupt)", ActivityState::Active },
    permission = { "Edit file src/lib.rs?\n Do you want to proceed?\n ❯ 1. Yes\n   2. No", ActivityState::WaitingInput },
    yes_no = { "Overwrite existing branch? [y/N]", ActivityState::WaitingInput },
    api_error = { "  ⎿  API Error: 529 {\"type\":\"overloaded_error\"}", ActivityState::Blocked },
    rate_limited = { "Claude usage limit reached. Your limit will reset at 5pm", ActivityState::Blocked },
    blank = { "\n   \n", ActivityState::Unknown },
)]
fn classify(text: &str, expected: ActivityState) {
    assert_eq!(classify_pane(text), expected);
}

#[test]
fn classify_ignores_prompts_that_scrolled_away() {
    let mut text = String::from("Do you want to proceed?\n");
    for i in 0..20 {
        text.push_str(&format!("● step {}\n", i));
    }
    assert_eq!(classify_pane(&text), ActivityState::Active);
}

#[test]
fn classify_prefers_waiting_over_blocked() {
    let text = "API Error: 500\nRetry? (y/n)";
    assert_eq!(classify_pane(text), ActivityState::WaitingInput);
}

#[parameterized(
    claude_running = { "0 claude", true },
    node_running = { "0 node", true },
    back_at_shell = { "0 zsh", false },
    pane_dead = { "1 claude", false },
    empty = { "", true },
)]
fn process_presence(info: &str, expected: bool) {
    assert_eq!(agent_process_present(info), expected);
}

#[tokio::test]
async fn session_without_handle_is_an_error() {
    let session = Session::new("s1", "p1", &FakeClock::new());
    let err = ClaudeAgent::new().detect_activity(&session).await.unwrap_err();
    assert!(matches!(err, AgentError::NoRuntimeHandle(_)));
}

#[tokio::test]
async fn non_tmux_runtime_is_unknown() {
    let session = Session::new("s1", "p1", &FakeClock::new())
        .with_runtime_handle(RuntimeHandle::new("process", "1234"));
    let activity = ClaudeAgent::new().detect_activity(&session).await.unwrap();
    assert_eq!(activity, ActivityState::Unknown);
}
