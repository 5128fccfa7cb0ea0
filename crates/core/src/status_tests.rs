// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    spawning          = { SessionStatus::Spawning,         false },
    working           = { SessionStatus::Working,          false },
    pr_open           = { SessionStatus::PrOpen,           false },
    ci_failed         = { SessionStatus::CiFailed,         false },
    review_pending    = { SessionStatus::ReviewPending,    false },
    changes_requested = { SessionStatus::ChangesRequested, false },
    approved          = { SessionStatus::Approved,         false },
    mergeable         = { SessionStatus::Mergeable,        false },
    merged            = { SessionStatus::Merged,           true },
    needs_input       = { SessionStatus::NeedsInput,       false },
    stuck             = { SessionStatus::Stuck,            false },
    errored           = { SessionStatus::Errored,          false },
    killed            = { SessionStatus::Killed,           true },
)]
fn terminal_statuses(status: SessionStatus, terminal: bool) {
    assert_eq!(status.is_terminal(), terminal);
}

#[test]
fn status_serializes_as_snake_case_matching_display() {
    for status in [
        SessionStatus::PrOpen,
        SessionStatus::ChangesRequested,
        SessionStatus::NeedsInput,
    ] {
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, format!("\"{}\"", status));
    }
}

#[test]
fn activity_defaults_to_unknown() {
    assert_eq!(ActivityState::default(), ActivityState::Unknown);
    let parsed: ActivityState = serde_json::from_str("\"waiting_input\"").unwrap();
    assert_eq!(parsed, ActivityState::WaitingInput);
}
