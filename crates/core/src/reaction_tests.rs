// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

fn tracker(attempts: u32) -> ReactionTracker {
    ReactionTracker {
        attempts,
        first_triggered: t0(),
        pending_retry: false,
    }
}

#[test]
fn deserializes_with_defaults() {
    let config: ReactionConfig = serde_json::from_str(r#"{"action":"send-to-agent"}"#).unwrap();
    assert!(config.auto);
    assert_eq!(config.action, Some(ReactionAction::SendToAgent));
    assert_eq!(config.retries, None);
    assert_eq!(config.escalate_after, None);
}

#[yare::parameterized(
    count    = { r#"3"#,      EscalateAfter::Attempts(3) },
    minutes  = { r#""10m""#,  EscalateAfter::Elapsed(Duration::from_secs(600)) },
    seconds  = { r#""30s""#,  EscalateAfter::Elapsed(Duration::from_secs(30)) },
)]
fn escalate_after_accepts_count_or_duration(json: &str, expected: EscalateAfter) {
    let parsed: EscalateAfter = serde_json::from_str(json).unwrap();
    assert_eq!(parsed, expected);
}

#[test]
fn escalate_after_rejects_bad_duration() {
    let result: Result<EscalateAfter, _> = serde_json::from_str(r#""soon""#);
    assert!(result.is_err());
}

#[test]
fn action_uses_kebab_case() {
    let parsed: ReactionAction = serde_json::from_str(r#""auto-merge""#).unwrap();
    assert_eq!(parsed, ReactionAction::AutoMerge);
}

#[yare::parameterized(
    within_retries   = { 1, false },
    at_retries       = { 2, false },
    beyond_retries   = { 3, true },
)]
fn escalates_once_attempts_exceed_retries(attempts: u32, expected: bool) {
    let config = ReactionConfig::new(ReactionAction::SendToAgent).with_retries(2);
    assert_eq!(config.should_escalate(&tracker(attempts), t0()), expected);
}

#[test]
fn unbounded_retries_never_escalate_on_count() {
    let config = ReactionConfig::new(ReactionAction::SendToAgent);
    assert!(!config.should_escalate(&tracker(1_000), t0()));
}

#[test]
fn escalates_on_attempt_threshold() {
    let config = ReactionConfig::new(ReactionAction::SendToAgent)
        .with_escalate_after(EscalateAfter::Attempts(1));
    assert!(!config.should_escalate(&tracker(1), t0()));
    assert!(config.should_escalate(&tracker(2), t0()));
}

#[test]
fn escalates_after_elapsed_time() {
    let config = ReactionConfig::new(ReactionAction::SendToAgent)
        .with_escalate_after(EscalateAfter::Elapsed(Duration::from_secs(600)));

    let at_limit = t0() + chrono::Duration::seconds(600);
    let past_limit = t0() + chrono::Duration::seconds(601);
    assert!(!config.should_escalate(&tracker(1), at_limit));
    assert!(config.should_escalate(&tracker(1), past_limit));
}
