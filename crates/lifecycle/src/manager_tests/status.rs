// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ao_core::{CiCheck, CiCheckStatus, EventPriority, Mergeability, PrState, ReviewDecision};
use yare::parameterized;

#[parameterized(
    spawning = { SessionStatus::Spawning, None },
    working = { SessionStatus::Working, Some(EventType::SessionWorking) },
    pr_open = { SessionStatus::PrOpen, Some(EventType::PrCreated) },
    ci_failed = { SessionStatus::CiFailed, Some(EventType::CiFailing) },
    review_pending = { SessionStatus::ReviewPending, Some(EventType::ReviewPending) },
    changes_requested = { SessionStatus::ChangesRequested, Some(EventType::ReviewChangesRequested) },
    approved = { SessionStatus::Approved, Some(EventType::ReviewApproved) },
    mergeable = { SessionStatus::Mergeable, Some(EventType::MergeReady) },
    merged = { SessionStatus::Merged, Some(EventType::MergeCompleted) },
    needs_input = { SessionStatus::NeedsInput, Some(EventType::SessionNeedsInput) },
    stuck = { SessionStatus::Stuck, Some(EventType::SessionStuck) },
    errored = { SessionStatus::Errored, Some(EventType::SessionErrored) },
    killed = { SessionStatus::Killed, Some(EventType::SessionKilled) },
)]
fn status_event_table(status: SessionStatus, expected: Option<EventType>) {
    assert_eq!(event_for_status(status), expected);
}

#[parameterized(
    ci_failing = { EventType::CiFailing, Some("ci-failed") },
    changes_requested = { EventType::ReviewChangesRequested, Some("changes-requested") },
    conflicts = { EventType::MergeConflicts, Some("merge-conflicts") },
    merge_ready = { EventType::MergeReady, Some("approved-and-green") },
    stuck = { EventType::SessionStuck, Some("agent-stuck") },
    needs_input = { EventType::SessionNeedsInput, Some("agent-needs-input") },
    killed = { EventType::SessionKilled, Some("agent-exited") },
    all_complete = { EventType::SummaryAllComplete, Some("all-complete") },
    working = { EventType::SessionWorking, None },
    merged = { EventType::MergeCompleted, None },
    triggered = { EventType::ReactionTriggered, None },
)]
fn reaction_key_table(event_type: EventType, expected: Option<&str>) {
    assert_eq!(reaction_key_for_event(event_type), expected);
}

#[parameterized(
    ci_failed = { SessionStatus::CiFailed, EventPriority::Warning },
    mergeable = { SessionStatus::Mergeable, EventPriority::Action },
    merged = { SessionStatus::Merged, EventPriority::Action },
    stuck = { SessionStatus::Stuck, EventPriority::Urgent },
    working = { SessionStatus::Working, EventPriority::Info },
)]
fn status_events_carry_inferred_priority(status: SessionStatus, priority: EventPriority) {
    assert_eq!(event_for_status(status).map(EventType::priority), Some(priority));
}

#[tokio::test]
async fn spawning_is_promoted_without_collaborators() {
    let h = Harness::bare();
    h.add(session("s1", SessionStatus::Spawning));
    h.poll().await;
    assert_eq!(h.status("s1"), Some(SessionStatus::Working));
}

#[tokio::test]
async fn dead_runtime_wins_over_everything() {
    let h = Harness::new();
    h.add(pr_session("s1", 7, SessionStatus::PrOpen).with_activity(ActivityState::Blocked));
    h.scm.set_pr_state(7, PrState::Merged);
    h.runtime.set_alive("s1", false);

    h.poll().await;

    assert_eq!(h.status("s1"), Some(SessionStatus::Killed));
    assert!(h.agent.calls().is_empty());
    assert!(h.scm.calls().is_empty());
}

#[tokio::test]
async fn failed_liveness_probe_counts_as_alive() {
    let h = Harness::new();
    h.add(session("s1", SessionStatus::Spawning));
    h.runtime.fail_probe("s1", "tmux server gone");
    h.poll().await;
    assert_eq!(h.status("s1"), Some(SessionStatus::Working));
}

#[tokio::test]
async fn unknown_runtime_plugin_skips_the_liveness_step() {
    let h = Harness::new();
    h.add(
        session("s1", SessionStatus::Spawning)
            .with_runtime_handle(RuntimeHandle::new("docker", "s1")),
    );
    h.runtime.set_alive("s1", false);
    h.poll().await;
    assert_eq!(h.status("s1"), Some(SessionStatus::Working));
}

#[parameterized(
    exited = { ActivityState::Exited, SessionStatus::Killed },
    blocked = { ActivityState::Blocked, SessionStatus::Stuck },
    waiting_input = { ActivityState::WaitingInput, SessionStatus::NeedsInput },
    active = { ActivityState::Active, SessionStatus::Working },
    idle = { ActivityState::Idle, SessionStatus::Working },
    unknown = { ActivityState::Unknown, SessionStatus::Working },
)]
#[test_macro(tokio::test)]
async fn agent_activity_maps_to_status(activity: ActivityState, expected: SessionStatus) {
    let h = Harness::new();
    h.add(session("s1", SessionStatus::Spawning));
    h.agent.set_activity("s1", activity);
    h.poll().await;
    assert_eq!(h.status("s1"), Some(expected));
}

#[tokio::test]
async fn failed_activity_detection_uses_last_known_activity() {
    let h = Harness::new();
    h.add(session("s1", SessionStatus::Working).with_activity(ActivityState::WaitingInput));
    h.agent.fail_detection("s1", "pane unreadable");
    h.poll().await;
    assert_eq!(h.status("s1"), Some(SessionStatus::NeedsInput));
}

#[tokio::test]
async fn activity_wins_over_pr_signals() {
    let h = Harness::new();
    h.add(pr_session("s1", 7, SessionStatus::PrOpen).with_activity(ActivityState::Blocked));
    h.scm.set_pr_state(7, PrState::Merged);
    h.poll().await;
    assert_eq!(h.status("s1"), Some(SessionStatus::Stuck));
    assert!(h.scm.calls().is_empty());
}

fn failing() -> Vec<CiCheck> {
    vec![
        CiCheck::new("lint", CiCheckStatus::Passed),
        CiCheck::new("test", CiCheckStatus::Failed),
    ]
}

fn passing() -> Vec<CiCheck> {
    vec![CiCheck::new("test", CiCheckStatus::Passed)]
}

#[parameterized(
    merged = { PrState::Merged, failing(), ReviewDecision::Approved, true, SessionStatus::Merged },
    closed = { PrState::Closed, passing(), ReviewDecision::None, false, SessionStatus::Killed },
    ci_failing = { PrState::Open, failing(), ReviewDecision::Approved, true, SessionStatus::CiFailed },
    changes_requested = { PrState::Open, passing(), ReviewDecision::ChangesRequested, false, SessionStatus::ChangesRequested },
    approved_and_mergeable = { PrState::Open, passing(), ReviewDecision::Approved, true, SessionStatus::Mergeable },
    approved_but_blocked = { PrState::Open, passing(), ReviewDecision::Approved, false, SessionStatus::Approved },
    review_pending = { PrState::Open, passing(), ReviewDecision::Pending, false, SessionStatus::ReviewPending },
    no_review = { PrState::Open, passing(), ReviewDecision::None, false, SessionStatus::PrOpen },
    no_checks = { PrState::Open, Vec::new(), ReviewDecision::None, false, SessionStatus::PrOpen },
)]
#[test_macro(tokio::test)]
async fn pr_cascade(
    state: PrState,
    checks: Vec<CiCheck>,
    review: ReviewDecision,
    mergeable: bool,
    expected: SessionStatus,
) {
    let h = Harness::new();
    h.add(pr_session("s1", 7, SessionStatus::Working));
    h.scm.set_pr_state(7, state);
    h.scm.set_ci_checks(7, checks);
    h.scm.set_review(7, review);
    let merge = if mergeable {
        Mergeability::ready()
    } else {
        Mergeability::blocked("needs approval")
    };
    h.scm.set_mergeability(7, merge);

    h.poll().await;

    assert_eq!(h.status("s1"), Some(expected));
}

#[tokio::test]
async fn scm_failure_keeps_current_status() {
    let h = Harness::new();
    h.add(pr_session("s1", 7, SessionStatus::ReviewPending));
    h.scm.fail_all(7, "gh: rate limited");

    h.poll().await;

    assert_eq!(h.status("s1"), Some(SessionStatus::ReviewPending));
    assert!(h.events().is_empty());
    assert!(h.sessions.status_updates().is_empty());
}

#[tokio::test]
async fn scm_failure_does_not_promote_spawning() {
    let h = Harness::new();
    h.add(pr_session("s1", 7, SessionStatus::Spawning));
    h.scm.fail_all(7, "gh: not authenticated");
    h.poll().await;
    assert_eq!(h.status("s1"), Some(SessionStatus::Spawning));
}

#[tokio::test]
async fn ci_check_failure_fails_closed() {
    let h = Harness::new();
    h.add(pr_session("s1", 7, SessionStatus::PrOpen));
    h.scm.fail_ci_checks(7, "gh: timeout");
    h.scm.set_review(7, ReviewDecision::Approved);
    h.scm.set_mergeability(7, Mergeability::ready());

    h.poll().await;

    assert_eq!(h.status("s1"), Some(SessionStatus::CiFailed));
}

#[tokio::test]
async fn project_without_scm_ignores_its_pr() {
    let h = Harness::new();
    let s = pr_session("s1", 7, SessionStatus::Spawning);
    h.add(Session {
        project_id: ProjectId::new("docs"),
        ..s
    });
    h.scm.set_pr_state(7, PrState::Merged);

    h.poll().await;

    assert_eq!(h.status("s1"), Some(SessionStatus::Working));
    assert!(h.scm.calls().is_empty());
}

#[tokio::test]
async fn recovers_once_scm_comes_back() {
    let h = Harness::new();
    h.add(pr_session("s1", 7, SessionStatus::PrOpen));
    h.scm.fail_all(7, "offline");
    h.poll().await;
    assert_eq!(h.status("s1"), Some(SessionStatus::PrOpen));

    h.scm.clear_failure(7);
    h.scm.set_review(7, ReviewDecision::Pending);
    h.poll().await;
    assert_eq!(h.status("s1"), Some(SessionStatus::ReviewPending));
    assert_eq!(h.event_types(), vec![EventType::ReviewPending]);
}
