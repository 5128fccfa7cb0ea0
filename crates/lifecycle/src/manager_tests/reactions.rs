// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ao_core::{
    CiCheck, CiCheckStatus, EventPriority, Mergeability, PrState, ReactionAction, ReactionConfig,
    ReviewDecision,
};

fn fail_ci(h: &Harness, number: u64) {
    h.scm
        .set_ci_checks(number, vec![CiCheck::new("test", CiCheckStatus::Failed)]);
}

fn pass_ci(h: &Harness, number: u64) {
    h.scm
        .set_ci_checks(number, vec![CiCheck::new("test", CiCheckStatus::Passed)]);
}

fn trigger(h: &Harness, event_type: EventType) -> OrchestratorEvent {
    OrchestratorEvent::new(event_type, "s1", "web", "trigger", h.clock.now())
}

#[tokio::test]
async fn ci_failure_sends_configured_message() {
    let h = Harness::new();
    h.add(pr_session("s1", 7, SessionStatus::PrOpen));
    fail_ci(&h, 7);

    h.poll().await;

    assert_eq!(h.status("s1"), Some(SessionStatus::CiFailed));
    assert_eq!(h.events_of(EventType::CiFailing).len(), 1);
    assert_eq!(
        h.sessions.sent(),
        vec![(SessionId::new("s1"), "CI is failing. Fix it.".to_string())]
    );
    let triggered = h.events_of(EventType::ReactionTriggered);
    assert_eq!(triggered.len(), 1);
    assert_eq!(triggered[0].data["reaction"], "ci-failed");
    assert_eq!(triggered[0].data["attempts"], 1);
}

#[tokio::test]
async fn disabled_reaction_does_nothing() {
    let h = Harness::new();
    h.add(pr_session("s1", 7, SessionStatus::PrOpen));
    h.scm.set_review(7, ReviewDecision::ChangesRequested);

    h.poll().await;

    assert_eq!(h.status("s1"), Some(SessionStatus::ChangesRequested));
    assert!(h.sessions.sent().is_empty());
    assert!(h.manager.tracker(&SessionId::new("s1"), "changes-requested").is_none());
}

#[tokio::test]
async fn project_override_replaces_message() {
    let h = Harness::with_config(&format!(
        "{}\n[projects.web.reactions.ci-failed]\nmessage = \"Fix the web build.\"\n",
        CONFIG
    ));
    h.add(pr_session("s1", 7, SessionStatus::PrOpen));
    fail_ci(&h, 7);

    h.poll().await;

    assert_eq!(
        h.sessions.sent(),
        vec![(SessionId::new("s1"), "Fix the web build.".to_string())]
    );
}

#[tokio::test]
async fn missing_message_falls_back_to_event_message() {
    let h = Harness::with_config(
        r#"
[projects.web]
scm = "github"

[reactions.ci-failed]
action = "send-to-agent"
"#,
    );
    h.add(pr_session("s1", 7, SessionStatus::PrOpen));
    fail_ci(&h, 7);

    h.poll().await;

    let event = &h.events_of(EventType::CiFailing)[0];
    assert_eq!(
        h.sessions.sent(),
        vec![(SessionId::new("s1"), event.message.clone())]
    );
}

#[tokio::test]
async fn third_trigger_escalates_with_two_retries() {
    let h = Harness::new();
    h.add(session("s1", SessionStatus::CiFailed));
    let reaction = ReactionConfig::new(ReactionAction::SendToAgent)
        .with_message("fix it")
        .with_retries(2);
    let event = trigger(&h, EventType::CiFailing);

    let first = h.manager.execute_reaction("ci-failed", &reaction, &event).await.unwrap();
    let second = h.manager.execute_reaction("ci-failed", &reaction, &event).await.unwrap();
    let third = h.manager.execute_reaction("ci-failed", &reaction, &event).await.unwrap();

    assert!(!first.escalated && first.success);
    assert!(!second.escalated && second.success);
    assert!(third.escalated && third.success);
    assert_eq!(h.sessions.sent().len(), 2);

    let paged = h.pager.calls();
    assert_eq!(paged.len(), 1);
    assert_eq!(paged[0].priority, EventPriority::Urgent);
    assert_eq!(paged[0].event_type, EventType::ReactionEscalated);
    assert!(h.log.calls().is_empty());

    let escalated = h.events_of(EventType::ReactionEscalated);
    assert_eq!(escalated.len(), 1);
    assert_eq!(escalated[0].data["attempts"], 3);
}

#[tokio::test]
async fn escalation_uses_reaction_priority() {
    let h = Harness::new();
    h.add(session("s1", SessionStatus::CiFailed));
    let reaction = ReactionConfig::new(ReactionAction::SendToAgent)
        .with_retries(0)
        .with_priority(EventPriority::Warning);

    let result = h
        .manager
        .execute_reaction("ci-failed", &reaction, &trigger(&h, EventType::CiFailing))
        .await
        .unwrap();

    assert!(result.escalated);
    assert!(h.pager.calls().is_empty());
    assert_eq!(h.log.calls()[0].priority, EventPriority::Warning);
}

#[tokio::test]
async fn escalate_after_duration() {
    let h = Harness::new();
    h.add(session("s1", SessionStatus::CiFailed));
    let reaction = ReactionConfig::new(ReactionAction::SendToAgent)
        .with_escalate_after(ao_core::EscalateAfter::Elapsed(Duration::from_secs(600)));
    let event = trigger(&h, EventType::CiFailing);

    let first = h.manager.execute_reaction("ci-failed", &reaction, &event).await.unwrap();
    h.clock.advance(Duration::from_secs(300));
    let second = h.manager.execute_reaction("ci-failed", &reaction, &event).await.unwrap();
    h.clock.advance(Duration::from_secs(301));
    let third = h.manager.execute_reaction("ci-failed", &reaction, &event).await.unwrap();

    assert!(!first.escalated);
    assert!(!second.escalated);
    assert!(third.escalated);
}

#[tokio::test]
async fn escalate_after_count() {
    let h = Harness::new();
    h.add(session("s1", SessionStatus::Stuck));
    let reaction = ReactionConfig::new(ReactionAction::Notify)
        .with_escalate_after(ao_core::EscalateAfter::Attempts(1));
    let event = trigger(&h, EventType::SessionStuck);

    let first = h.manager.execute_reaction("agent-stuck", &reaction, &event).await.unwrap();
    let second = h.manager.execute_reaction("agent-stuck", &reaction, &event).await.unwrap();

    assert!(!first.escalated);
    assert!(second.escalated);
}

#[tokio::test]
async fn reaction_without_action_is_not_executed() {
    let h = Harness::new();
    let reaction = ReactionConfig {
        action: None,
        ..ReactionConfig::new(ReactionAction::Notify)
    };
    let result = h
        .manager
        .execute_reaction("agent-stuck", &reaction, &trigger(&h, EventType::SessionStuck))
        .await;
    assert!(result.is_none());
    assert!(h.manager.tracker(&SessionId::new("s1"), "agent-stuck").is_none());
}

#[tokio::test]
async fn failed_send_is_retried_until_escalation() {
    let h = Harness::new();
    h.add(pr_session("s1", 7, SessionStatus::PrOpen));
    fail_ci(&h, 7);
    h.sessions.fail_send(Some("pane closed"));

    h.poll().await;
    let tracker = h.manager.tracker(&SessionId::new("s1"), "ci-failed").unwrap();
    assert_eq!(tracker.attempts, 1);
    assert!(tracker.pending_retry);

    h.poll().await;
    assert_eq!(
        h.manager.tracker(&SessionId::new("s1"), "ci-failed").unwrap().attempts,
        2
    );
    assert!(h.pager.calls().is_empty());

    h.poll().await;
    let tracker = h.manager.tracker(&SessionId::new("s1"), "ci-failed").unwrap();
    assert_eq!(tracker.attempts, 3);
    assert!(!tracker.pending_retry);
    assert_eq!(h.pager.calls().len(), 1);

    // Escalated: nothing left to retry.
    h.poll().await;
    assert_eq!(
        h.manager.tracker(&SessionId::new("s1"), "ci-failed").unwrap().attempts,
        3
    );
    assert_eq!(h.events_of(EventType::CiFailing).len(), 1);
}

#[tokio::test]
async fn delivered_reaction_is_not_repeated() {
    let h = Harness::new();
    h.add(pr_session("s1", 7, SessionStatus::PrOpen));
    fail_ci(&h, 7);

    h.poll().await;
    h.poll().await;
    h.poll().await;

    assert_eq!(h.sessions.sent().len(), 1);
}

#[tokio::test]
async fn leaving_a_status_resets_its_tracker() {
    let h = Harness::new();
    h.add(pr_session("s1", 7, SessionStatus::PrOpen));
    fail_ci(&h, 7);
    h.poll().await;
    assert_eq!(
        h.manager.tracker(&SessionId::new("s1"), "ci-failed").unwrap().attempts,
        1
    );

    pass_ci(&h, 7);
    h.poll().await;
    assert_eq!(h.status("s1"), Some(SessionStatus::PrOpen));
    assert!(h.manager.tracker(&SessionId::new("s1"), "ci-failed").is_none());

    fail_ci(&h, 7);
    h.poll().await;
    assert_eq!(
        h.manager.tracker(&SessionId::new("s1"), "ci-failed").unwrap().attempts,
        1
    );
    assert_eq!(h.sessions.sent().len(), 2);
}

#[tokio::test]
async fn stuck_agent_pages_urgently() {
    let h = Harness::new();
    h.add(session("s1", SessionStatus::Working));
    h.agent.set_activity("s1", ActivityState::Blocked);

    h.poll().await;

    let paged = h.pager.calls();
    assert_eq!(paged.len(), 1);
    assert_eq!(paged[0].event_type, EventType::SessionStuck);
    assert_eq!(paged[0].priority, EventPriority::Urgent);
    assert!(h.log.calls().is_empty());
}

#[tokio::test]
async fn notify_defaults_to_info_priority() {
    let h = Harness::new();
    let reaction = ReactionConfig::new(ReactionAction::Notify);
    let result = h
        .manager
        .execute_reaction("agent-stuck", &reaction, &trigger(&h, EventType::SessionStuck))
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(h.log.calls()[0].priority, EventPriority::Info);
}

#[tokio::test]
async fn notifier_failures_are_swallowed() {
    let h = Harness::with_config(&CONFIG.replace(
        "urgent = [\"pager\"]",
        "urgent = [\"pager\", \"missing\", \"log\"]",
    ));
    h.pager.set_error(Some("pager offline"));
    h.add(session("s1", SessionStatus::Working));
    h.agent.set_activity("s1", ActivityState::Blocked);

    h.poll().await;

    assert_eq!(h.status("s1"), Some(SessionStatus::Stuck));
    assert_eq!(h.pager.calls().len(), 1);
    assert_eq!(h.log.calls().len(), 1);
}

#[tokio::test]
async fn mergeable_pr_is_announced_not_merged() {
    let h = Harness::new();
    h.add(pr_session("s1", 7, SessionStatus::ReviewPending));
    pass_ci(&h, 7);
    h.scm.set_review(7, ReviewDecision::Approved);
    h.scm.set_mergeability(7, Mergeability::ready());

    h.poll().await;

    assert_eq!(h.status("s1"), Some(SessionStatus::Mergeable));
    let announced = h.log.calls();
    assert_eq!(announced.len(), 1);
    assert_eq!(announced[0].event_type, EventType::MergeReady);
    assert_eq!(announced[0].priority, EventPriority::Action);
    assert!(h.sessions.sent().is_empty());
}

#[tokio::test]
async fn merged_pr_completes_without_reactions() {
    let h = Harness::new();
    h.add(pr_session("s1", 7, SessionStatus::Approved));
    h.scm.set_pr_state(7, PrState::Merged);

    h.poll().await;

    assert_eq!(h.status("s1"), Some(SessionStatus::Merged));
    assert_eq!(h.events_of(EventType::MergeCompleted).len(), 1);
    assert!(h.sessions.sent().is_empty());
    assert!(h.events_of(EventType::ReactionTriggered).is_empty());

    h.poll().await;
    assert_eq!(h.events_of(EventType::MergeCompleted).len(), 1);
}

#[tokio::test]
async fn all_complete_reaction_runs_as_system() {
    let h = Harness::new();
    h.add(pr_session("s1", 7, SessionStatus::Approved));
    h.scm.set_pr_state(7, PrState::Merged);

    h.poll().await;

    let summary: Vec<_> = h
        .log
        .calls()
        .into_iter()
        .filter(|e| e.event_type == EventType::SummaryAllComplete)
        .collect();
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].session_id, SYSTEM_SESSION);
    assert!(h
        .manager
        .tracker(&SessionId::new(SYSTEM_SESSION), "all-complete")
        .is_some());
}

#[tokio::test]
async fn builtin_reactions_apply_without_a_reactions_table() {
    let h = Harness::with_config(
        r#"
[defaults]
notifiers = ["log"]

[projects.web]
scm = "github"
"#,
    );
    h.add(session("s1", SessionStatus::Working));
    h.runtime.set_alive("s1", false);

    h.poll().await;

    let alerts: Vec<_> = h
        .log
        .calls()
        .into_iter()
        .filter(|e| e.event_type == EventType::SessionKilled)
        .collect();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].priority, EventPriority::Urgent);
}
