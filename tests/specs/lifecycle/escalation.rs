//! Reactions that cannot succeed end up with a human.

use crate::prelude::*;
use ao_core::{ActivityState, EventPriority, EventType, PrRef};

#[tokio::test]
async fn undeliverable_fix_request_escalates_to_the_pager() {
    let project = Project::new();
    project.add(session("s1", "web").with_pr(PrRef::new(4))).await;
    project.plugins.scm.fail_ci_checks(4, "checks api down");
    project.plugins.runtime.set_send_error(Some("pane is gone"));
    let (_runner, bus) = project.start();

    assert!(
        wait_for(SPEC_WAIT_MAX_MS, || has_event(&bus, EventType::ReactionEscalated)).await
    );
    settle().await;

    // Two failed deliveries, then the third attempt exceeds `retries = 2`.
    let escalations = events_of(&bus, EventType::ReactionEscalated);
    assert_eq!(escalations.len(), 1);
    assert_eq!(escalations[0].data["reaction"], "ci-failed");
    assert_eq!(escalations[0].data["attempts"], 3);
    assert_eq!(escalations[0].priority, EventPriority::Urgent);
    assert!(!has_event(&bus, EventType::ReactionTriggered));
    assert!(project.plugins.runtime.sent_messages().is_empty());

    let paged = project.plugins.pager.calls();
    assert_eq!(paged.len(), 1);
    assert_eq!(paged[0].event_type, EventType::ReactionEscalated);
    assert!(project.plugins.desk.calls().is_empty());
}

#[tokio::test]
async fn stuck_agent_pages_urgently() {
    let project = Project::new();
    project.add(session("s1", "docs")).await;
    project.plugins.agent.set_activity("s1", ActivityState::Blocked);
    let (_runner, bus) = project.start();

    assert!(wait_for(SPEC_WAIT_MAX_MS, || !project.plugins.pager.calls().is_empty()).await);
    assert_eq!(session_timeline(&bus, "s1"), vec![EventType::SessionStuck]);

    let paged = project.plugins.pager.calls();
    assert_eq!(paged[0].event_type, EventType::SessionStuck);
    assert_eq!(paged[0].priority, EventPriority::Urgent);
}

#[tokio::test]
async fn failing_notifier_does_not_stop_polling() {
    let project = Project::new();
    project.add(session("s1", "docs")).await;
    project.plugins.agent.set_activity("s1", ActivityState::Blocked);
    project.plugins.pager.set_error(Some("pager offline"));
    let (_runner, bus) = project.start();

    assert!(wait_for(SPEC_WAIT_MAX_MS, || has_event(&bus, EventType::SessionStuck)).await);

    project.plugins.runtime.set_alive("ao-s1", false);
    assert!(wait_for(SPEC_WAIT_MAX_MS, || has_event(&bus, EventType::SessionKilled)).await);
    assert_eq!(project.plugins.pager.calls().len(), 1);
}
