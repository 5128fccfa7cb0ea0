//! A session's pull request moving through CI and review to merge.

use crate::prelude::*;
use ao_core::{
    CiCheck, CiCheckStatus, EventPriority, EventType, Mergeability, PrRef, PrState,
    ReviewDecision, SessionStatus,
};

#[tokio::test]
async fn pr_moves_from_open_through_ci_failure_to_merge() {
    let project = Project::new();
    project.add(session("s1", "web").with_pr(PrRef::new(7))).await;
    let scm = &project.plugins.scm;
    let (mut runner, bus) = project.start();

    assert!(wait_for(SPEC_WAIT_MAX_MS, || has_event(&bus, EventType::PrCreated)).await);
    assert_eq!(project.session("s1").await.status, SessionStatus::PrOpen);

    scm.set_ci_checks(7, vec![CiCheck::new("build", CiCheckStatus::Failed)]);
    assert!(wait_for(SPEC_WAIT_MAX_MS, || has_event(&bus, EventType::ReactionTriggered)).await);
    assert_eq!(
        project.plugins.runtime.sent_messages(),
        vec![("ao-s1".to_string(), "CI is failing. Fix it.".to_string())]
    );
    assert_eq!(project.session("s1").await.status, SessionStatus::CiFailed);

    // Review lands while CI is still red; the PR only becomes mergeable once
    // the checks pass.
    scm.set_review(7, ReviewDecision::Approved);
    scm.set_mergeability(7, Mergeability::ready());
    scm.set_ci_checks(7, vec![CiCheck::new("build", CiCheckStatus::Passed)]);
    assert!(wait_for(SPEC_WAIT_MAX_MS, || has_event(&bus, EventType::MergeReady)).await);

    scm.set_pr_state(7, PrState::Merged);
    assert!(
        wait_for(SPEC_WAIT_MAX_MS, || has_event(&bus, EventType::SummaryAllComplete)).await
    );
    runner.stop();

    similar_asserts::assert_eq!(
        session_timeline(&bus, "s1"),
        vec![
            EventType::PrCreated,
            EventType::CiFailing,
            EventType::ReactionTriggered,
            EventType::MergeReady,
            EventType::MergeCompleted,
        ]
    );
    assert_eq!(project.session("s1").await.status, SessionStatus::Merged);

    let ci = &events_of(&bus, EventType::CiFailing)[0];
    assert_eq!(ci.message, "Session s1 is now ci_failed (was pr_open)");
    assert_eq!(ci.data["from"], "pr_open");
    assert_eq!(ci.data["to"], "ci_failed");

    assert!(
        wait_for(SPEC_WAIT_MAX_MS, || project.plugins.desk.calls().len() == 2).await,
        "desk saw {:?}",
        project.plugins.desk.calls()
    );
    let desk = project.plugins.desk.calls();
    assert_eq!(desk[0].event_type, EventType::MergeReady);
    assert_eq!(desk[0].priority, EventPriority::Action);
    assert_eq!(desk[1].event_type, EventType::SummaryAllComplete);
    assert_eq!(desk[1].priority, EventPriority::Info);
    assert!(project.plugins.pager.calls().is_empty());
}

#[tokio::test]
async fn session_without_pr_is_promoted_to_working_once() {
    let project = Project::new();
    project.add(session("s1", "docs")).await;
    let (_runner, bus) = project.start();

    assert!(wait_for(SPEC_WAIT_MAX_MS, || has_event(&bus, EventType::SessionWorking)).await);
    settle().await;

    assert_eq!(session_timeline(&bus, "s1"), vec![EventType::SessionWorking]);
    assert_eq!(project.session("s1").await.status, SessionStatus::Working);
}

#[tokio::test]
async fn closed_pr_kills_the_session() {
    let project = Project::new();
    project.add(session("s1", "web").with_pr(PrRef::new(3))).await;
    project.plugins.scm.set_pr_state(3, PrState::Closed);
    let (_runner, bus) = project.start();

    assert!(wait_for(SPEC_WAIT_MAX_MS, || has_event(&bus, EventType::SessionKilled)).await);
    assert_eq!(project.session("s1").await.status, SessionStatus::Killed);
}

#[tokio::test]
async fn unreachable_ci_is_treated_as_failing() {
    let project = Project::new();
    project.add(session("s1", "web").with_pr(PrRef::new(9))).await;
    project.plugins.scm.fail_ci_checks(9, "rate limited");
    let (_runner, bus) = project.start();

    assert!(wait_for(SPEC_WAIT_MAX_MS, || has_event(&bus, EventType::CiFailing)).await);
    assert_eq!(project.session("s1").await.status, SessionStatus::CiFailed);
}
