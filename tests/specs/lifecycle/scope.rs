//! Runners scoped to one project.

use crate::prelude::*;
use ao_core::{EventType, ProjectId, SessionStatus};

#[tokio::test]
async fn scoped_runner_leaves_other_projects_alone() {
    let project = Project::new();
    project.add(session("w1", "web")).await;
    project.add(session("d1", "docs")).await;
    let mut runner = project.runner().scoped_to(ProjectId::new("web"));
    runner.start(LIFECYCLE_POLL).unwrap();
    let bus = runner.event_bus().unwrap().clone();

    assert!(wait_for(SPEC_WAIT_MAX_MS, || has_event(&bus, EventType::SessionWorking)).await);
    settle().await;

    assert!(session_timeline(&bus, "d1").is_empty());
    assert_eq!(project.session("d1").await.status, SessionStatus::Spawning);
    assert_eq!(project.session("w1").await.status, SessionStatus::Working);
}

#[tokio::test]
async fn scoped_all_complete_ignores_out_of_scope_sessions() {
    let project = Project::new();
    project.add(session("w1", "web")).await;
    project.add(session("d1", "docs")).await;
    project.plugins.runtime.set_alive("ao-w1", false);
    let mut runner = project.runner().scoped_to(ProjectId::new("web"));
    runner.start(LIFECYCLE_POLL).unwrap();
    let bus = runner.event_bus().unwrap().clone();

    assert!(
        wait_for(SPEC_WAIT_MAX_MS, || has_event(&bus, EventType::SummaryAllComplete)).await
    );
    settle().await;

    let summaries = events_of(&bus, EventType::SummaryAllComplete);
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].session_id, ao_lifecycle::SYSTEM_SESSION);
    assert_eq!(summaries[0].project_id, ProjectId::new("web"));
    assert_eq!(session_timeline(&bus, "w1"), vec![EventType::SessionKilled]);
}
