//! The event log: append-only JSONL that survives restarts.

use crate::prelude::*;
use ao_core::{EventFilter, EventType};

#[tokio::test]
async fn every_emitted_event_is_logged_in_order() {
    let project = Project::new();
    project.add(session("s1", "docs")).await;
    project.add(session("s2", "docs")).await;
    let (mut runner, bus) = project.start();

    assert!(wait_for(SPEC_WAIT_MAX_MS, || events_of(&bus, EventType::SessionWorking).len() == 2).await);
    runner.stop();

    let history: Vec<_> = bus.history(&EventFilter::new());
    similar_asserts::assert_eq!(project.logged_events(), history);
}

#[tokio::test]
async fn restart_replays_history_without_repeating_transitions() {
    let project = Project::new();
    project.add(session("s1", "docs")).await;

    let (mut first, bus) = project.start();
    assert!(wait_for(SPEC_WAIT_MAX_MS, || has_event(&bus, EventType::SessionWorking)).await);
    first.stop();
    drop(first);

    let (_second, bus) = project.start();
    assert_eq!(events_of(&bus, EventType::SessionWorking).len(), 1);
    settle().await;

    // The record already says working, so the fresh manager sees no change.
    assert_eq!(events_of(&bus, EventType::SessionWorking).len(), 1);
    assert_eq!(project.logged_events().len(), 1);
}

#[tokio::test]
async fn torn_trailing_line_is_skipped_and_appends_continue() {
    let project = Project::new();
    let log = project.event_log_path();
    std::fs::create_dir_all(log.parent().unwrap()).unwrap();
    std::fs::write(&log, "{\"type\":\"session.work").unwrap();
    project.add(session("s1", "docs")).await;

    let (_runner, bus) = project.start();
    assert!(wait_for(SPEC_WAIT_MAX_MS, || has_event(&bus, EventType::SessionWorking)).await);

    let text = std::fs::read_to_string(&log).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2, "log was:\n{}", text);
    assert_eq!(lines[0], "{\"type\":\"session.work");
    assert_eq!(project.logged_events().len(), 1);
    assert_eq!(bus.len(), 1);
}
