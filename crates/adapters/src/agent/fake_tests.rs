// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ao_core::FakeClock;

#[tokio::test]
async fn echoes_recorded_activity_by_default() {
    let agent = FakeAgent::new();
    let session =
        Session::new("s1", "p1", &FakeClock::new()).with_activity(ActivityState::Idle);
    assert_eq!(
        agent.detect_activity(&session).await.unwrap(),
        ActivityState::Idle
    );
    assert_eq!(agent.calls(), vec![SessionId::new("s1")]);
}

#[tokio::test]
async fn override_wins_over_recorded_activity() {
    let agent = FakeAgent::new();
    agent.set_activity("s1", ActivityState::Blocked);
    let session = Session::new("s1", "p1", &FakeClock::new());
    assert_eq!(
        agent.detect_activity(&session).await.unwrap(),
        ActivityState::Blocked
    );
}

#[tokio::test]
async fn failure_then_recovery() {
    let agent = FakeAgent::new();
    let session = Session::new("s1", "p1", &FakeClock::new());
    agent.fail_detection("s1", "pane vanished");
    assert!(agent.detect_activity(&session).await.is_err());

    agent.set_activity("s1", ActivityState::Active);
    assert_eq!(
        agent.detect_activity(&session).await.unwrap(),
        ActivityState::Active
    );
}
