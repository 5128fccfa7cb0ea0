// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ao_core::FakeClock;

fn manager_with(ids: &[&str]) -> FakeSessionManager {
    let clock = FakeClock::new();
    let manager = FakeSessionManager::new();
    for id in ids {
        manager.insert(Session::new(*id, "app", &clock));
    }
    manager
}

#[tokio::test]
async fn list_is_ordered_by_id() {
    let manager = manager_with(&["b", "a", "c"]);
    let ids: Vec<_> = manager
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.id.to_string())
        .collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn send_to_unknown_session_is_not_found() {
    let manager = manager_with(&[]);
    let err = manager
        .send(&SessionId::new("ghost"), "hi")
        .await
        .unwrap_err();
    assert!(matches!(err, SessionManagerError::NotFound(_)));
    assert!(manager.sent().is_empty());
}

#[tokio::test]
async fn failed_send_is_not_recorded() {
    let manager = manager_with(&["a"]);
    manager.fail_send(Some("pane closed"));
    assert!(manager.send(&SessionId::new("a"), "hi").await.is_err());
    assert!(manager.sent().is_empty());
}

#[tokio::test]
async fn update_status_changes_the_stored_session() {
    let manager = manager_with(&["a"]);
    manager
        .update_status(&SessionId::new("a"), SessionStatus::Working)
        .await
        .unwrap();
    assert_eq!(manager.session("a").unwrap().status, SessionStatus::Working);
    assert_eq!(
        manager.status_updates(),
        vec![(SessionId::new("a"), SessionStatus::Working)]
    );
}

#[tokio::test]
async fn fail_get_only_affects_that_session() {
    let manager = manager_with(&["a", "b"]);
    manager.fail_get("a", "disk error");
    assert!(manager.get(&SessionId::new("a")).await.is_err());
    assert!(manager.get(&SessionId::new("b")).await.unwrap().is_some());
}
