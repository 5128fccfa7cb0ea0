// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::runtime::FakeRuntime;
use ao_core::{FakeClock, PrRef, RuntimeHandle};
use std::time::Duration;
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    manager: FileSessionManager<FakeClock>,
    runtime: FakeRuntime,
    clock: FakeClock,
}

fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let runtime = FakeRuntime::new();
    let clock = FakeClock::new();
    let registry = PluginRegistry::new().with_runtime("fake", runtime.clone());
    let manager =
        FileSessionManager::with_clock(dir.path().join("sessions"), registry, clock.clone());
    Fixture {
        _dir: dir,
        manager,
        runtime,
        clock,
    }
}

fn session(f: &Fixture, id: &str) -> Session {
    Session::new(id, "app", &f.clock).with_runtime_handle(RuntimeHandle::new("fake", id))
}

#[tokio::test]
async fn list_of_missing_dir_is_empty() {
    let f = fixture();
    assert!(f.manager.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn save_then_list_and_get() {
    let f = fixture();
    f.manager.save(&session(&f, "b")).await.unwrap();
    f.manager
        .save(&session(&f, "a").with_pr(PrRef::new(12)))
        .await
        .unwrap();

    let ids: Vec<_> = f
        .manager
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(ids, vec![SessionId::new("a"), SessionId::new("b")]);

    let a = f.manager.get(&SessionId::new("a")).await.unwrap().unwrap();
    assert_eq!(a.pr.map(|p| p.number), Some(12));
}

#[tokio::test]
async fn get_unknown_is_none() {
    let f = fixture();
    assert!(f.manager.get(&SessionId::new("nope")).await.unwrap().is_none());
}

#[tokio::test]
async fn list_skips_corrupt_records_and_foreign_files() {
    let f = fixture();
    f.manager.save(&session(&f, "good")).await.unwrap();
    std::fs::write(f.manager.dir().join("bad.json"), "{not json").unwrap();
    std::fs::write(f.manager.dir().join("notes.txt"), "hello").unwrap();

    let sessions = f.manager.list().await.unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].id, "good");
}

#[tokio::test]
async fn get_of_corrupt_record_is_an_error() {
    let f = fixture();
    std::fs::create_dir_all(f.manager.dir()).unwrap();
    std::fs::write(f.manager.dir().join("bad.json"), "{not json").unwrap();
    let err = f.manager.get(&SessionId::new("bad")).await.unwrap_err();
    assert!(matches!(err, SessionManagerError::Corrupt { .. }));
}

#[tokio::test]
async fn update_status_rewrites_record_and_touches_timestamp() {
    let f = fixture();
    f.manager.save(&session(&f, "s1")).await.unwrap();
    f.clock.advance(Duration::from_secs(60));

    f.manager
        .update_status(&SessionId::new("s1"), SessionStatus::Working)
        .await
        .unwrap();

    let s1 = f.manager.get(&SessionId::new("s1")).await.unwrap().unwrap();
    assert_eq!(s1.status, SessionStatus::Working);
    assert!(s1.updated_at > s1.created_at);
    assert!(!f.manager.dir().join("s1.json.tmp").exists());
}

#[tokio::test]
async fn update_status_of_unknown_session_is_not_found() {
    let f = fixture();
    let err = f
        .manager
        .update_status(&SessionId::new("ghost"), SessionStatus::Killed)
        .await
        .unwrap_err();
    assert!(matches!(err, SessionManagerError::NotFound(_)));
}

#[tokio::test]
async fn send_routes_through_the_sessions_runtime() {
    let f = fixture();
    f.manager.save(&session(&f, "s1")).await.unwrap();

    f.manager
        .send(&SessionId::new("s1"), "CI is failing")
        .await
        .unwrap();

    assert_eq!(
        f.runtime.sent_messages(),
        vec![("s1".to_string(), "CI is failing".to_string())]
    );
}

#[tokio::test]
async fn send_without_runtime_handle_fails() {
    let f = fixture();
    f.manager
        .save(&Session::new("bare", "app", &f.clock))
        .await
        .unwrap();
    let err = f
        .manager
        .send(&SessionId::new("bare"), "hi")
        .await
        .unwrap_err();
    assert!(matches!(err, SessionManagerError::NoRuntimeHandle(_)));
}

#[tokio::test]
async fn send_with_unregistered_runtime_fails() {
    let f = fixture();
    let s = Session::new("s1", "app", &f.clock)
        .with_runtime_handle(RuntimeHandle::new("docker", "c1"));
    f.manager.save(&s).await.unwrap();
    let err = f.manager.send(&s.id, "hi").await.unwrap_err();
    assert_eq!(err.to_string(), "no runtime plugin named \"docker\"");
}

#[tokio::test]
async fn send_surfaces_runtime_failure() {
    let f = fixture();
    f.manager.save(&session(&f, "s1")).await.unwrap();
    f.runtime.set_send_error(Some("pane closed"));
    let err = f
        .manager
        .send(&SessionId::new("s1"), "hi")
        .await
        .unwrap_err();
    assert!(matches!(err, SessionManagerError::Runtime(_)));
}
