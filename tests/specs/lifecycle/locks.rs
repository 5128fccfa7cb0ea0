//! One lifecycle per project per config.

use crate::prelude::*;
use ao_core::ProjectId;
use ao_lifecycle::{LifecycleLocks, LockAcquisition, LockPayload};

fn acquired(result: LockAcquisition) -> ao_lifecycle::AcquiredLifecycleLock {
    match result {
        LockAcquisition::Acquired(lock) => lock,
        LockAcquisition::Held { owner_pid } => panic!("lock held by {:?}", owner_pid),
    }
}

#[test]
fn second_owner_is_refused_until_release() {
    let project = Project::new();
    let locks = LifecycleLocks::new(project.state_dir());
    let web = ProjectId::new("web");

    let lock = acquired(locks.try_acquire(&project.config_path(), &web).unwrap());
    assert_eq!(
        locks.try_acquire(&project.config_path(), &web).unwrap(),
        LockAcquisition::Held {
            owner_pid: Some(std::process::id())
        }
    );

    assert!(locks.release(&lock));
    acquired(locks.try_acquire(&project.config_path(), &web).unwrap());
}

#[test]
fn locks_are_per_project_and_per_config() {
    let project = Project::new();
    let other = Project::new();
    let locks = LifecycleLocks::new(project.state_dir());
    let web = ProjectId::new("web");

    let a = acquired(locks.try_acquire(&project.config_path(), &web).unwrap());
    let b = acquired(
        locks
            .try_acquire(&project.config_path(), &ProjectId::new("docs"))
            .unwrap(),
    );
    let c = acquired(locks.try_acquire(&other.config_path(), &web).unwrap());

    assert_ne!(a.path, b.path);
    assert_ne!(a.path, c.path);
}

#[test]
fn lock_of_exited_process_is_taken_over() {
    let project = Project::new();
    let locks = LifecycleLocks::new(project.state_dir());
    let web = ProjectId::new("web");

    let mut child = std::process::Command::new("true").spawn().unwrap();
    let dead_pid = child.id();
    child.wait().unwrap();

    let path = locks.lock_path(&project.config_path(), &web);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let stale = LockPayload {
        pid: dead_pid,
        project_id: web.clone(),
        started_at: chrono::Utc::now(),
    };
    std::fs::write(&path, serde_json::to_vec(&stale).unwrap()).unwrap();

    let lock = acquired(locks.try_acquire(&project.config_path(), &web).unwrap());
    assert_eq!(lock.payload.pid, std::process::id());
    let on_disk: LockPayload = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(on_disk, lock.payload);
}
