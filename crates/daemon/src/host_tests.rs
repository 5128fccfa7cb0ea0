// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ao_lifecycle::LockPayload;
use tempfile::TempDir;

const TWO_PROJECTS: &str = r#"
poll_interval = "45s"

[projects.api]
[projects.web]
"#;

struct Fixture {
    dir: TempDir,
    config: OrchestratorConfig,
    locks: LifecycleLocks,
}

impl Fixture {
    fn new(text: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ao.toml");
        std::fs::write(&path, text).unwrap();
        let config = OrchestratorConfig::load(&path).unwrap();
        let locks = LifecycleLocks::new(dir.path().join("state"));
        Self { dir, config, locks }
    }

    fn lock_path(&self, project: &str) -> PathBuf {
        self.locks
            .lock_path(&self.config.config_path, &ProjectId::new(project))
    }

    /// Plant a lock owned by this (live) test process.
    fn plant_live_lock(&self, project: &str) {
        let path = self.lock_path(project);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let payload = LockPayload {
            pid: std::process::id(),
            project_id: ProjectId::new(project),
            started_at: chrono::Utc::now(),
        };
        std::fs::write(&path, serde_json::to_vec(&payload).unwrap()).unwrap();
    }
}

#[test]
fn all_projects_are_in_scope_by_default() {
    let f = Fixture::new(TWO_PROJECTS);
    let projects = projects_in_scope(&f.config, None).unwrap();
    assert_eq!(projects, vec![ProjectId::new("api"), ProjectId::new("web")]);
}

#[test]
fn requested_project_must_exist() {
    let f = Fixture::new(TWO_PROJECTS);
    let ok = projects_in_scope(&f.config, Some(&ProjectId::new("web"))).unwrap();
    assert_eq!(ok, vec![ProjectId::new("web")]);

    let err = projects_in_scope(&f.config, Some(&ProjectId::new("ops"))).unwrap_err();
    assert!(matches!(err, HostError::Config(ConfigError::UnknownProject(_))));
}

#[test]
fn empty_config_has_nothing_to_run() {
    let f = Fixture::new("");
    assert!(matches!(
        projects_in_scope(&f.config, None),
        Err(HostError::NoProjects(_))
    ));
}

#[test]
fn interval_flag_beats_config() {
    let f = Fixture::new(TWO_PROJECTS);
    assert_eq!(poll_interval(Some(250), &f.config), Duration::from_millis(250));
}

#[test]
fn acquires_every_project() {
    let f = Fixture::new(TWO_PROJECTS);
    let projects = projects_in_scope(&f.config, None).unwrap();
    let held = acquire_all(&f.locks, &f.config.config_path, &projects).unwrap();

    assert_eq!(held.len(), 2);
    assert!(f.lock_path("api").exists());
    assert!(f.lock_path("web").exists());

    release_all(&f.locks, &held);
    assert!(!f.lock_path("api").exists());
    assert!(!f.lock_path("web").exists());
}

#[test]
fn contention_releases_locks_already_taken() {
    let f = Fixture::new(TWO_PROJECTS);
    f.plant_live_lock("web");
    let projects = projects_in_scope(&f.config, None).unwrap();

    let err = acquire_all(&f.locks, &f.config.config_path, &projects).unwrap_err();

    assert_eq!(
        err.to_string(),
        format!(
            "lifecycle already running for project web (pid {})",
            std::process::id()
        )
    );
    assert!(!f.lock_path("api").exists());
    assert!(f.lock_path("web").exists(), "the owner's lock is left alone");
}

#[test]
fn unknown_owner_is_reported() {
    let err = HostError::AlreadyRunning {
        project: ProjectId::new("web"),
        owner_pid: None,
    };
    assert_eq!(
        err.to_string(),
        "lifecycle already running for project web (pid unknown)"
    );
}

#[test]
fn config_state_dir_wins() {
    let f = Fixture::new("state_dir = \"/srv/ao\"\n");
    assert_eq!(state_dir(&f.config).unwrap(), PathBuf::from("/srv/ao"));
    drop(f.dir);
}
