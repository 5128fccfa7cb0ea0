// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn write_bytes(path: &Path, size: u64) {
    let mut f = std::fs::File::create(path).unwrap();
    let buf = vec![b'x'; size as usize];
    f.write_all(&buf).unwrap();
}

#[test]
fn rotate_skips_small_file() {
    let dir = tempfile::tempdir().unwrap();
    let log = log_path(dir.path());
    write_bytes(&log, 1024);

    rotate_log_if_needed(&log);

    assert!(log.exists(), "small log should not be rotated");
    assert!(!dir.path().join("aod.log.1").exists());
}

#[test]
fn rotate_moves_large_file() {
    let dir = tempfile::tempdir().unwrap();
    let log = log_path(dir.path());
    write_bytes(&log, MAX_LOG_SIZE + 1);

    rotate_log_if_needed(&log);

    assert!(!log.exists(), "original should be renamed");
    assert!(dir.path().join("aod.log.1").exists());
}

#[test]
fn rotate_drops_oldest_when_full() {
    let dir = tempfile::tempdir().unwrap();
    let log = log_path(dir.path());
    write_bytes(&dir.path().join("aod.log.1"), 100);
    write_bytes(&dir.path().join("aod.log.2"), 200);
    write_bytes(&dir.path().join("aod.log.3"), 300);
    write_bytes(&log, MAX_LOG_SIZE + 1);

    rotate_log_if_needed(&log);

    assert!(!log.exists());
    let len = |n: u32| {
        std::fs::metadata(dir.path().join(format!("aod.log.{n}")))
            .unwrap()
            .len()
    };
    assert_eq!(len(1), MAX_LOG_SIZE + 1);
    assert_eq!(len(2), 100);
    // .3 is now the old .2, not the old .3
    assert_eq!(len(3), 200);
}

#[test]
fn rotate_noop_when_file_missing() {
    let dir = tempfile::tempdir().unwrap();
    rotate_log_if_needed(&log_path(dir.path()));
}

#[test]
fn startup_marker_is_appended() {
    let dir = tempfile::tempdir().unwrap();
    let log = log_path(&dir.path().join("nested"));
    write_startup_marker(&log).unwrap();
    write_startup_marker(&log).unwrap();

    let text = std::fs::read_to_string(&log).unwrap();
    let markers: Vec<_> = text
        .lines()
        .filter(|l| l.starts_with(STARTUP_MARKER_PREFIX))
        .collect();
    assert_eq!(markers.len(), 2);
    assert_eq!(
        markers[0],
        format!("{}{}) ---", STARTUP_MARKER_PREFIX, std::process::id())
    );
}

#[test]
fn startup_error_is_written_synchronously() {
    let dir = tempfile::tempdir().unwrap();
    let log = log_path(dir.path());
    write_startup_error(&log, &"config missing");
    let text = std::fs::read_to_string(&log).unwrap();
    assert_eq!(text, "ERROR Failed to start aod: config missing\n");
}
