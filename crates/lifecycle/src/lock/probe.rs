// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Owner liveness probing for lock files

use chrono::{DateTime, Utc};
use std::process::{Command, Stdio};
use std::time::Duration;

/// OS process inspection used to decide whether a lock owner still exists.
pub trait ProcessProbe: Send + Sync {
    /// Signal-0 style check; must not affect the process.
    fn is_alive(&self, pid: u32) -> bool;

    /// When the OS says `pid` started, if it can tell.
    fn started_at(&self, pid: u32) -> Option<DateTime<Utc>>;
}

/// Probe backed by `kill -0` and `ps -o etime=`.
///
/// When the probe itself cannot run, the process is reported alive with an
/// unknown start time, which never causes a lock to be taken over.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessProbe;

impl ProcessProbe for SystemProcessProbe {
    fn is_alive(&self, pid: u32) -> bool {
        let output = Command::new("kill")
            .args(["-0", &pid.to_string()])
            .stdin(Stdio::null())
            .output();
        match output {
            Ok(out) if out.status.success() => true,
            // EPERM: the process exists but belongs to someone else.
            Ok(out) => String::from_utf8_lossy(&out.stderr).contains("not permitted"),
            Err(e) => {
                tracing::warn!(pid, error = %e, "kill -0 probe failed, assuming alive");
                true
            }
        }
    }

    fn started_at(&self, pid: u32) -> Option<DateTime<Utc>> {
        let output = Command::new("ps")
            .args(["-o", "etime=", "-p", &pid.to_string()])
            .stdin(Stdio::null())
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }
        let elapsed = parse_etime(String::from_utf8_lossy(&output.stdout).trim())?;
        let elapsed = chrono::Duration::from_std(elapsed).ok()?;
        Some(Utc::now() - elapsed)
    }
}

/// Parse `ps` elapsed time: `[[dd-]hh:]mm:ss`.
pub(crate) fn parse_etime(text: &str) -> Option<Duration> {
    let (days, clock) = match text.split_once('-') {
        Some((d, rest)) => (d.parse::<u64>().ok()?, rest),
        None => (0, text),
    };
    let fields: Vec<u64> = clock
        .split(':')
        .map(|f| f.parse::<u64>().ok())
        .collect::<Option<_>>()?;
    let (h, m, s) = match fields.as_slice() {
        [m, s] => (0, *m, *s),
        [h, m, s] => (*h, *m, *s),
        _ => return None,
    };
    Some(Duration::from_secs(((days * 24 + h) * 60 + m) * 60 + s))
}
