// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event bus: append-only JSONL log, in-memory history and topic listeners.
//!
//! `emit` is synchronous. The log line and the history entry are written
//! under one lock so their order always agrees; listeners run after the
//! lock is released and may emit further events.

use ao_core::{EventFilter, EventType, OrchestratorEvent};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

/// Event callback. Identity is the `Arc` allocation.
pub type Listener = Arc<dyn Fn(&OrchestratorEvent) + Send + Sync>;

/// What a listener subscribes to: one event type, or every event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Type(EventType),
    All,
}

impl From<EventType> for Topic {
    fn from(event_type: EventType) -> Self {
        Topic::Type(event_type)
    }
}

/// Listener registry shared by the bus and the manager's local subscriptions.
#[derive(Default)]
pub(crate) struct ListenerSet {
    by_topic: Mutex<HashMap<Topic, Vec<Listener>>>,
}

impl ListenerSet {
    pub(crate) fn on(&self, topic: Topic, listener: Listener) {
        let mut by_topic = self.by_topic.lock();
        let listeners = by_topic.entry(topic).or_default();
        if !listeners.iter().any(|l| Arc::ptr_eq(l, &listener)) {
            listeners.push(listener);
        }
    }

    pub(crate) fn off(&self, topic: Topic, listener: &Listener) {
        let mut by_topic = self.by_topic.lock();
        if let Some(listeners) = by_topic.get_mut(&topic) {
            listeners.retain(|l| !Arc::ptr_eq(l, listener));
        }
    }

    /// Call exact-type listeners, then wildcard listeners.
    ///
    /// A panicking listener is logged and skipped.
    pub(crate) fn dispatch(&self, event: &OrchestratorEvent) {
        let targets: Vec<Listener> = {
            let by_topic = self.by_topic.lock();
            let exact = by_topic.get(&Topic::Type(event.event_type));
            let all = by_topic.get(&Topic::All);
            exact
                .into_iter()
                .chain(all)
                .flatten()
                .cloned()
                .collect()
        };
        for listener in targets {
            if catch_unwind(AssertUnwindSafe(|| listener(event))).is_err() {
                warn!(
                    event_type = %event.event_type,
                    event_id = %event.id,
                    "event listener panicked"
                );
            }
        }
    }
}

struct BusState {
    log: Option<File>,
    history: Vec<OrchestratorEvent>,
}

struct BusInner {
    log_path: Option<PathBuf>,
    state: Mutex<BusState>,
    listeners: ListenerSet,
}

/// Shared event bus. Clones share the log, history and listeners.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    /// Bus without persistence.
    pub fn in_memory() -> Self {
        Self::with_state(None, None, Vec::new())
    }

    /// Bus persisted to a JSONL log at `path`.
    ///
    /// Existing lines are replayed into the history; malformed lines are
    /// skipped with a warning. The parent directory is created if missing.
    pub fn open(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)?;

        let history = replay(&file, &path)?;
        terminate_partial_line(&mut file)?;

        Ok(Self::with_state(Some(path), Some(file), history))
    }

    fn with_state(
        log_path: Option<PathBuf>,
        log: Option<File>,
        history: Vec<OrchestratorEvent>,
    ) -> Self {
        Self {
            inner: Arc::new(BusInner {
                log_path,
                state: Mutex::new(BusState { log, history }),
                listeners: ListenerSet::default(),
            }),
        }
    }

    pub fn log_path(&self) -> Option<&Path> {
        self.inner.log_path.as_deref()
    }

    /// Persist, record, then notify listeners.
    ///
    /// A failed log write is logged and does not stop the event from
    /// reaching the history or listeners.
    pub fn emit(&self, event: OrchestratorEvent) {
        {
            let mut state = self.inner.state.lock();
            if let Some(file) = state.log.as_mut() {
                if let Err(e) = append_line(file, &event) {
                    warn!(
                        path = ?self.inner.log_path,
                        event_type = %event.event_type,
                        error = %e,
                        "failed to append event to log"
                    );
                }
            }
            state.history.push(event.clone());
        }
        self.inner.listeners.dispatch(&event);
    }

    /// Subscribe. Registering the same listener twice has no extra effect.
    pub fn on(&self, topic: impl Into<Topic>, listener: Listener) {
        self.inner.listeners.on(topic.into(), listener);
    }

    /// Unsubscribe. Unknown listeners are ignored.
    pub fn off(&self, topic: impl Into<Topic>, listener: &Listener) {
        self.inner.listeners.off(topic.into(), listener);
    }

    /// Snapshot of the history matching `filter`, in emission order.
    pub fn history(&self, filter: &EventFilter) -> Vec<OrchestratorEvent> {
        let state = self.inner.state.lock();
        filter.apply(&state.history)
    }

    pub fn len(&self) -> usize {
        self.inner.state.lock().history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn append_line(file: &mut File, event: &OrchestratorEvent) -> std::io::Result<()> {
    let mut line = serde_json::to_vec(event).map_err(std::io::Error::other)?;
    line.push(b'\n');
    file.write_all(&line)
}

fn replay(file: &File, path: &Path) -> std::io::Result<Vec<OrchestratorEvent>> {
    let mut history = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<OrchestratorEvent>(&line) {
            Ok(event) => history.push(event),
            Err(e) => warn!(
                path = %path.display(),
                line = index + 1,
                error = %e,
                "skipping malformed event log line"
            ),
        }
    }
    Ok(history)
}

/// Start a fresh line if the log ends mid-line (e.g. after a crash).
fn terminate_partial_line(file: &mut File) -> std::io::Result<()> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(());
    }
    file.seek(SeekFrom::Start(len - 1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    if last[0] != b'\n' {
        file.write_all(b"\n")?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "event_bus_tests.rs"]
mod tests;
