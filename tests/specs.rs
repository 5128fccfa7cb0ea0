//! Behavioral specifications for the lifecycle core.
//!
//! These tests drive a real `LifecycleRunner` over file-backed sessions in a
//! temp state dir, with fake runtime/agent/SCM/notifier plugins, and verify
//! what an operator would observe: the event log, session records, agent
//! messages and notifications.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

// lifecycle/
#[path = "specs/lifecycle/escalation.rs"]
mod lifecycle_escalation;
#[path = "specs/lifecycle/event_log.rs"]
mod lifecycle_event_log;
#[path = "specs/lifecycle/locks.rs"]
mod lifecycle_locks;
#[path = "specs/lifecycle/pr_flow.rs"]
mod lifecycle_pr_flow;
#[path = "specs/lifecycle/scope.rs"]
mod lifecycle_scope;
