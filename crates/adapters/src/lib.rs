// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Collaborator contracts and builtin plugins for the lifecycle core

pub mod agent;
pub mod notify;
pub mod registry;
pub mod runtime;
pub mod scm;
pub mod session;
pub mod subprocess;
pub mod traced;

pub use agent::{AgentAdapter, AgentError, ClaudeAgent};
pub use notify::{DesktopNotifyAdapter, NoOpNotifyAdapter, NotifyAdapter, NotifyError};
pub use registry::{PluginRegistry, PluginSlot};
pub use runtime::{ProcessRuntime, RuntimeAdapter, RuntimeError, TmuxRuntime};
pub use scm::{summarize_ci, GitHubScm, ScmAdapter, ScmError};
pub use session::{FileSessionManager, SessionManager, SessionManagerError};
pub use traced::{TracedRuntime, TracedScm};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use agent::FakeAgent;
#[cfg(any(test, feature = "test-support"))]
pub use notify::FakeNotifyAdapter;
#[cfg(any(test, feature = "test-support"))]
pub use runtime::{FakeRuntime, RuntimeCall};
#[cfg(any(test, feature = "test-support"))]
pub use scm::{FakeScm, ScmCall};
#[cfg(any(test, feature = "test-support"))]
pub use session::{FakeSessionManager, SessionCall};
