// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ao-lifecycle: event bus, lifecycle lock, manager and runner

pub mod config;
pub mod env;
pub mod error;
pub mod event_bus;
pub mod lock;
pub mod manager;
pub mod paths;
pub mod runner;

pub use config::{ConfigError, OrchestratorConfig, ProjectConfig, ReactionOverride};
pub use error::LifecycleError;
pub use event_bus::{EventBus, Listener, Topic};
pub use lock::{
    AcquiredLifecycleLock, LifecycleLocks, LockAcquisition, LockError, LockPayload, ProcessProbe,
    SystemProcessProbe,
};
pub use manager::{LifecycleManager, ManagerDeps, ReactionResult, SYSTEM_SESSION};
pub use runner::LifecycleRunner;
