// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ao-core: data model for the agent orchestrator lifecycle

pub mod clock;
pub mod event;
pub mod id;
pub mod reaction;
pub mod reaction_tracker;
pub mod scm;
pub mod session;
pub mod status;
pub mod time_fmt;

pub use clock::{Clock, FakeClock, SystemClock};
pub use event::{EventFilter, EventPriority, EventType, OrchestratorEvent};
pub use id::EventId;
pub use reaction::{EscalateAfter, ReactionAction, ReactionConfig};
pub use reaction_tracker::{ReactionTracker, ReactionTrackers};
pub use scm::{CiCheck, CiCheckStatus, CiStatus, Mergeability, PrState, ReviewDecision};
pub use session::{PrRef, ProjectId, RuntimeHandle, Session, SessionId};
pub use status::{ActivityState, SessionStatus};
pub use time_fmt::{format_elapsed, parse_duration, DurationParseError};
