// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the lifecycle core

use crate::config::ConfigError;
use ao_adapters::SessionManagerError;
use ao_core::SessionId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("session not found: {0}")]
    SessionNotFound(SessionId),

    #[error("session manager error: {0}")]
    Sessions(#[from] SessionManagerError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
