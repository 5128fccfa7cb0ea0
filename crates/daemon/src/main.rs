// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent Orchestrator Daemon (aod)
//!
//! Hosts the lifecycle core: takes the per-project lifecycle locks, runs
//! one lifecycle runner until SIGINT/SIGTERM, then releases the locks.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod host;
mod logging;

use std::path::PathBuf;

use ao_core::ProjectId;
use ao_lifecycle::{LifecycleLocks, LifecycleRunner, OrchestratorConfig};
use clap::Parser;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

use crate::host::HostError;

#[derive(Parser)]
#[command(
    name = "aod",
    version,
    about = "Agent orchestrator daemon - polls agent sessions and reacts to their progress"
)]
struct Cli {
    /// Config file (defaults to $AO_CONFIG, then ./ao.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Only run the lifecycle for this project
    #[arg(long, value_name = "ID")]
    project: Option<String>,

    /// Poll interval in milliseconds (overrides $AO_POLL_INTERVAL_MS and the config)
    #[arg(long, value_name = "N")]
    interval_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = OrchestratorConfig::load(&host::config_path(cli.config))?;
    let state_dir = host::state_dir(&config)?;
    let log_path = logging::log_path(&state_dir);

    // Rotate and mark before tracing owns the file
    logging::rotate_log_if_needed(&log_path);
    logging::write_startup_marker(&log_path)?;
    let log_guard = logging::setup_logging(&log_path)?;

    let project = cli.project.map(ProjectId::new);
    let projects = match host::projects_in_scope(&config, project.as_ref()) {
        Ok(projects) => projects,
        Err(e) => {
            logging::write_startup_error(&log_path, &e);
            drop(log_guard);
            return Err(e.into());
        }
    };

    let locks = LifecycleLocks::new(&state_dir);
    let held = match host::acquire_all(&locks, &config.config_path, &projects) {
        Ok(held) => held,
        Err(e @ HostError::AlreadyRunning { .. }) => {
            info!("{}", e);
            eprintln!("{}", e);
            drop(log_guard);
            std::process::exit(1);
        }
        Err(e) => {
            logging::write_startup_error(&log_path, &e);
            error!("Failed to acquire lifecycle locks: {}", e);
            drop(log_guard);
            return Err(e.into());
        }
    };

    let interval = host::poll_interval(cli.interval_ms, &config);
    let mut runner = LifecycleRunner::new(config, &state_dir);
    if let Some(project) = project {
        runner = runner.scoped_to(project);
    }
    if let Err(e) = runner.start(interval) {
        error!("Failed to start lifecycle runner: {}", e);
        host::release_all(&locks, &held);
        drop(log_guard);
        return Err(e.into());
    }

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!(
        projects = ?projects,
        interval_ms = interval.as_millis() as u64,
        "aod ready"
    );
    // Signal ready for a parent process waiting on startup
    println!("READY");

    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        _ = sigint.recv() => info!("received SIGINT, shutting down"),
    }

    runner.stop();
    host::release_all(&locks, &held);
    info!("aod stopped");
    Ok(())
}
