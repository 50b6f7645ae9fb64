//! # agenthost server
//!
//! Runs `WORKER_COMMAND <WORKER_MODE> <WORKER_ARGS...>` as the background worker
//! and serves the health endpoints on `HOST:PORT` until SIGINT/SIGTERM.
//!
//! ```bash
//! AGENT_NAME=voice-agent WORKER_COMMAND=./agent PORT=10000 agenthost
//! ```
//!
//! Exit status: `0` after a signal-driven shutdown, `1` on configuration or bind failure.

use std::{process::ExitCode, sync::Arc};

use tracing::{error, info};

use agenthost::{logging, CommandWorker, Settings, Supervisor};

#[tokio::main]
async fn main() -> ExitCode {
    logging::init_tracing();

    info!(version = env!("CARGO_PKG_VERSION"), "agenthost starting");

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            error!(label = e.as_label(), error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let Some(program) = settings.worker.command.clone() else {
        error!(label = "config_missing", "WORKER_COMMAND must name the worker program");
        return ExitCode::FAILURE;
    };

    info!(
        agent_name = %settings.worker.agent_name,
        program = %program,
        mode = %settings.worker.mode,
        port = settings.server.port,
        "configuration loaded"
    );

    let exit = Supervisor::new(settings, Arc::new(CommandWorker::new(program)))
        .run()
        .await;

    info!(status = exit.status(), "agenthost exiting");
    exit.exit_code()
}
