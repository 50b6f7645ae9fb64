//! # Supervisor: composition root and process exit policy.
//!
//! ```text
//! Settings ──► Supervisor::run()
//!                ├─► liveness()                       (writer, reader)
//!                ├─► WorkerRunner::start(writer)      background, returns immediately
//!                └─► HealthFacade::serve(reader)      foreground, blocks
//!                        ├─ shutdown signal ──► Ok  ──► exit 0
//!                        └─ bind/serve error ─► Err ──► exit 1
//! ```
//!
//! ## Rules
//! - The worker is **started before** the facade binds; its readiness is not awaited.
//! - The facade's return is the **only** thing that decides the exit status.
//! - Worker faults never reach this level.

use std::{future::Future, io, process::ExitCode};

use tracing::{error, info};

use crate::{
    config::Settings,
    core::{
        liveness::liveness,
        runner::{WorkerHandle, WorkerRunner},
        shutdown,
    },
    error::{ConfigError, ServerError},
    web::HealthFacade,
    workers::WorkerRef,
};

/// Hosts one worker behind the health facade.
pub struct Supervisor {
    settings: Settings,
    worker: WorkerRef,
}

impl Supervisor {
    /// Creates a supervisor for `worker` with already-validated settings.
    pub fn new(settings: Settings, worker: WorkerRef) -> Self {
        Self { settings, worker }
    }

    /// Loads settings from the environment; fails fast on invalid configuration.
    pub fn from_env(worker: WorkerRef) -> Result<Self, ConfigError> {
        Ok(Self::new(Settings::load()?, worker))
    }

    /// Returns the settings this supervisor runs with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Runs until the process receives a termination signal or the facade fails.
    pub async fn run(self) -> SupervisorExit {
        self.run_until(shutdown::wait_for_shutdown_signal()).await
    }

    /// Runs until `shutdown` resolves or the facade fails.
    pub async fn run_until<F>(self, shutdown: F) -> SupervisorExit
    where
        F: Future<Output = io::Result<()>> + Send,
    {
        let Settings { worker, server } = self.settings;

        let (writer, reader) = liveness();
        let handle = WorkerRunner::start(&worker, self.worker, writer);
        info!(
            agent_name = %worker.agent_name,
            thread = handle.thread_name(),
            "agent worker started in background"
        );

        info!(addr = %server.socket_addr(), service = %server.service_name, "starting health server");
        let result = HealthFacade::new(server, &worker.agent_name, reader)
            .serve(shutdown)
            .await;

        match &result {
            Ok(()) => info!("health server shut down gracefully"),
            Err(e) => error!(label = e.as_label(), error = %e, "health server failed"),
        }

        SupervisorExit {
            result,
            worker: handle,
        }
    }
}

/// Outcome of [`Supervisor::run`].
#[derive(Debug)]
pub struct SupervisorExit {
    result: Result<(), ServerError>,
    worker: WorkerHandle,
}

impl SupervisorExit {
    /// `0` after a graceful shutdown, `1` after a facade failure.
    pub fn status(&self) -> u8 {
        match self.result {
            Ok(()) => 0,
            Err(_) => 1,
        }
    }

    /// Process exit code corresponding to [`status`](Self::status).
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.status())
    }

    /// How the facade ended.
    pub fn result(&self) -> &Result<(), ServerError> {
        &self.result
    }

    /// The (possibly still running) worker.
    pub fn worker(&self) -> &WorkerHandle {
        &self.worker
    }
}
