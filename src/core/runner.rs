//! # Run the worker in an isolated execution context.
//!
//! [`WorkerRunner::start`] launches the worker on a dedicated OS thread driving its
//! own current-thread Tokio runtime, then returns immediately.
//!
//! ## Flow
//! ```text
//! start(cfg, worker, writer)
//!   └─► thread "agent-worker"
//!         ├─ build runtime ── Err ──► mark_failed(Spawn)
//!         ├─ mark_running
//!         ├─ worker.run(opts)  (catch_unwind)
//!         │     ├─ Ok(())   ──► mark_exited, warn
//!         │     ├─ Err(e)   ──► mark_failed(e), error
//!         │     └─ panic    ──► mark_failed(Panicked), error
//!         └─ thread ends (no restart)
//! ```
//!
//! ## Rules
//! - Faults are **terminal for the invocation** and **never propagate** to the caller.
//! - The thread is **detached**: dropping [`WorkerHandle`] does not join it, and the
//!   process exits without waiting for it.
//! - The worker gets **no cancellation signal**; it dies with the process.
//! - A separate runtime means a worker that blocks its executor cannot starve the
//!   health facade.

use std::{panic::AssertUnwindSafe, sync::Arc, thread};

use futures::FutureExt;
use tracing::{error, info, warn};

use crate::{
    config::WorkerConfig,
    core::liveness::{LivenessState, LivenessWriter},
    error::WorkerError,
    workers::{WorkerOptions, WorkerRef},
};

/// Name of the dedicated worker thread.
pub const WORKER_THREAD_NAME: &str = "agent-worker";

/// Launches the worker; see the module docs.
pub struct WorkerRunner;

impl WorkerRunner {
    /// Starts `worker` in its own thread and runtime and returns without waiting.
    ///
    /// Consumes the liveness writer, so a channel can back at most one invocation.
    /// Callers must not assume the worker has initialized when this returns.
    pub fn start(cfg: &WorkerConfig, worker: WorkerRef, liveness: LivenessWriter) -> WorkerHandle {
        let options = WorkerOptions::from_config(cfg);
        let reader = liveness.reader();
        let writer = Arc::new(liveness);
        let thread_writer = Arc::clone(&writer);

        let spawn = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || run_isolated(worker, options, &thread_writer));

        let join = match spawn {
            Ok(join) => Some(join),
            Err(e) => {
                let err = WorkerError::Spawn {
                    error: format!("failed to spawn worker thread: {e}"),
                };
                error!(label = err.as_label(), error = %err, "agent worker not started");
                writer.mark_failed(&err);
                None
            }
        };

        WorkerHandle {
            join,
            liveness: reader,
        }
    }
}

/// Handle to the detached worker context.
///
/// Observational only: it cannot stop or join the worker.
#[derive(Debug)]
pub struct WorkerHandle {
    join: Option<thread::JoinHandle<()>>,
    liveness: LivenessState,
}

impl WorkerHandle {
    /// Name of the worker thread.
    pub fn thread_name(&self) -> &'static str {
        WORKER_THREAD_NAME
    }

    /// Returns `true` once the worker thread has ended (or never started).
    pub fn is_finished(&self) -> bool {
        self.join.as_ref().map_or(true, |j| j.is_finished())
    }

    /// Returns a reader of the worker's liveness.
    pub fn liveness(&self) -> LivenessState {
        self.liveness.clone()
    }
}

/// Body of the worker thread.
fn run_isolated(worker: WorkerRef, options: WorkerOptions, liveness: &LivenessWriter) {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            record_fault(
                liveness,
                worker.name(),
                WorkerError::Spawn {
                    error: format!("failed to build worker runtime: {e}"),
                },
            );
            return;
        }
    };

    runtime.block_on(invoke(worker, options, liveness));
}

/// Runs the entrypoint once and records how it ended.
async fn invoke(worker: WorkerRef, options: WorkerOptions, liveness: &LivenessWriter) {
    info!(
        worker = worker.name(),
        agent_name = %options.agent_name,
        mode = %options.mode,
        "agent worker starting; registering and waiting for job dispatch"
    );
    liveness.mark_running();

    let res = AssertUnwindSafe(worker.run(options)).catch_unwind().await;

    match res {
        Ok(Ok(())) => {
            warn!(
                worker = worker.name(),
                "agent worker returned; it will not be restarted"
            );
            liveness.mark_exited();
        }
        Ok(Err(e)) => record_fault(liveness, worker.name(), e),
        Err(panic) => {
            let info = panic_message(panic.as_ref());
            record_fault(liveness, worker.name(), WorkerError::Panicked { info });
        }
    }
}

fn record_fault(liveness: &LivenessWriter, worker: &str, err: WorkerError) {
    error!(
        worker,
        label = err.as_label(),
        error = %err,
        "agent worker failed; health endpoints keep serving"
    );
    liveness.mark_failed(&err);
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
