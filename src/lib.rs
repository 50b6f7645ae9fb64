//! # agenthost
//!
//! **agenthost** runs a long-running background worker inside a process that also
//! serves a tiny HTTP health surface, so the worker can be deployed on hosting tiers
//! that only accept port-listening web services.
//!
//! ## Architecture
//! ```text
//!                     ┌────────────────────────────┐
//!                     │ Settings (env / file)      │
//!                     │  WorkerConfig ServerConfig │
//!                     └──────┬──────────────┬──────┘
//!                            ▼              ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │  Supervisor (composition root, owns exit status)              │
//! └──────┬──────────────────────────────────────────┬─────────────┘
//!        │ start (fire-and-forget)                  │ serve (blocks)
//!        ▼                                          ▼
//! ┌────────────────────────┐   LivenessState  ┌──────────────────────┐
//! │ WorkerRunner           │ ══ watch chan ══►│ HealthFacade (axum)  │
//! │  thread "agent-worker" │  (one writer)    │  GET /               │
//! │  own tokio runtime     │                  │  GET /healthz        │
//! │  catch_unwind          │                  │  graceful shutdown   │
//! └──────────┬─────────────┘                  └──────────┬───────────┘
//!            ▼                                           ▼
//!      Worker::run(opts)                         SIGINT / SIGTERM
//!   (never expected to return)                     ──► exit 0
//!                                                bind error ──► exit 1
//! ```
//!
//! ## Fault model
//! | Fault            | Where handled      | Effect                                   |
//! |------------------|--------------------|------------------------------------------|
//! | [`ConfigError`]  | startup            | exit `1` before binding                  |
//! | [`WorkerError`]  | [`WorkerRunner`]   | recorded in [`LivenessState`], logged    |
//! | [`ServerError`]  | [`Supervisor`]     | exit `1`                                 |
//!
//! Health endpoints answer `200 {"status": "ok"}` whatever the worker is doing.
//!
//! ## Example
//! ```no_run
//! use agenthost::{Settings, Supervisor, WorkerError, WorkerFn, WorkerOptions};
//!
//! #[tokio::main]
//! async fn main() -> std::process::ExitCode {
//!     agenthost::logging::init_tracing();
//!
//!     let settings = match Settings::load() {
//!         Ok(s) => s,
//!         Err(e) => {
//!             eprintln!("{e}");
//!             return std::process::ExitCode::FAILURE;
//!         }
//!     };
//!
//!     let worker = WorkerFn::arc("dispatcher", |opts: WorkerOptions| async move {
//!         tracing::info!(agent = %opts.agent_name, "waiting for jobs");
//!         std::future::pending::<()>().await;
//!         Ok::<_, WorkerError>(())
//!     });
//!
//!     Supervisor::new(settings, worker).run().await.exit_code()
//! }
//! ```

pub mod config;
mod core;
mod error;
pub mod logging;
pub mod web;
mod workers;

// ---- Public re-exports ----

pub use crate::config::{ServerConfig, Settings, WorkerConfig};
pub use crate::core::liveness::liveness;
pub use crate::core::{
    wait_for_shutdown_signal, LivenessState, LivenessWriter, Supervisor, SupervisorExit,
    WorkerHandle, WorkerPhase, WorkerRunner, WorkerStatus, WORKER_THREAD_NAME,
};
pub use error::{ConfigError, ServerError, WorkerError};
pub use web::{BoundFacade, HealthFacade};
pub use workers::{CommandWorker, Worker, WorkerFn, WorkerOptions, WorkerRef};
