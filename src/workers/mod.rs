//! # Worker abstractions.
//!
//! This module provides the worker-facing types:
//! - [`Worker`] - trait for the external, long-running worker entrypoint
//! - [`WorkerFn`] - closure-backed worker implementation
//! - [`WorkerRef`] - shared reference to a worker (`Arc<dyn Worker>`)
//! - [`WorkerOptions`] - structured invocation options handed to the entrypoint
//! - [`CommandWorker`] - runs an external program as the worker

mod command;
mod worker;
mod worker_fn;

pub use command::CommandWorker;
pub use worker::{Worker, WorkerOptions, WorkerRef};
pub use worker_fn::WorkerFn;
