//! # Worker entrypoint abstraction.
//!
//! A [`Worker`] is the external collaborator the supervisor hosts: once invoked it
//! registers with a remote job coordinator and waits for assignments, normally forever.
//! The supervisor invokes it exactly once per process, from an isolated execution
//! context, and never assumes it returns.
//!
//! Invocation parameters travel in a [`WorkerOptions`] value owned by the worker's
//! context. Nothing is read from or written to process-global argument state.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{config::WorkerConfig, error::WorkerError};

/// Shared handle to a worker.
pub type WorkerRef = Arc<dyn Worker>;

/// Structured options for a single worker invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkerOptions {
    /// Identifier the worker registers under.
    pub agent_name: String,
    /// Run mode (e.g. `dev`, `start`).
    pub mode: String,
    /// Extra positional arguments following the mode.
    pub args: Vec<String>,
}

impl WorkerOptions {
    /// Snapshots the invocation-relevant part of a [`WorkerConfig`].
    pub fn from_config(cfg: &WorkerConfig) -> Self {
        Self {
            agent_name: cfg.agent_name.clone(),
            mode: cfg.mode.clone(),
            args: cfg.args.clone(),
        }
    }

    /// Positional argument vector: the mode followed by the extra arguments.
    ///
    /// For frameworks that want their invocation expressed as a CLI; the vector is
    /// local to this invocation.
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.mode.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

/// # Long-running worker entrypoint.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use agenthost::{Worker, WorkerError, WorkerOptions};
///
/// struct Dispatcher;
///
/// #[async_trait]
/// impl Worker for Dispatcher {
///     fn name(&self) -> &str { "dispatcher" }
///
///     async fn run(&self, opts: WorkerOptions) -> Result<(), WorkerError> {
///         // register as `opts.agent_name`, then wait for jobs...
///         std::future::pending::<()>().await;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Worker: Send + Sync + 'static {
    /// Returns a short, human-readable worker name used in logs.
    fn name(&self) -> &str;

    /// Runs the worker. Expected to block (asynchronously) for the life of the process.
    ///
    /// Returning `Err` or panicking ends this invocation; it is not restarted.
    async fn run(&self, opts: WorkerOptions) -> Result<(), WorkerError>;
}
