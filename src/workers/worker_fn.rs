//! # Closure-backed worker (`WorkerFn`)
//!
//! [`WorkerFn`] wraps a closure `F: Fn(WorkerOptions) -> Fut`, handy for embedding an
//! in-process entrypoint without a dedicated type.
//!
//! ## Example
//! ```rust
//! use agenthost::{Worker, WorkerError, WorkerFn, WorkerOptions, WorkerRef};
//!
//! let w: WorkerRef = WorkerFn::arc("echo", |opts: WorkerOptions| async move {
//!     println!("registered as {}", opts.agent_name);
//!     Ok::<_, WorkerError>(())
//! });
//!
//! assert_eq!(w.name(), "echo");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::WorkerError;
use crate::workers::worker::{Worker, WorkerOptions};

/// Function-backed worker implementation.
#[derive(Debug)]
pub struct WorkerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> WorkerFn<F> {
    /// Creates a new function-backed worker.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self { name: name.into(), f }
    }

    /// Creates the worker and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Worker for WorkerFn<F>
where
    F: Fn(WorkerOptions) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), WorkerError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, opts: WorkerOptions) -> Result<(), WorkerError> {
        (self.f)(opts).await
    }
}
