//! Runtime core: worker isolation, liveness, and process lifecycle.
//!
//! The public entry point is [`Supervisor`], which starts the worker in the
//! background and serves the health facade in the foreground.
//!
//! Internal modules:
//! - [`liveness`]: single-writer worker status channel;
//! - [`runner`]: launches the worker on a dedicated thread and contains its faults;
//! - [`shutdown`]: cross-platform termination signal handling;
//! - [`supervisor`]: composition root and exit-code policy.

pub(crate) mod liveness;
mod runner;
mod shutdown;
mod supervisor;

pub use liveness::{LivenessState, LivenessWriter, WorkerPhase, WorkerStatus};
pub use runner::{WorkerHandle, WorkerRunner, WORKER_THREAD_NAME};
pub use shutdown::wait_for_shutdown_signal;
pub use supervisor::{Supervisor, SupervisorExit};
