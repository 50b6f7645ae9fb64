//! # External-process worker.
//!
//! [`CommandWorker`] runs a program as the worker:
//!
//! ```text
//! <program> <mode> <args...>      env: AGENT_NAME=<agent_name>
//! ```
//!
//! stdout/stderr are inherited so the worker's own logs reach the platform. A zero
//! exit is a clean return; anything else is reported as [`WorkerError::Exited`].
//!
//! The child gets no cancellation, matching the in-process worker, but it never
//! outlives the supervisor: on Linux it is spawned with `PR_SET_PDEATHSIG` set to
//! `SIGKILL`, so the kernel kills it when the spawning thread goes away. That
//! thread is the worker runner's, which lives until the process exits.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::info;

use crate::error::WorkerError;
use crate::workers::worker::{Worker, WorkerOptions};

/// Environment variable carrying the agent identifier into the child process.
pub const AGENT_NAME_ENV: &str = "AGENT_NAME";

/// Worker backed by an external program.
#[derive(Debug, Clone)]
pub struct CommandWorker {
    program: String,
}

impl CommandWorker {
    /// Creates a worker that runs `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Returns the program this worker runs.
    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl Worker for CommandWorker {
    fn name(&self) -> &str {
        "command"
    }

    async fn run(&self, opts: WorkerOptions) -> Result<(), WorkerError> {
        let argv = opts.argv();
        let mut cmd = Command::new(&self.program);
        cmd.args(&argv)
            .env(AGENT_NAME_ENV, &opts.agent_name)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        bind_to_parent(&mut cmd);

        let mut child = cmd
            .spawn()
            .map_err(|e| WorkerError::Spawn {
                error: format!("{}: {e}", self.program),
            })?;

        info!(program = %self.program, args = ?argv, pid = ?child.id(), "worker process started");

        let status = child.wait().await.map_err(|e| WorkerError::Failed {
            error: format!("waiting for {}: {e}", self.program),
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(WorkerError::Exited {
                code: status.to_string(),
            })
        }
    }
}

/// Makes the kernel kill the child once its parent thread is gone.
#[cfg(target_os = "linux")]
fn bind_to_parent(cmd: &mut Command) {
    use nix::{
        errno::Errno,
        sys::{prctl, signal::Signal},
        unistd::{getpid, getppid},
    };

    let parent = getpid();
    // SAFETY: the closure runs between fork and exec; it only issues the
    // `prctl` and `getppid` syscalls and does not allocate.
    unsafe {
        cmd.pre_exec(move || {
            prctl::set_pdeathsig(Signal::SIGKILL)?;
            // The parent may have exited before the death signal was armed.
            if getppid() != parent {
                return Err(Errno::ESRCH.into());
            }
            Ok(())
        });
    }
}

#[cfg(not(target_os = "linux"))]
fn bind_to_parent(_cmd: &mut Command) {}
