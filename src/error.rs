//! Error types used by the supervisor, the worker runner and the health facade.
//!
//! Three enums, one per failure domain:
//!
//! - [`ConfigError`]: malformed or missing configuration. Fatal at startup.
//! - [`WorkerError`]: anything that goes wrong inside the worker. Contained by the runner.
//! - [`ServerError`]: bind or serve failures of the health facade. Fatal for the process.
//!
//! All of them provide `as_label` for logs; [`WorkerError`] also provides
//! `as_message`, which is what ends up in the liveness state.

use std::{io, net::SocketAddr};

use thiserror::Error;

/// # Errors produced while loading configuration.
///
/// Raised before anything is started or bound; the process exits with status `1`.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The layered configuration could not be built or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A required key is absent or empty.
    #[error("missing required configuration key `{key}`")]
    Missing {
        /// Environment-style key name (e.g. `AGENT_NAME`).
        key: &'static str,
    },

    /// A key is present but its value is not acceptable.
    #[error("invalid value for `{key}`: {reason}")]
    Invalid {
        /// Environment-style key name.
        key: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use agenthost::ConfigError;
    ///
    /// let err = ConfigError::Missing { key: "AGENT_NAME" };
    /// assert_eq!(err.as_label(), "config_missing");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::Load(_) => "config_load",
            ConfigError::Missing { .. } => "config_missing",
            ConfigError::Invalid { .. } => "config_invalid",
        }
    }
}

/// # Errors produced by the worker.
///
/// These never leave the worker's execution context: the runner records them
/// into the liveness state and logs them.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkerError {
    /// The entrypoint returned an error.
    #[error("worker failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },

    /// The entrypoint panicked.
    #[error("worker panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },

    /// An external worker process exited with a non-zero status.
    #[error("worker process exited with {code}")]
    Exited {
        /// Exit code, or a description when the process was killed by a signal.
        code: String,
    },

    /// The execution context (thread, runtime or child process) could not be created.
    #[error("failed to spawn worker: {error}")]
    Spawn {
        /// The underlying error message.
        error: String,
    },
}

impl WorkerError {
    /// Convenience constructor for [`WorkerError::Failed`].
    pub fn failed(error: impl Into<String>) -> Self {
        WorkerError::Failed { error: error.into() }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use agenthost::WorkerError;
    ///
    /// let err = WorkerError::failed("connection refused");
    /// assert_eq!(err.as_label(), "worker_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            WorkerError::Failed { .. } => "worker_failed",
            WorkerError::Panicked { .. } => "worker_panicked",
            WorkerError::Exited { .. } => "worker_exited",
            WorkerError::Spawn { .. } => "worker_spawn",
        }
    }

    /// Returns a human-readable message; this is what `last_error` reports.
    pub fn as_message(&self) -> String {
        match self {
            WorkerError::Failed { error } => format!("error: {error}"),
            WorkerError::Panicked { info } => format!("panic: {info}"),
            WorkerError::Exited { code } => format!("exited: {code}"),
            WorkerError::Spawn { error } => format!("spawn: {error}"),
        }
    }
}

/// # Errors produced by the health facade.
///
/// Any of these ends the process with a non-zero exit status.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ServerError {
    /// The listener could not be bound (port in use, permission denied, ...).
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address that was requested.
        addr: SocketAddr,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The server loop failed after binding.
    #[error("health server failed: {source}")]
    Serve {
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// OS signal handlers could not be installed.
    #[error("failed to install signal handlers: {source}")]
    Signal {
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl ServerError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ServerError::Bind { .. } => "server_bind",
            ServerError::Serve { .. } => "server_serve",
            ServerError::Signal { .. } => "server_signal",
        }
    }
}
