//! # Worker liveness: the only state shared across the isolation boundary.
//!
//! ```text
//! WorkerRunner ──► LivenessWriter ══ watch ══► LivenessState (clone per reader)
//!  (one writer)                                   ├─► health facade handlers
//!                                                 └─► WorkerHandle / tests
//! ```
//!
//! ## Rules
//! - Exactly one [`LivenessWriter`] exists per channel and it is not `Clone`;
//!   the runner consumes it, so nobody else can write.
//! - Readers never block the writer and always observe the latest status.
//! - Status moves forward only: `pending → running → exited | failed`.

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::error::WorkerError;

/// Phase of the single worker invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerPhase {
    /// Channel created, worker not started yet.
    Pending,
    /// Worker entrypoint is executing.
    Running,
    /// Entrypoint returned without error (it is not expected to).
    Exited,
    /// Entrypoint failed, panicked, or could not be launched.
    Failed,
}

/// Point-in-time view of the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerStatus {
    /// Current phase.
    pub phase: WorkerPhase,
    /// `true` only while the phase is [`WorkerPhase::Running`].
    pub running: bool,
    /// Message of the failure that ended the worker, if any.
    pub last_error: Option<String>,
    /// When the entrypoint was entered.
    pub started_at: Option<DateTime<Utc>>,
    /// When the entrypoint returned or failed.
    pub finished_at: Option<DateTime<Utc>>,
}

impl WorkerStatus {
    fn pending() -> Self {
        Self {
            phase: WorkerPhase::Pending,
            running: false,
            last_error: None,
            started_at: None,
            finished_at: None,
        }
    }
}

/// Creates a liveness channel: one writer for the runner, a cloneable reader for everyone else.
pub fn liveness() -> (LivenessWriter, LivenessState) {
    let (tx, rx) = watch::channel(WorkerStatus::pending());
    (LivenessWriter { tx }, LivenessState { rx })
}

/// Write half; owned by the worker runner.
#[derive(Debug)]
pub struct LivenessWriter {
    tx: watch::Sender<WorkerStatus>,
}

impl LivenessWriter {
    /// Records that the entrypoint is about to run.
    pub fn mark_running(&self) {
        self.tx.send_modify(|s| {
            s.phase = WorkerPhase::Running;
            s.running = true;
            s.started_at = Some(Utc::now());
        });
    }

    /// Records a clean return from the entrypoint.
    pub fn mark_exited(&self) {
        self.tx.send_modify(|s| {
            s.phase = WorkerPhase::Exited;
            s.running = false;
            s.finished_at = Some(Utc::now());
        });
    }

    /// Records a worker fault.
    pub fn mark_failed(&self, err: &WorkerError) {
        let message = err.as_message();
        self.tx.send_modify(|s| {
            s.phase = WorkerPhase::Failed;
            s.running = false;
            s.last_error = Some(message);
            s.finished_at = Some(Utc::now());
        });
    }

    /// Returns a new reader attached to this channel.
    pub fn reader(&self) -> LivenessState {
        LivenessState {
            rx: self.tx.subscribe(),
        }
    }
}

/// Read half; cheap to clone and safe to share between request handlers.
#[derive(Debug, Clone)]
pub struct LivenessState {
    rx: watch::Receiver<WorkerStatus>,
}

impl LivenessState {
    /// Returns a copy of the latest status.
    pub fn snapshot(&self) -> WorkerStatus {
        self.rx.borrow().clone()
    }

    /// Returns `true` while the worker entrypoint is executing.
    pub fn is_running(&self) -> bool {
        self.rx.borrow().running
    }

    /// Returns the last recorded worker failure, if any.
    pub fn last_error(&self) -> Option<String> {
        self.rx.borrow().last_error.clone()
    }

    /// Waits until `pred` holds for the current status and returns that status.
    ///
    /// Resolves immediately if it already holds. If the writer is gone the
    /// status can no longer change, so the final status is returned as-is.
    pub async fn wait_for(&mut self, pred: impl FnMut(&WorkerStatus) -> bool) -> WorkerStatus {
        if let Ok(status) = self.rx.wait_for(pred).await {
            return status.clone();
        }
        self.rx.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_pending() {
        let (_writer, state) = liveness();
        let s = state.snapshot();
        assert_eq!(s.phase, WorkerPhase::Pending);
        assert!(!s.running);
        assert!(s.last_error.is_none());
    }

    #[test]
    fn test_running_then_failed() {
        let (writer, state) = liveness();
        writer.mark_running();
        assert!(state.is_running());
        assert!(state.snapshot().started_at.is_some());

        writer.mark_failed(&WorkerError::failed("registration rejected"));
        let s = state.snapshot();
        assert_eq!(s.phase, WorkerPhase::Failed);
        assert!(!s.running);
        assert_eq!(s.last_error.as_deref(), Some("error: registration rejected"));
        assert!(s.finished_at.is_some());
    }

    #[test]
    fn test_exit_keeps_no_error() {
        let (writer, state) = liveness();
        writer.mark_running();
        writer.mark_exited();
        assert_eq!(state.snapshot().phase, WorkerPhase::Exited);
        assert!(state.last_error().is_none());
    }

    #[test]
    fn test_writes_visible_to_late_readers() {
        let (writer, first) = liveness();
        drop(first);
        // No readers left: the write must still land.
        writer.mark_running();
        assert!(writer.reader().is_running());
    }

    #[tokio::test]
    async fn test_wait_for_after_writer_dropped() {
        let (writer, mut state) = liveness();
        writer.mark_running();
        drop(writer);
        let s = state.wait_for(|s| s.phase == WorkerPhase::Failed).await;
        assert_eq!(s.phase, WorkerPhase::Running);
    }
}
