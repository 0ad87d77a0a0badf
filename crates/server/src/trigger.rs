//! Background replenishment dispatch.
//!
//! Serving a joke asks for a replenishment without waiting for it. The
//! caller never sees the run's outcome, duration or failure.

use jokepool::Replenisher;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

/// Fire-and-forget request for an eventual replenishment run.
pub trait ReplenishTrigger: Send + Sync {
    fn fire(&self);
}

/// Ignores every trigger.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTrigger;

impl ReplenishTrigger for NoopTrigger {
    fn fire(&self) {}
}

/// Bounded queue drained by a single worker task.
///
/// While the queue is full a run is already pending, so further triggers
/// are dropped and folded into it.
#[derive(Debug, Clone)]
pub struct QueuedTrigger {
    tx: mpsc::Sender<()>,
}

impl QueuedTrigger {
    /// Spawn the worker on the current runtime. The worker exits once every
    /// `QueuedTrigger` clone is dropped.
    pub fn spawn(replenisher: Replenisher, depth: usize) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<()>(depth.max(1));
        let worker = tokio::spawn(async move {
            while rx.recv().await.is_some() {
                match replenisher.run().await {
                    Ok(outcome) => {
                        tracing::debug!(outcome = outcome.label(), "background replenishment done")
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "background replenishment failed")
                    }
                }
            }
            tracing::debug!("replenishment worker stopped");
        });
        (Self { tx }, worker)
    }
}

impl ReplenishTrigger for QueuedTrigger {
    fn fire(&self) {
        match self.tx.try_send(()) {
            Ok(()) => {}
            Err(TrySendError::Full(())) => {
                tracing::trace!("replenishment already pending; trigger coalesced")
            }
            Err(TrySendError::Closed(())) => {
                tracing::warn!("replenishment worker has stopped; trigger dropped")
            }
        }
    }
}
