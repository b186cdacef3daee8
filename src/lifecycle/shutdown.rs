//! Pool-wide stop signal.
//!
//! Workers subscribe before they are spawned. A trigger wakes each of them
//! once, whether it is collecting, waiting on a deadline or paused on an
//! exhausted quota. In-flight provider calls are not cancelled; the worker
//! sees the signal on its next loop iteration.

use tokio::sync::broadcast;

/// Stop signal shared by every worker of a pool.
///
/// Dropping it also releases every subscriber, so a pool that goes away
/// without `stop` still winds its workers down.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        // One slot is enough: the only message is "stop"
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Receiver for one worker. Only triggers after this call are observed.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Ask every subscribed worker to stop.
    pub fn trigger(&self) {
        let listeners = self.tx.send(()).unwrap_or(0);
        tracing::debug!(listeners, "Stop signal sent");
    }

    /// Workers still holding a receiver.
    pub fn listeners(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
