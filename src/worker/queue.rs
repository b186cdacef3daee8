//! Shared input queue.
//!
//! Multi-producer, multi-consumer: every worker holds a [`QueueConsumer`] and
//! whichever is idle takes the next address. Consumers take turns on the
//! receiver through an async mutex; both the lock and `recv` are cancel-safe,
//! so a worker whose `select!` picks another branch never loses an address.
//!
//! Consumers only keep a weak handle for re-queuing, so the queue closes once
//! every [`AddressSender`] is dropped and the buffered addresses are drained.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};

use crate::balance::Address;

/// The queue was closed; no worker can receive any more addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("address queue closed")]
pub struct QueueClosed;

/// An address waiting for a worker, with the number of failed attempts so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedAddress {
    pub address: Address,
    pub attempts: u32,
}

impl QueuedAddress {
    pub fn new(address: impl Into<Address>) -> Self {
        Self {
            address: address.into(),
            attempts: 0,
        }
    }

    pub fn failed_once(self) -> Self {
        Self {
            attempts: self.attempts.saturating_add(1),
            ..self
        }
    }
}

/// Producer side of the shared input queue.
#[derive(Debug, Clone)]
pub struct AddressSender {
    tx: mpsc::Sender<QueuedAddress>,
}

impl AddressSender {
    /// Submit a fresh address. Waits while the queue is full.
    pub async fn submit(&self, address: impl Into<Address>) -> Result<(), QueueClosed> {
        self.send(QueuedAddress::new(address)).await
    }

    pub async fn send(&self, item: QueuedAddress) -> Result<(), QueueClosed> {
        self.tx.send(item).await.map_err(|_| QueueClosed)
    }
}

/// The shared queue, cloned into every worker.
#[derive(Debug, Clone)]
pub struct AddressQueue {
    sender: AddressSender,
    receiver: Arc<Mutex<mpsc::Receiver<QueuedAddress>>>,
}

impl AddressQueue {
    pub fn bounded(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        Self {
            sender: AddressSender { tx },
            receiver: Arc::new(Mutex::new(rx)),
        }
    }

    pub fn sender(&self) -> AddressSender {
        self.sender.clone()
    }

    /// Wait for the next address.
    pub async fn recv(&self) -> Option<QueuedAddress> {
        self.receiver.lock().await.recv().await
    }

    /// Take an address if one is ready and no worker is currently waiting on the queue.
    pub fn try_recv(&self) -> Option<QueuedAddress> {
        self.receiver.try_lock().ok()?.try_recv().ok()
    }

    /// Worker side of the queue. Does not keep the queue open.
    pub fn consumer(&self) -> QueueConsumer {
        QueueConsumer {
            requeue: self.sender.tx.downgrade(),
            receiver: self.receiver.clone(),
        }
    }
}

/// What a worker holds: the shared receiver plus a weak sender for re-queuing.
#[derive(Debug, Clone)]
pub struct QueueConsumer {
    requeue: mpsc::WeakSender<QueuedAddress>,
    receiver: Arc<Mutex<mpsc::Receiver<QueuedAddress>>>,
}

impl QueueConsumer {
    /// Wait for the next address. `None` once the queue is closed and empty.
    pub async fn recv(&self) -> Option<QueuedAddress> {
        self.receiver.lock().await.recv().await
    }

    /// A sender for putting failed addresses back, unless the queue is closed.
    pub fn requeue_sender(&self) -> Option<AddressSender> {
        self.requeue.upgrade().map(|tx| AddressSender { tx })
    }
}
