//! The batch a worker is collecting.

use std::time::Duration;
use tokio::time::Instant;

use crate::balance::Address;
use crate::worker::queue::QueuedAddress;

/// Addresses collected since the last flush.
///
/// The collection deadline is armed by the first address and cleared on
/// every flush.
#[derive(Debug, Default)]
pub struct Batch {
    items: Vec<QueuedAddress>,
    deadline: Option<Instant>,
}

impl Batch {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            deadline: None,
        }
    }

    pub fn push(&mut self, item: QueuedAddress, collection_timeout: Duration) {
        if self.items.is_empty() {
            self.deadline = Some(Instant::now() + collection_timeout);
        }
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn addresses(&self) -> Vec<Address> {
        self.items.iter().map(|item| item.address.clone()).collect()
    }

    /// Empty the batch, handing its contents to the caller.
    pub fn take(&mut self) -> Vec<QueuedAddress> {
        self.deadline = None;
        std::mem::take(&mut self.items)
    }
}
