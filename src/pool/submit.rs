//! Feeding addresses into the shared input queue.

use tokio::task::JoinHandle;

use crate::balance::Address;
use crate::worker::{AddressSender, QueueClosed};

/// Submit every address in order, waiting while the queue is full.
///
/// Returns the number of addresses submitted.
pub async fn submit_addresses<I, A>(addresses: I, input: &AddressSender) -> Result<usize, QueueClosed>
where
    I: IntoIterator<Item = A>,
    A: Into<Address>,
{
    let mut count = 0;
    for address in addresses {
        input.submit(address).await?;
        count += 1;
    }
    tracing::debug!(count, "Addresses submitted");
    Ok(count)
}

/// Submit addresses from a background task.
pub fn spawn_submission(addresses: Vec<Address>, input: AddressSender) -> JoinHandle<Result<usize, QueueClosed>> {
    tokio::spawn(async move { submit_addresses(addresses, &input).await })
}
