//! Provider worker event loop.
//!
//! # States
//! ```text
//! Collecting ──(batch full | quota remainder reached | collection timeout)──▶ Flushing
//! Flushing ──(results published | batch re-queued)──▶ Collecting
//! any ──(stop signal)──▶ Stopped
//! ```
//!
//! Each iteration waits on: the shared input queue, the collection deadline,
//! the quota window boundary and the stop signal. Addresses still in the
//! batch when the stop signal arrives are dropped. When the queue closes the
//! pending batch is flushed first.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{sleep, sleep_until, Instant};
use tracing::Instrument;
use uuid::Uuid;

use crate::balance::BalanceResult;
use crate::governor::{Clock, RateGovernor};
use crate::observability::metrics;
use crate::provider::ProviderAdapter;
use crate::resilience::RetryPolicy;
use crate::worker::batch::Batch;
use crate::worker::queue::{AddressQueue, QueueConsumer, QueuedAddress};

/// Timing and retry settings shared by every worker of a pool.
#[derive(Debug, Clone)]
pub struct WorkerSettings {
    /// How long a non-empty batch waits for more addresses.
    pub collection_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            collection_timeout: Duration::from_secs(5),
            retry: RetryPolicy::default(),
        }
    }
}

/// A running worker task.
#[derive(Debug)]
pub struct WorkerHandle {
    name: String,
    task: JoinHandle<()>,
}

impl WorkerHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the worker to stop.
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            tracing::error!(provider = %self.name, error = %e, "Worker task failed");
        }
    }
}

/// One provider's worker: owns the adapter, its governor and its batch.
pub struct Worker {
    adapter: Arc<dyn ProviderAdapter>,
    governor: RateGovernor,
    batch: Batch,
    queue: QueueConsumer,
    output: mpsc::Sender<BalanceResult>,
    settings: WorkerSettings,
    clock: Arc<dyn Clock>,
}

impl Worker {
    pub fn new(
        adapter: Arc<dyn ProviderAdapter>,
        queue: AddressQueue,
        output: mpsc::Sender<BalanceResult>,
        settings: WorkerSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let governor = RateGovernor::for_adapter(adapter.as_ref(), clock.now());
        let batch = Batch::with_capacity(governor.batch_limit());
        Self {
            adapter,
            governor,
            batch,
            queue: queue.consumer(),
            output,
            settings,
            clock,
        }
    }

    /// Replace the governor, e.g. to resume with quota already spent.
    pub fn with_governor(mut self, governor: RateGovernor) -> Self {
        self.governor = governor;
        self
    }

    pub fn name(&self) -> &str {
        self.adapter.name()
    }

    pub fn governor(&self) -> &RateGovernor {
        &self.governor
    }

    /// Run the event loop on its own task.
    pub fn spawn(self, shutdown: broadcast::Receiver<()>) -> WorkerHandle {
        let name = self.name().to_string();
        let task = tokio::spawn(self.run(shutdown));
        WorkerHandle { name, task }
    }

    /// Run until the stop signal fires, the input queue closes or the output stream closes.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            provider = %self.name(),
            batch_limit = self.governor.batch_limit(),
            hourly_quota = ?self.governor.quota_limit(),
            "Worker starting"
        );

        loop {
            if self.governor.refresh(self.clock.now()) {
                tracing::debug!(provider = %self.name(), "Quota window reset");
                metrics::record_quota_used(self.adapter.name(), 0);
            }

            if self.governor.is_exhausted() {
                let wait = self.governor.until_reset(self.clock.now()).unwrap_or_default();
                tracing::info!(
                    provider = %self.name(),
                    wait_secs = wait.as_secs(),
                    "Hourly quota exhausted, pausing until next window"
                );
                tokio::select! {
                    biased;
                    _ = shutdown.recv() => break,
                    _ = sleep(wait) => continue,
                }
            }

            let window_deadline = self
                .governor
                .until_reset(self.clock.now())
                .map(|wait| Instant::now() + wait);
            let collect_deadline = self.batch.deadline();
            let can_admit = self.governor.admit(self.batch.len() + 1);

            tokio::select! {
                biased;
                _ = shutdown.recv() => break,
                // Reset is applied by `refresh` at the top of the loop
                _ = sleep_until_opt(window_deadline) => {}
                item = self.queue.recv(), if can_admit => match item {
                    Some(item) => {
                        self.batch.push(item, self.settings.collection_timeout);
                        if self.governor.should_flush_now(self.batch.len()) && self.flush().await.is_break() {
                            break;
                        }
                    }
                    None => {
                        tracing::info!(provider = %self.name(), pending = self.batch.len(), "Input queue closed");
                        let _ = self.flush().await;
                        break;
                    }
                },
                _ = sleep_until_opt(collect_deadline) => {
                    if !self.batch.is_empty() && self.flush().await.is_break() {
                        break;
                    }
                }
            }
        }

        if !self.batch.is_empty() {
            tracing::warn!(
                provider = %self.name(),
                dropped = ?self.batch.addresses(),
                "Worker stopped with a pending batch"
            );
        }
        tracing::info!(provider = %self.name(), "Worker stopped");
    }

    /// Send the current batch to the provider.
    async fn flush(&mut self) -> ControlFlow<()> {
        let items = self.batch.take();
        if items.is_empty() {
            return ControlFlow::Continue(());
        }

        self.governor.consume(items.len());

        let span = tracing::info_span!(
            "flush",
            provider = %self.adapter.name(),
            batch_id = %Uuid::new_v4(),
            size = items.len()
        );
        let flow = self.dispatch(items).instrument(span).await;

        if let Some(pace) = self.adapter.pace() {
            sleep(pace).await;
        }
        flow
    }

    async fn dispatch(&mut self, items: Vec<QueuedAddress>) -> ControlFlow<()> {
        let provider = self.adapter.name().to_string();
        metrics::record_flush(&provider, items.len());
        metrics::record_quota_used(&provider, self.governor.used());

        let addresses: Vec<_> = items.iter().map(|item| item.address.clone()).collect();

        match self.adapter.fetch_balances(&addresses).await {
            Ok(records) => {
                tracing::debug!(results = records.len(), "Batch answered");
                for record in records {
                    let result = BalanceResult::from_record(&provider, record);
                    if self.output.send(result).await.is_err() {
                        tracing::warn!("Output stream closed, stopping worker");
                        return ControlFlow::Break(());
                    }
                    metrics::record_result(&provider);
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, kind = err.kind(), "Provider call failed, re-queuing batch");
                metrics::record_provider_error(&provider, err.kind());
                if err.is_rate_limited() {
                    self.governor.on_rate_limited();
                    metrics::record_quota_used(&provider, self.governor.used());
                }
                match self.queue.requeue_sender() {
                    Some(input) => {
                        self.settings.retry.requeue(&provider, items, &input);
                    }
                    None => {
                        tracing::warn!(dropped = items.len(), "Input queue closed, cannot re-queue batch");
                        metrics::record_abandoned(items.len());
                    }
                }
            }
        }

        ControlFlow::Continue(())
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balance::{Address, Amount, BalanceRecord};
    use crate::governor::SystemClock;
    use crate::provider::ProviderError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FlakyAdapter {
        error: Option<ProviderError>,
        calls: Mutex<Vec<Vec<Address>>>,
    }

    #[async_trait]
    impl ProviderAdapter for FlakyAdapter {
        fn name(&self) -> &str {
            "flaky"
        }

        fn batch_limit(&self) -> usize {
            3
        }

        fn hourly_quota(&self) -> Option<u32> {
            Some(200)
        }

        async fn fetch_balances(&self, addresses: &[Address]) -> Result<Vec<BalanceRecord>, ProviderError> {
            self.calls.lock().unwrap().push(addresses.to_vec());
            match &self.error {
                Some(err) => Err(err.clone()),
                None => Ok(addresses
                    .iter()
                    .map(|a| BalanceRecord {
                        address: a.clone(),
                        confirmed: Amount::from_sat(1),
                        unconfirmed: Amount::ZERO,
                        total: None,
                    })
                    .collect()),
            }
        }
    }

    fn make_worker(error: Option<ProviderError>) -> (Worker, Arc<FlakyAdapter>, AddressQueue, mpsc::Receiver<BalanceResult>) {
        let adapter = Arc::new(FlakyAdapter {
            error,
            calls: Mutex::new(Vec::new()),
        });
        let queue = AddressQueue::bounded(16);
        let (tx, rx) = mpsc::channel(16);
        let settings = WorkerSettings {
            collection_timeout: Duration::from_secs(5),
            retry: RetryPolicy::unlimited(Duration::from_millis(10), Duration::from_millis(10)),
        };
        let worker = Worker::new(adapter.clone(), queue.clone(), tx, settings, Arc::new(SystemClock));
        (worker, adapter, queue, rx)
    }

    fn fill(worker: &mut Worker, addresses: &[&str]) {
        for a in addresses {
            worker.batch.push(QueuedAddress::new(*a), Duration::from_secs(5));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_flush_requeues_exact_batch() {
        let (mut worker, adapter, queue, mut rx) = make_worker(Some(ProviderError::unreachable("flaky", "down")));
        fill(&mut worker, &["a1", "a2", "a3"]);

        assert!(worker.flush().await.is_continue());
        assert!(worker.batch.is_empty());
        assert_eq!(adapter.calls.lock().unwrap().len(), 1);

        tokio::time::sleep(Duration::from_millis(50)).await;

        let mut requeued = Vec::new();
        while let Some(item) = queue.try_recv() {
            assert_eq!(item.attempts, 1);
            requeued.push(item.address);
        }
        requeued.sort();
        assert_eq!(requeued, vec![Address::from("a1"), Address::from("a2"), Address::from("a3")]);
        assert!(rx.try_recv().is_err(), "no results for a failed batch");
    }

    #[tokio::test(start_paused = true)]
    async fn test_quota_spent_even_when_call_fails() {
        let (mut worker, _adapter, _queue, _rx) = make_worker(Some(ProviderError::invalid_response("flaky", "bad json")));
        fill(&mut worker, &["a1", "a2"]);
        assert!(worker.flush().await.is_continue());
        assert_eq!(worker.governor().used(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_exhausts_quota() {
        let (mut worker, _adapter, _queue, _rx) = make_worker(Some(ProviderError::rate_limited("flaky")));
        fill(&mut worker, &["a1"]);
        assert!(worker.flush().await.is_continue());
        assert!(worker.governor().is_exhausted());
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_flush_publishes_results() {
        let (mut worker, _adapter, _queue, mut rx) = make_worker(None);
        fill(&mut worker, &["a1", "a2"]);
        assert!(worker.flush().await.is_continue());

        let first = rx.recv().await.unwrap();
        assert_eq!(first.source, "flaky");
        assert_eq!(first.total, Amount::from_sat(1));
        assert_eq!(rx.recv().await.unwrap().address, Address::from("a2"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_output_stops_worker() {
        let (mut worker, _adapter, _queue, rx) = make_worker(None);
        drop(rx);
        fill(&mut worker, &["a1"]);
        assert!(worker.flush().await.is_break());
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_queue_flushes_pending_batch_and_stops() {
        let (worker, adapter, queue, mut rx) = make_worker(None);
        queue.sender().submit("a1").await.unwrap();
        drop(queue);

        let shutdown = crate::lifecycle::Shutdown::new();
        worker.run(shutdown.subscribe()).await;

        assert_eq!(adapter.calls.lock().unwrap().len(), 1);
        assert_eq!(rx.recv().await.unwrap().address, Address::from("a1"));
        assert!(rx.recv().await.is_none(), "worker dropped its output handle");
    }
}
