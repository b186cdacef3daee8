//! Worker pool construction and shutdown.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::balance::BalanceResult;
use crate::config::HammerConfig;
use crate::governor::{Clock, SystemClock};
use crate::lifecycle::Shutdown;
use crate::provider::ProviderAdapter;
use crate::resilience::RetryPolicy;
use crate::worker::{AddressQueue, AddressSender, Worker, WorkerHandle, WorkerSettings};

/// Pool-wide settings.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub queue_capacity: usize,
    pub output_capacity: usize,
    pub collection_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self::from_config(&HammerConfig::default())
    }
}

impl PoolSettings {
    pub fn from_config(config: &HammerConfig) -> Self {
        Self {
            queue_capacity: config.pool.queue_capacity,
            output_capacity: config.pool.output_capacity,
            collection_timeout: Duration::from_millis(config.pool.collection_timeout_ms),
            retry: RetryPolicy::from_config(&config.retry),
        }
    }

    fn worker_settings(&self) -> WorkerSettings {
        WorkerSettings {
            collection_timeout: self.collection_timeout,
            retry: self.retry.clone(),
        }
    }
}

/// A set of provider workers sharing one input queue, one output stream and one stop signal.
pub struct Pool {
    input: AddressSender,
    shutdown: Shutdown,
    workers: Vec<WorkerHandle>,
}

impl Pool {
    /// Start one worker per adapter. Must be called from within a tokio runtime.
    pub fn start(
        adapters: Vec<Arc<dyn ProviderAdapter>>,
        settings: PoolSettings,
    ) -> (Self, mpsc::Receiver<BalanceResult>) {
        Self::start_with_clock(adapters, settings, Arc::new(SystemClock))
    }

    /// Like [`Pool::start`] with an explicit wall-clock source for quota windows.
    pub fn start_with_clock(
        adapters: Vec<Arc<dyn ProviderAdapter>>,
        settings: PoolSettings,
        clock: Arc<dyn Clock>,
    ) -> (Self, mpsc::Receiver<BalanceResult>) {
        let queue = AddressQueue::bounded(settings.queue_capacity);
        let (output_tx, output_rx) = mpsc::channel(settings.output_capacity.max(1));
        let shutdown = Shutdown::new();

        let workers = adapters
            .into_iter()
            .map(|adapter| {
                let worker = Worker::new(
                    adapter,
                    queue.clone(),
                    output_tx.clone(),
                    settings.worker_settings(),
                    clock.clone(),
                );
                // Subscribe before spawning so no worker can miss the signal
                worker.spawn(shutdown.subscribe())
            })
            .collect::<Vec<_>>();

        tracing::info!(
            workers = workers.len(),
            queue_capacity = settings.queue_capacity,
            collection_timeout_ms = settings.collection_timeout.as_millis() as u64,
            "Worker pool started"
        );

        let input = queue.sender();
        (Self { input, shutdown, workers }, output_rx)
    }

    /// Handle for submitting addresses.
    pub fn input(&self) -> AddressSender {
        self.input.clone()
    }

    pub fn worker_names(&self) -> Vec<&str> {
        self.workers.iter().map(WorkerHandle::name).collect()
    }

    /// Number of workers still running.
    pub fn running(&self) -> usize {
        self.workers.iter().filter(|w| !w.is_finished()).count()
    }

    /// Signal every worker to stop.
    pub fn stop(&self) {
        tracing::info!(workers = self.workers.len(), "Stopping worker pool");
        self.shutdown.trigger();
    }

    /// Release the pool's own input handle and wait for every worker task to exit.
    ///
    /// Without [`Pool::stop`], workers drain the queue and exit once every
    /// other [`AddressSender`] is gone too.
    pub async fn join(self) {
        let Self { input, shutdown: _shutdown, workers } = self;
        drop(input);
        for worker in workers {
            worker.join().await;
        }
    }
}
