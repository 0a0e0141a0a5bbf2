//! Prefetch worker pool.
//!
//! The pool keeps the `QuoteQueue` warm by running `workers_per_provider` threads for
//! every provider in the registry. Each worker loops through two states:
//!
//! - Fetching — fetch one payload from its provider, normalize it, and push the quote
//!   into the queue. The push blocks while the queue is full, so producers slow down
//!   instead of dropping quotes. After a successful push the worker fetches again right
//!   away.
//! - Backoff — after any failure (transport, status, parse, normalization, or a panic
//!   in the loop body) the worker waits a fixed interval before fetching again.
//!
//! Cancellation and shutdown:
//! - All workers share the receiving end of a shutdown channel. `WorkerPool::shutdown`
//!   drops the only sender, which disconnects the channel for every worker at once.
//! - Workers check the channel before each fetch, while blocked on a full queue, and
//!   during backoff. An in-flight fetch is bounded by the provider's own timeout.
//! - `shutdown` joins every worker thread before returning; dropping the pool does the
//!   same.
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, bounded};
use log::{debug, error, info, warn};
use quote_common::{Provider, ProviderRegistry, Quote};

use crate::error::{AcquireError, ServerError};
use crate::fetch::{Fetcher, fetch_quote};
use crate::queue::QuoteQueue;
use crate::result::Result;

/// Default number of workers started for every provider.
pub const DEFAULT_WORKERS_PER_PROVIDER: usize = 2;
/// Default wait after a failed attempt.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(10);

/// Pool sizing and retry pacing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Workers started for each provider.
    pub workers_per_provider: usize,
    /// Fixed wait after a failed attempt.
    pub backoff: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers_per_provider: DEFAULT_WORKERS_PER_PROVIDER,
            backoff: DEFAULT_BACKOFF,
        }
    }
}

/// Running set of prefetch workers.
pub struct WorkerPool {
    shutdown_tx: Option<Sender<()>>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `workers_per_provider × providers` workers feeding `queue`.
    ///
    /// Worker ids are 1-based and assigned round by round over the registry.
    pub fn start(
        config: &PoolConfig,
        registry: &ProviderRegistry,
        fetcher: Arc<dyn Fetcher>,
        queue: QuoteQueue,
    ) -> Result<Self> {
        info!(
            "Starting background workers to preload data. Queue size: {}",
            queue.capacity()
        );
        info!(
            "From the following data providers: {}.",
            registry.names().join(", ")
        );

        let (shutdown_tx, shutdown_rx) = bounded::<()>(0);
        let mut handles = Vec::with_capacity(config.workers_per_provider * registry.len());
        let mut worker_id = 0;

        for _ in 0..config.workers_per_provider {
            for provider in registry.iter() {
                worker_id += 1;
                let worker = Worker {
                    id: worker_id,
                    provider: provider.clone(),
                    fetcher: Arc::clone(&fetcher),
                    queue: queue.clone(),
                    shutdown: shutdown_rx.clone(),
                    backoff: config.backoff,
                };
                let handle = thread::Builder::new()
                    .name(format!("quote-worker-{worker_id}"))
                    .spawn(move || worker.run())
                    .map_err(|e| ServerError::Spawn(e.to_string()))?;
                handles.push(handle);
            }
        }

        Ok(Self {
            shutdown_tx: Some(shutdown_tx),
            handles,
        })
    }

    /// Number of worker threads still owned by the pool.
    pub fn worker_count(&self) -> usize {
        self.handles.len()
    }

    /// Cancel every worker and wait until all of them have exited.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            info!(
                "Shutting down, cancelling {} background workers",
                self.handles.len()
            );
            drop(shutdown_tx);
        }
        for handle in self.handles.drain(..) {
            let name = handle.thread().name().unwrap_or("quote-worker").to_string();
            match handle.join() {
                Ok(()) => debug!("{name} cancelled"),
                Err(_) => error!("{name} terminated by a panic"),
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.stop();
    }
}

enum Step {
    Enqueued,
    Failed,
    Cancelled,
}

struct Worker {
    id: usize,
    provider: Provider,
    fetcher: Arc<dyn Fetcher>,
    queue: QuoteQueue,
    shutdown: Receiver<()>,
    backoff: Duration,
}

impl Worker {
    fn run(self) {
        info!("Worker {} started for {}", self.id, self.provider.name);
        while !self.is_cancelled() {
            match self.step() {
                Step::Enqueued => continue,
                Step::Cancelled => break,
                Step::Failed => {
                    if self.wait_backoff() {
                        break;
                    }
                }
            }
        }
        debug!("Worker {} for {} stopped", self.id, self.provider.name);
    }

    /// One pass through the Fetching state.
    fn step(&self) -> Step {
        let attempt = panic::catch_unwind(AssertUnwindSafe(|| {
            fetch_quote(self.fetcher.as_ref(), &self.provider)
        }));
        let quote = match attempt {
            Ok(Ok(quote)) => quote,
            Ok(Err(err)) => {
                self.report(&err);
                return Step::Failed;
            }
            Err(payload) => {
                error!(
                    "Worker {} panicked while fetching from {}: {}",
                    self.id,
                    self.provider.name,
                    panic_message(payload.as_ref())
                );
                return Step::Failed;
            }
        };
        self.enqueue(quote)
    }

    fn enqueue(&self, quote: Quote) -> Step {
        match self.queue.push_until(quote, &self.shutdown) {
            Ok(()) => {
                info!(
                    "Worker {} added data from {} to queue. Queue size: {}",
                    self.id,
                    self.provider.name,
                    self.queue.len()
                );
                Step::Enqueued
            }
            Err(_) => Step::Cancelled,
        }
    }

    fn report(&self, err: &AcquireError) {
        if err.is_misconfiguration() {
            error!("Worker {}: {}", self.id, err);
        } else {
            warn!("Worker {}: {}", self.id, err);
        }
    }

    /// Sleep through the Backoff state. Returns `true` if cancelled meanwhile.
    fn wait_backoff(&self) -> bool {
        warn!(
            "Worker {} failed to fetch data from {}, sleep {:?} to backoff",
            self.id, self.provider.name, self.backoff
        );
        !matches!(
            self.shutdown.recv_timeout(self.backoff),
            Err(RecvTimeoutError::Timeout)
        )
    }

    fn is_cancelled(&self) -> bool {
        !matches!(self.shutdown.try_recv(), Err(TryRecvError::Empty))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use quote_common::RawPayload;
    use serde_json::json;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    fn zen_payload(text: &str) -> RawPayload {
        match json!({"q": text, "a": "ZenA"}) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn zen_registry() -> ProviderRegistry {
        ProviderRegistry::new(vec![Provider::new("zenquotes", "http://unused")]).unwrap()
    }

    fn fast_config(workers_per_provider: usize) -> PoolConfig {
        PoolConfig {
            workers_per_provider,
            backoff: Duration::from_millis(20),
        }
    }

    /// Counts calls and always answers with a numbered zenquotes payload.
    #[derive(Default)]
    struct CountingFetcher {
        calls: AtomicUsize,
    }

    impl Fetcher for CountingFetcher {
        fn fetch(&self, _provider: &Provider) -> std::result::Result<RawPayload, FetchError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(zen_payload(&format!("Zen{n}")))
        }
    }

    /// Replays a script of outcomes, then keeps failing.
    struct ScriptedFetcher {
        script: Mutex<Vec<std::result::Result<RawPayload, FetchError>>>,
        calls: AtomicUsize,
    }

    impl Fetcher for ScriptedFetcher {
        fn fetch(&self, provider: &Provider) -> std::result::Result<RawPayload, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut script = self.script.lock().unwrap();
            if script.is_empty() {
                Err(FetchError::HttpStatus {
                    provider: provider.name.clone(),
                    status: 503,
                })
            } else {
                script.remove(0)
            }
        }
    }

    struct PanickingFetcher {
        calls: AtomicUsize,
    }

    impl Fetcher for PanickingFetcher {
        fn fetch(&self, _provider: &Provider) -> std::result::Result<RawPayload, FetchError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n == 0 {
                panic!("malformed upstream response");
            }
            Ok(zen_payload("after panic"))
        }
    }

    struct SlowFetcher(Duration);

    impl Fetcher for SlowFetcher {
        fn fetch(&self, _provider: &Provider) -> std::result::Result<RawPayload, FetchError> {
            thread::sleep(self.0);
            Ok(zen_payload("slow"))
        }
    }

    fn wait_for(mut condition: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !condition() {
            assert!(Instant::now() < deadline, "condition not met in time");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn starts_workers_per_provider_times_providers() {
        let queue = QuoteQueue::new(4).unwrap();
        let fetcher: Arc<dyn Fetcher> = Arc::new(CountingFetcher::default());
        let pool = WorkerPool::start(
            &fast_config(3),
            &ProviderRegistry::builtin(),
            fetcher,
            queue,
        )
        .unwrap();
        assert_eq!(pool.worker_count(), 6);
        pool.shutdown();
    }

    #[test]
    fn fills_queue_up_to_capacity_and_then_blocks() {
        let queue = QuoteQueue::new(3).unwrap();
        let fetcher = Arc::new(CountingFetcher::default());
        let pool = WorkerPool::start(
            &fast_config(1),
            &zen_registry(),
            fetcher.clone(),
            queue.clone(),
        )
        .unwrap();

        wait_for(|| queue.len() == 3);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(queue.len(), 3);
        // One quote is held by the blocked worker, nothing is fetched beyond that.
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 4);

        pool.shutdown();
        let texts: Vec<String> = queue.drain().into_iter().map(|q| q.text).collect();
        assert_eq!(texts, vec!["Zen0", "Zen1", "Zen2"]);
    }

    #[test]
    fn failures_back_off_and_then_recover() {
        let queue = QuoteQueue::new(2).unwrap();
        let fetcher = Arc::new(ScriptedFetcher {
            script: Mutex::new(vec![
                Err(FetchError::Transport {
                    provider: "zenquotes".into(),
                    message: "connection refused".into(),
                }),
                Ok(zen_payload("Too many requests. Obtain an auth key for unlimited access.")),
                Ok(zen_payload("Zen1")),
            ]),
            calls: AtomicUsize::new(0),
        });
        let pool = WorkerPool::start(
            &fast_config(1),
            &zen_registry(),
            fetcher.clone(),
            queue.clone(),
        )
        .unwrap();

        wait_for(|| !queue.is_empty());
        pool.shutdown();
        assert_eq!(queue.try_pop().unwrap().text, "Zen1");
        assert!(fetcher.calls.load(Ordering::SeqCst) >= 3);
    }

    #[test]
    fn unknown_provider_only_backs_off() {
        let queue = QuoteQueue::new(2).unwrap();
        let registry =
            ProviderRegistry::new(vec![Provider::new("mystery", "http://unused")]).unwrap();
        let fetcher = Arc::new(CountingFetcher::default());
        let pool = WorkerPool::start(
            &fast_config(1),
            &registry,
            fetcher.clone(),
            queue.clone(),
        )
        .unwrap();

        wait_for(|| fetcher.calls.load(Ordering::SeqCst) >= 2);
        pool.shutdown();
        assert!(queue.is_empty());
    }

    #[test]
    fn panic_in_loop_body_does_not_kill_the_worker() {
        let queue = QuoteQueue::new(1).unwrap();
        let fetcher = Arc::new(PanickingFetcher {
            calls: AtomicUsize::new(0),
        });
        let pool = WorkerPool::start(
            &fast_config(1),
            &zen_registry(),
            fetcher.clone(),
            queue.clone(),
        )
        .unwrap();

        wait_for(|| !queue.is_empty());
        pool.shutdown();
        assert_eq!(queue.try_pop().unwrap().text, "after panic");
    }

    #[test]
    fn shutdown_is_prompt_during_long_backoff() {
        let queue = QuoteQueue::new(1).unwrap();
        let fetcher = Arc::new(ScriptedFetcher {
            script: Mutex::new(vec![]),
            calls: AtomicUsize::new(0),
        });
        let config = PoolConfig {
            workers_per_provider: 2,
            backoff: Duration::from_secs(60),
        };
        let pool = WorkerPool::start(&config, &zen_registry(), fetcher.clone(), queue).unwrap();

        wait_for(|| fetcher.calls.load(Ordering::SeqCst) >= 2);
        let started = Instant::now();
        pool.shutdown();
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn shutdown_completes_while_a_worker_is_mid_fetch() {
        let queue = QuoteQueue::new(1).unwrap();
        let fetcher: Arc<dyn Fetcher> = Arc::new(SlowFetcher(Duration::from_millis(300)));
        let pool = WorkerPool::start(&fast_config(2), &zen_registry(), fetcher, queue).unwrap();

        thread::sleep(Duration::from_millis(50));
        let started = Instant::now();
        pool.shutdown();
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn dropping_the_pool_stops_the_workers() {
        let queue = QuoteQueue::new(1).unwrap();
        let fetcher = Arc::new(CountingFetcher::default());
        {
            let _pool = WorkerPool::start(
                &fast_config(1),
                &zen_registry(),
                fetcher.clone(),
                queue.clone(),
            )
            .unwrap();
            wait_for(|| queue.len() == 1);
        }
        let calls = fetcher.calls.load(Ordering::SeqCst);
        queue.drain();
        thread::sleep(Duration::from_millis(50));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), calls);
    }
}
