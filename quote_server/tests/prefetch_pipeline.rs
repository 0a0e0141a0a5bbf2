mod common;

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use common::{closed_port_url, provider, spawn_stub, spawn_stub_with_delay};
use quote_common::{FallbackQuotes, ProviderRegistry};
use quote_server::{Fetcher, HttpFetcher, PoolConfig, QuoteQueue, Resolver, WorkerPool};

fn wait_until_full(queue: &QuoteQueue) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while queue.len() < queue.capacity() {
        assert!(Instant::now() < deadline, "queue never filled up");
        thread::sleep(Duration::from_millis(10));
    }
}

#[test]
fn workers_keep_the_queue_warm_for_the_resolver() {
    let quotable = spawn_stub(200, r#"{"content":"hello","author":"Bob","tags":["x"]}"#);
    let zen = spawn_stub(200, r#"[{"q":"Zen1","a":"ZenA"}]"#);
    let registry = Arc::new(
        ProviderRegistry::new(vec![provider("quotable", &quotable), provider("zenquotes", &zen)])
            .unwrap(),
    );
    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(&registry).unwrap());
    let queue = QuoteQueue::new(4).unwrap();
    let config = PoolConfig {
        workers_per_provider: 2,
        backoff: Duration::from_millis(50),
    };
    let pool = WorkerPool::start(&config, &registry, Arc::clone(&fetcher), queue.clone()).unwrap();
    assert_eq!(pool.worker_count(), 4);

    wait_until_full(&queue);
    let resolver = Resolver::new(queue.clone(), registry, fetcher, FallbackQuotes::bundled());
    for _ in 0..8 {
        let quote = resolver.resolve();
        assert!(
            quote.source == "quotable" || quote.source == "zenquotes",
            "unexpected source {}",
            quote.source
        );
        assert!(queue.len() <= queue.capacity());
    }

    pool.shutdown();
}

#[test]
fn failing_providers_leave_the_queue_empty_and_resolver_falls_back() {
    let registry =
        Arc::new(ProviderRegistry::new(vec![provider("quotable", &closed_port_url())]).unwrap());
    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(&registry).unwrap());
    let queue = QuoteQueue::new(2).unwrap();
    let config = PoolConfig {
        workers_per_provider: 1,
        backoff: Duration::from_millis(20),
    };
    let pool = WorkerPool::start(&config, &registry, Arc::clone(&fetcher), queue.clone()).unwrap();
    thread::sleep(Duration::from_millis(100));
    assert!(queue.is_empty());

    let resolver = Resolver::new(queue, registry, fetcher, FallbackQuotes::bundled());
    assert!(resolver.resolve().is_fallback());
    pool.shutdown();
}

#[test]
fn shutdown_waits_at_most_for_the_in_flight_request() {
    let slow = spawn_stub_with_delay(200, r#"[{"q":"late","a":"ZenA"}]"#, Duration::from_secs(5));
    let registry = ProviderRegistry::new(vec![provider("zenquotes", &slow)]).unwrap();
    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(&registry).unwrap());
    let queue = QuoteQueue::new(1).unwrap();
    let pool = WorkerPool::start(&PoolConfig::default(), &registry, fetcher, queue).unwrap();

    thread::sleep(Duration::from_millis(100));
    let started = Instant::now();
    pool.shutdown();
    // Provider timeout is 500ms; the 5s upstream delay must not hold shutdown.
    assert!(started.elapsed() < Duration::from_secs(3));
}
