//! Inspirational quotes HTTP server.
//!
//! Startup order:
//! - parse the CLI and load the provider registry;
//! - build the blocking HTTP fetcher, the bounded queue and the worker pool (outside any
//!   async context, since `reqwest::blocking` must not be created inside one);
//! - start a tokio runtime and serve the axum router until Ctrl+C / SIGTERM;
//! - after the listener stops, cancel the pool and wait for every worker to exit.
//!
//! Queued quotes are dropped on shutdown.
#![warn(missing_docs)]
use std::sync::Arc;

use clap::Parser;
use log::{info, warn};
use quote_common::{FallbackQuotes, ProviderKind};
use quote_server::args::Args;
use quote_server::fetch::{Fetcher, HttpFetcher};
use quote_server::http;
use quote_server::queue::QuoteQueue;
use quote_server::resolver::Resolver;
use quote_server::worker_pool::WorkerPool;
use quote_server::{Result, ServerError};

fn main() -> Result<(), ServerError> {
    init_logger();
    let args = Args::parse();

    let registry = Arc::new(args.registry()?);
    for name in registry.names() {
        if ProviderKind::from_name(name).is_err() {
            warn!("Provider {name} has no normalizer; its workers will only back off");
        }
    }

    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(&registry)?);
    let queue = QuoteQueue::new(args.queue_size)?;
    let pool = WorkerPool::start(
        &args.pool_config(),
        &registry,
        Arc::clone(&fetcher),
        queue.clone(),
    )?;
    let resolver = Arc::new(Resolver::new(
        queue.clone(),
        registry,
        fetcher,
        FallbackQuotes::bundled(),
    ));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let served = runtime.block_on(async {
        let listener = tokio::net::TcpListener::bind(args.bind).await?;
        http::serve(listener, resolver).await
    });
    drop(runtime);

    pool.shutdown();
    let dropped = queue.drain().len();
    info!("Stopped. Discarded {dropped} queued quotes");
    Ok(served?)
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
