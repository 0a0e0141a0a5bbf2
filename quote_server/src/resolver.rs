//! Request-time quote resolution.
//!
//! Every inbound request calls `Resolver::resolve` once. The answer comes from the
//! first tier that succeeds:
//!
//! 1. the prefetch queue, if it holds anything (oldest quote first);
//! 2. a direct fetch from one provider picked uniformly at random, done synchronously
//!    within the request;
//! 3. a random entry of the bundled fallback table.
//!
//! The last tier cannot fail, so `resolve` always returns a quote. A panic raised while
//! fetching directly is caught and treated like any other failed fetch.
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use log::{info, warn};
use quote_common::{FallbackQuotes, ProviderRegistry, Quote};

use crate::fetch::{Fetcher, fetch_quote};
use crate::queue::QuoteQueue;

/// Three-tier quote source used by the HTTP layer.
pub struct Resolver {
    queue: QuoteQueue,
    registry: Arc<ProviderRegistry>,
    fetcher: Arc<dyn Fetcher>,
    fallback: FallbackQuotes,
}

impl Resolver {
    /// Wire the resolver to the shared queue, the registry and a fetcher.
    pub fn new(
        queue: QuoteQueue,
        registry: Arc<ProviderRegistry>,
        fetcher: Arc<dyn Fetcher>,
        fallback: FallbackQuotes,
    ) -> Self {
        Self {
            queue,
            registry,
            fetcher,
            fallback,
        }
    }

    /// Return one quote. Never fails.
    pub fn resolve(&self) -> Quote {
        if let Some(quote) = self.queue.try_pop() {
            info!("Quote from queue. Queue size: {}", self.queue.len());
            return quote;
        }

        warn!("Queue is empty, get data directly");
        if let Some(quote) = self.fetch_directly() {
            return quote;
        }
        self.fallback()
    }

    /// A random entry of the fallback table.
    pub fn fallback(&self) -> Quote {
        self.fallback.choose()
    }

    fn fetch_directly(&self) -> Option<Quote> {
        let provider = self.registry.choose_random();
        let attempt = panic::catch_unwind(AssertUnwindSafe(|| {
            fetch_quote(self.fetcher.as_ref(), provider)
        }));
        match attempt {
            Ok(Ok(quote)) => Some(quote),
            Ok(Err(err)) => {
                warn!("Failed to directly fetch data from {}: {}", provider.name, err);
                None
            }
            Err(_) => {
                warn!("Direct fetch from {} panicked", provider.name);
                None
            }
        }
    }
}
