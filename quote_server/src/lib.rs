//! Quote service core.
//!
//! The crate keeps a bounded queue of prefetched quotes warm and answers each request
//! from it, falling back to a direct upstream fetch and finally to bundled quotes:
//!
//! - `fetch` — one GET per provider behind the `Fetcher` trait (`HttpFetcher` in
//!   production).
//! - `queue` — `QuoteQueue`, the bounded FIFO shared by producers and the request path.
//! - `worker_pool` — background workers that fetch, normalize and enqueue, with fixed
//!   backoff and cooperative cancellation.
//! - `resolver` — the three-tier request-time `Resolver`.
//! - `http` — axum routes and format negotiation.
//! - `args` — command-line configuration.
#![warn(missing_docs)]
pub mod args;
pub mod error;
pub mod fetch;
pub mod http;
pub mod queue;
pub mod resolver;
pub mod result;
pub mod worker_pool;

pub use error::{AcquireError, FetchError, ServerError};
pub use fetch::{Fetcher, HttpFetcher};
pub use queue::QuoteQueue;
pub use resolver::Resolver;
pub use result::Result;
pub use worker_pool::{PoolConfig, WorkerPool};
