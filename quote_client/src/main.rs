//! Quote Client — polls the quote server over HTTP and logs every quote it receives.
//!
//! Usage example (CLI):
//! ```bash
//! quote_client --server-url http://127.0.0.1:8000 --format text --count 0 --interval-ms 500
//! ```
//!
//! `--count 0` keeps polling until Ctrl+C. A failed request is logged and polling
//! continues.
#![warn(missing_docs)]
mod args;
mod error;
mod requester;

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::Duration;

use clap::Parser;
use log::{error, info};

use crate::args::Args;
use crate::error::ClientError;
use crate::requester::QuoteRequester;

fn main() -> Result<(), ClientError> {
    init_logger();
    let args = Args::parse();
    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        if let Err(e) = ctrlc::set_handler(move || {
            info!("Ctrl+C received. Shutting down client...");
            shutdown.store(true, Ordering::SeqCst);
        }) {
            error!("Error setting Ctrl+C handler: {e}");
        }
    }

    let requester = QuoteRequester::new(&args.server_url, args.format)?;
    info!("Requesting quotes from {}", requester.url());

    let interval = Duration::from_millis(args.interval_ms);
    let mut received = 0u64;
    while !shutdown.load(Ordering::Relaxed) {
        match requester.request() {
            Ok(body) => info!("QUOTE: {}", body.trim()),
            Err(e) => error!("Request failed: {e}"),
        }
        received += 1;
        if args.count != 0 && received >= args.count {
            break;
        }
        thread::sleep(interval);
    }
    info!("Client stopping after {received} requests");
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
