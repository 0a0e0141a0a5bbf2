//! Command-line configuration of the quote server.
//!
//! This module defines the CLI interface using `clap` and turns it into the values
//! consumed by the core: queue capacity, pool sizing, backoff, and the provider registry.
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use quote_common::ProviderRegistry;

use crate::result::Result;
use crate::worker_pool::PoolConfig;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Address the HTTP listener binds to.
    #[clap(long, default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    /// Maximum number of prefetched quotes kept in memory.
    #[clap(long, default_value_t = 10, value_parser = positive)]
    pub queue_size: usize,

    /// Background workers started for every provider.
    #[clap(long, default_value_t = 2, value_parser = positive)]
    pub workers_per_provider: usize,

    /// Seconds a worker waits after a failed fetch.
    #[clap(long, default_value_t = 10, value_parser = positive)]
    pub backoff_secs: usize,

    /// JSON file replacing the built-in provider list.
    #[clap(long)]
    pub providers: Option<PathBuf>,
}

impl Args {
    /// Pool sizing and pacing.
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            workers_per_provider: self.workers_per_provider,
            backoff: Duration::from_secs(self.backoff_secs as u64),
        }
    }

    /// Registry from `--providers`, or the built-in one.
    pub fn registry(&self) -> Result<ProviderRegistry> {
        match &self.providers {
            Some(path) => Ok(ProviderRegistry::from_file(path)?),
            None => Ok(ProviderRegistry::builtin()),
        }
    }
}

fn positive(raw: &str) -> std::result::Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(value) => Ok(value),
        Err(e) => Err(e.to_string()),
    }
}
