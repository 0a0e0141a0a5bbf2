//! Command-line arguments for the Quote Client.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use clap::Parser;
use quote_common::OutputFormat;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Base URL of the quote server.
    #[clap(long, default_value = "http://127.0.0.1:8000")]
    pub server_url: String,

    /// Representation to request.
    #[clap(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Number of quotes to request; 0 keeps polling until Ctrl+C.
    #[clap(long, default_value_t = 1)]
    pub count: u64,

    /// Pause between two requests, in milliseconds.
    #[clap(long, default_value_t = 1000)]
    pub interval_ms: u64,
}
