//! Error types used across the quote server crate.
//!
//! - `FetchError` — outcome of one failed GET against a provider. All variants are
//!   expected, recoverable conditions: workers back off, the resolver falls through.
//! - `AcquireError` — fetch or normalization failure while producing one quote.
//! - `ServerError` — startup/shutdown failures surfaced from `main`.
//!
//! Conversions from `std::io::Error`, `reqwest::Error` and the shared `QuoteError` are
//! provided so startup code can use `?` throughout.
use std::io;

use quote_common::{ParseError, QuoteError};
use thiserror::Error;

/// Failure of a single provider request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Timeout, refused connection, TLS failure, or a broken body stream.
    #[error("Transport error from {provider}: {message}")]
    Transport {
        /// Provider name.
        provider: String,
        /// Underlying error text.
        message: String,
    },

    /// The provider answered with a non-2xx status.
    #[error("HTTP status {status} from {provider}")]
    HttpStatus {
        /// Provider name.
        provider: String,
        /// Numeric status code.
        status: u16,
    },

    /// The body was not valid JSON.
    #[error("Unparseable body from {provider}: {message}")]
    ParseFailure {
        /// Provider name.
        provider: String,
        /// serde_json error text.
        message: String,
    },

    /// Valid JSON, but neither an object nor a non-empty list starting with one.
    #[error("Unexpected data format from {provider}")]
    UnexpectedFormat {
        /// Provider name.
        provider: String,
    },
}

/// Failure to obtain one quote from one provider: either the request or the
/// normalization went wrong.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AcquireError {
    /// The GET itself failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The payload could not be normalized.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl AcquireError {
    /// `true` when the registry and the normalizer disagree about a provider.
    pub fn is_misconfiguration(&self) -> bool {
        matches!(self, AcquireError::Parse(err) if err.is_misconfiguration())
    }
}

/// Errors that stop the server binary.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Socket or file I/O.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration, registry loading, or rendering failures.
    #[error(transparent)]
    Quote(#[from] QuoteError),

    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// A worker thread could not be spawned.
    #[error("Failed to spawn worker thread: {0}")]
    Spawn(String),
}
