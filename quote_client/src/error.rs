//! Errors raised while talking to the quote server.
use thiserror::Error;

/// Client-side failure.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Connection, timeout, or body read failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Server answered {status}: {body}")]
    Status {
        /// Numeric status code.
        status: u16,
        /// Response body, usually a JSON error message.
        body: String,
    },
}
