//! Error types shared between the quote server and client.
//!
//! Two enums live here:
//! - `ParseError` — the normalizer's verdict on a single provider payload. Every variant
//!   is an expected, recoverable condition except `UnknownProvider`, which signals a
//!   mismatch between the provider registry and the normalizer's mapping table.
//! - `QuoteError` — the unified error for configuration loading, I/O, JSON handling and
//!   output rendering, so binaries can propagate a single type with `?`.
use std::io;

use thiserror::Error;

/// Reasons a provider payload could not be turned into a `Quote`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The provider name has no extraction rule.
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// The extraction rule references a field the payload does not carry.
    #[error("Provider {provider} payload is missing field `{field}`")]
    MissingField {
        /// Provider the payload came from.
        provider: String,
        /// Name of the absent field.
        field: &'static str,
    },

    /// The payload was mapped but its content is not a usable quote
    /// (wrong field type, empty text, upstream error text posing as a quote).
    #[error("Provider {provider} returned invalid content: {reason}")]
    InvalidContent {
        /// Provider the payload came from.
        provider: String,
        /// Short human-readable reason.
        reason: String,
    },
}

impl ParseError {
    /// `true` for errors caused by configuration rather than upstream data.
    pub fn is_misconfiguration(&self) -> bool {
        matches!(self, ParseError::UnknownProvider(_))
    }
}

/// Unified error type shared by server and client.
#[derive(Error, Debug)]
pub enum QuoteError {
    /// I/O error originating from the standard library or files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// Invalid startup configuration (empty registry, duplicate provider names, ...).
    #[error("Configuration error: {0}")]
    Config(String),

    /// A provider payload could not be normalized.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The caller explicitly asked for an output format the service cannot render.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}
