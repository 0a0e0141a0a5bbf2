//!
//! Common types and utilities shared by the quote server and client.
//!
//! This crate aggregates:
//! - `error` — `ParseError` for payload normalization and the unified `QuoteError`.
//! - `result` — handy `Result<T, QuoteError>` alias.
//! - `quote` — the normalized `Quote` record.
//! - `provider` — upstream provider configuration and the startup registry.
//! - `normalizer` — per-provider payload mapping and content validation.
//! - `fallback` — quotes bundled with the binary for when every upstream fails.
//! - `format` — output format negotiation and rendering.
#![warn(missing_docs)]
pub mod error;
pub mod fallback;
pub mod format;
pub mod normalizer;
pub mod provider;
pub mod quote;
pub mod result;

pub use error::{ParseError, QuoteError};
pub use fallback::FallbackQuotes;
pub use format::OutputFormat;
pub use normalizer::{ProviderKind, RawPayload, normalize};
pub use provider::{Provider, ProviderRegistry};
pub use quote::Quote;
pub use result::Result;
