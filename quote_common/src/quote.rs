//! Normalized quote record.
//!
//! Every provider payload and every bundled fallback entry ends up as a `Quote`. Values
//! are immutable once built and are moved between owners (queue slot, response) rather
//! than shared.
use serde::Serialize;

/// Source tag carried by quotes from the bundled fallback table.
pub const FALLBACK_SOURCE: &str = "fallback";

/// A single inspirational quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quote {
    /// Who said it.
    pub author: String,
    /// The quote itself.
    pub text: String,
    /// Provider-supplied tags, possibly empty.
    pub tags: Vec<String>,
    /// Provider name, or `"fallback"` for bundled quotes.
    pub source: String,
}

impl Quote {
    /// Build a quote from its parts.
    pub fn new(
        author: impl Into<String>,
        text: impl Into<String>,
        tags: Vec<String>,
        source: impl Into<String>,
    ) -> Self {
        Quote {
            author: author.into(),
            text: text.into(),
            tags,
            source: source.into(),
        }
    }

    /// `true` when the quote came from the bundled fallback table.
    pub fn is_fallback(&self) -> bool {
        self.source == FALLBACK_SOURCE
    }
}
