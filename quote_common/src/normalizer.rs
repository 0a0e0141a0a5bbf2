//! Mapping of provider payloads into `Quote`s.
//!
//! Each known provider is a variant of `ProviderKind` and carries its own extraction
//! rule; the set is closed, so adding a provider means adding a variant and the compiler
//! points at every match that needs a new arm. Provider names arrive as strings from the
//! registry and are parsed into a kind with `FromStr`; a name without a variant becomes
//! `ParseError::UnknownProvider`.
//!
//! After mapping, `validate` rejects content that is clearly not a quote. Some providers
//! answer a rate-limited request with HTTP 200 and their error message in the quote
//! field, so texts containing a known rate-limit marker are refused.
use std::str::FromStr;

use serde_json::Value;
use strum_macros::{Display, EnumIter, EnumString};

use crate::error::ParseError;
use crate::quote::Quote;

/// JSON object returned by a provider, after envelope unwrapping.
pub type RawPayload = serde_json::Map<String, Value>;

/// Lowercased fragments of upstream rate-limit messages.
const RATE_LIMIT_MARKERS: &[&str] = &[
    "too many requests",
    "rate limit exceeded",
    "obtain an auth key",
];

/// Providers with a known payload layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum ProviderKind {
    /// `{"content": .., "author": .., "tags": [..], ..}`
    Quotable,
    /// `{"q": .., "a": .., "h": ..}`; no tags.
    Zenquotes,
}

impl ProviderKind {
    /// Resolve a registry name into a kind.
    pub fn from_name(name: &str) -> Result<Self, ParseError> {
        ProviderKind::from_str(name).map_err(|_| ParseError::UnknownProvider(name.to_string()))
    }

    /// Apply this provider's extraction rule.
    pub fn extract(self, payload: &RawPayload) -> Result<Quote, ParseError> {
        let provider = self.to_string();
        match self {
            ProviderKind::Quotable => Ok(Quote::new(
                string_field(&provider, payload, "author")?,
                string_field(&provider, payload, "content")?,
                string_list_field(&provider, payload, "tags")?,
                provider,
            )),
            ProviderKind::Zenquotes => Ok(Quote::new(
                string_field(&provider, payload, "a")?,
                string_field(&provider, payload, "q")?,
                Vec::new(),
                provider,
            )),
        }
    }
}

/// Turn a provider payload into a validated `Quote`.
pub fn normalize(provider_name: &str, payload: &RawPayload) -> Result<Quote, ParseError> {
    let quote = ProviderKind::from_name(provider_name)?.extract(payload)?;
    validate(&quote)?;
    Ok(quote)
}

/// Reject quotes whose text is empty or looks like an upstream error message.
pub fn validate(quote: &Quote) -> Result<(), ParseError> {
    if quote.text.trim().is_empty() {
        return Err(invalid(&quote.source, "empty quote text".to_string()));
    }
    let lowered = quote.text.to_ascii_lowercase();
    if let Some(marker) = RATE_LIMIT_MARKERS.iter().find(|m| lowered.contains(*m)) {
        return Err(invalid(
            &quote.source,
            format!("rate-limit message in quote text ({marker})"),
        ));
    }
    Ok(())
}

fn invalid(provider: &str, reason: String) -> ParseError {
    ParseError::InvalidContent {
        provider: provider.to_string(),
        reason,
    }
}

fn field<'a>(
    provider: &str,
    payload: &'a RawPayload,
    name: &'static str,
) -> Result<&'a Value, ParseError> {
    payload.get(name).ok_or_else(|| ParseError::MissingField {
        provider: provider.to_string(),
        field: name,
    })
}

fn string_field(
    provider: &str,
    payload: &RawPayload,
    name: &'static str,
) -> Result<String, ParseError> {
    field(provider, payload, name)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid(provider, format!("field `{name}` is not a string")))
}

fn string_list_field(
    provider: &str,
    payload: &RawPayload,
    name: &'static str,
) -> Result<Vec<String>, ParseError> {
    let items = field(provider, payload, name)?
        .as_array()
        .ok_or_else(|| invalid(provider, format!("field `{name}` is not an array")))?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| invalid(provider, format!("field `{name}` holds a non-string")))
        })
        .collect()
}
