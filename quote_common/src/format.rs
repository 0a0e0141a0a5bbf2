//! Output formats a quote can be rendered to.
//!
//! The server picks a format from the request path extension (`/index.xml`) first and
//! from the `Accept` header second, defaulting to JSON. An explicit extension the
//! service cannot render is an error so the HTTP layer can answer 400.
//!
//! Accept negotiation is a simple substring check in a fixed priority order, not a
//! full RFC 7231 q-value parser.
use std::str::FromStr;

use clap::ValueEnum;
use strum_macros::{Display, EnumString};

use crate::error::QuoteError;
use crate::quote::Quote;
use crate::result::Result;

/// Supported representations of a `Quote`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[clap(rename_all = "lower")]
pub enum OutputFormat {
    #[default]
    /// `application/json`
    Json,
    /// `application/xml`
    Xml,
    /// `text/html`
    Html,
    /// `text/plain`
    Text,
}

impl OutputFormat {
    /// Format requested through the last path segment's extension.
    ///
    /// `Ok(None)` when the path carries no extension, or an empty one (`/index.`).
    /// Extensions match case-insensitively.
    pub fn from_extension(path: &str) -> Result<Option<Self>> {
        let segment = path.rsplit('/').next().unwrap_or(path);
        match segment.rsplit_once('.') {
            None | Some((_, "")) => Ok(None),
            Some((_, ext)) => <OutputFormat as FromStr>::from_str(ext)
                .map(Some)
                .map_err(|_| QuoteError::UnsupportedFormat(ext.to_string())),
        }
    }

    /// Format preferred by an `Accept` header value.
    pub fn from_accept(accept: Option<&str>) -> Self {
        match accept {
            Some(value) if value.contains("text/html") => OutputFormat::Html,
            Some(value) if value.contains("application/xml") => OutputFormat::Xml,
            Some(value) if value.contains("text/plain") => OutputFormat::Text,
            _ => OutputFormat::Json,
        }
    }

    /// Resolve the format for a request: extension first, then `Accept`.
    pub fn negotiate(path: &str, accept: Option<&str>) -> Result<Self> {
        Ok(Self::from_extension(path)?.unwrap_or_else(|| Self::from_accept(accept)))
    }

    /// MIME type sent in `Content-Type`.
    pub fn content_type(self) -> &'static str {
        match self {
            OutputFormat::Json => "application/json",
            OutputFormat::Xml => "application/xml",
            OutputFormat::Html => "text/html; charset=utf-8",
            OutputFormat::Text => "text/plain; charset=utf-8",
        }
    }

    /// Render `quote` in this format.
    pub fn render(self, quote: &Quote) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(quote)?),
            OutputFormat::Xml => Ok(render_xml(quote)),
            OutputFormat::Html => Ok(render_html(quote)),
            OutputFormat::Text => Ok(render_text(quote)),
        }
    }
}

fn render_xml(quote: &Quote) -> String {
    let tags: String = quote
        .tags
        .iter()
        .map(|tag| format!("<item>{}</item>", escape_markup(tag)))
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" ?><response><author>{}</author><text>{}</text><tags>{}</tags><source>{}</source></response>",
        escape_markup(&quote.author),
        escape_markup(&quote.text),
        tags,
        escape_markup(&quote.source),
    )
}

fn render_html(quote: &Quote) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 500px; margin: 20px auto; padding: 15px; border: 1px solid #e1e8ed; border-radius: 12px; background-color: #ffffff;">
    <p style="font-size: 18px; line-height: 1.4; margin-bottom: 10px;">&quot;{}&quot;</p>
    <p style="color: #657786; font-size: 15px; margin: 0;">&mdash; {}</p>
</div>
"#,
        escape_markup(&quote.text),
        escape_markup(&quote.author),
    )
}

/// `"text" - author [tag, tag] (source)`; the brackets are omitted without tags.
fn render_text(quote: &Quote) -> String {
    let mut out = format!("\"{}\" - {}", quote.text, quote.author);
    if !quote.tags.is_empty() {
        out.push_str(&format!(" [{}]", quote.tags.join(", ")));
    }
    out.push_str(&format!(" ({})", quote.source));
    out
}

/// Escape the five XML/HTML special characters.
fn escape_markup(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
