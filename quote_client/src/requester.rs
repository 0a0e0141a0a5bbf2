//! Requesting quotes from the quote server over HTTP.
//!
//! The format is requested through the path extension (`/index.<format>`), which the
//! server honours before the `Accept` header; `Accept` is sent as well for proxies that
//! cache on it.
use std::time::Duration;

use log::debug;
use quote_common::OutputFormat;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;

use crate::error::ClientError;

/// Per-request timeout. A server with an empty queue may fetch upstream first.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking HTTP client bound to one server and one format.
pub struct QuoteRequester {
    client: Client,
    url: String,
    format: OutputFormat,
}

impl QuoteRequester {
    /// Build a requester for `server_url` asking for `format`.
    pub fn new(server_url: &str, format: OutputFormat) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            url: quote_url(server_url, format),
            format,
        })
    }

    /// URL every request is sent to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Request one quote and return the response body.
    pub fn request(&self) -> Result<String, ClientError> {
        debug!("GET {}", self.url);
        let response = self
            .client
            .get(&self.url)
            .header(ACCEPT, self.format.content_type())
            .send()?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

fn quote_url(server_url: &str, format: OutputFormat) -> String {
    format!("{}/index.{}", server_url.trim().trim_end_matches('/'), format)
}
