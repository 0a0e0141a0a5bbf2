//! Fetch client: one HTTP GET against one provider.
//!
//! `Fetcher` is the seam shared by the worker pool and the resolver. The production
//! implementation, `HttpFetcher`, keeps one blocking `reqwest` client per provider so
//! that TLS verification and the request timeout follow the provider's configuration.
//!
//! Envelope handling: providers answer either with a bare object or with a list whose
//! first element is the quote object. Both are unwrapped to the object; any other
//! shape is `FetchError::UnexpectedFormat`.
//!
//! There are no retries here; callers decide whether and when to try again.
//!
//! Note: `reqwest::blocking` clients must not be created or dropped inside an async
//! context. `HttpFetcher` is built in `main` before the tokio runtime starts, and only
//! used from worker threads and `spawn_blocking` tasks.
use std::collections::HashMap;

use log::debug;
use quote_common::{Provider, ProviderRegistry, Quote, RawPayload, normalize};
use reqwest::blocking::Client;
use serde_json::Value;

use crate::error::{AcquireError, FetchError};
use crate::result::Result;

const USER_AGENT: &str = concat!("quote_server/", env!("CARGO_PKG_VERSION"));

/// Source of raw provider payloads.
pub trait Fetcher: Send + Sync {
    /// Issue one request to `provider` and return its quote object.
    fn fetch(&self, provider: &Provider) -> Result<RawPayload, FetchError>;
}

/// `Fetcher` backed by blocking `reqwest` clients.
pub struct HttpFetcher {
    clients: HashMap<String, Client>,
}

impl HttpFetcher {
    /// Build one client per registered provider.
    pub fn new(registry: &ProviderRegistry) -> Result<Self> {
        let mut clients = HashMap::with_capacity(registry.len());
        for provider in registry.iter() {
            clients.insert(provider.name.clone(), build_client(provider)?);
        }
        Ok(Self { clients })
    }
}

fn build_client(provider: &Provider) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(provider.timeout)
        .danger_accept_invalid_certs(!provider.verify_tls)
        .user_agent(USER_AGENT)
        .build()
}

fn transport(provider: &Provider, err: reqwest::Error) -> FetchError {
    FetchError::Transport {
        provider: provider.name.clone(),
        message: err.to_string(),
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, provider: &Provider) -> Result<RawPayload, FetchError> {
        debug!("Fetching data from: {}", provider.url);

        let on_demand;
        let client = match self.clients.get(&provider.name) {
            Some(client) => client,
            None => {
                on_demand = build_client(provider).map_err(|e| transport(provider, e))?;
                &on_demand
            }
        };

        let response = client
            .get(&provider.url)
            .send()
            .map_err(|e| transport(provider, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                provider: provider.name.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.text().map_err(|e| transport(provider, e))?;
        let payload = payload_from_body(&provider.name, &body)?;
        debug!("Successfully fetched data from {}", provider.url);
        Ok(payload)
    }
}

/// Fetch one payload from `provider` and normalize it into a `Quote`.
pub fn fetch_quote(fetcher: &dyn Fetcher, provider: &Provider) -> Result<Quote, AcquireError> {
    let payload = fetcher.fetch(provider)?;
    Ok(normalize(&provider.name, &payload)?)
}

/// Parse a response body and unwrap the provider's envelope.
pub fn payload_from_body(provider: &str, body: &str) -> Result<RawPayload, FetchError> {
    let value: Value = serde_json::from_str(body).map_err(|e| FetchError::ParseFailure {
        provider: provider.to_string(),
        message: e.to_string(),
    })?;

    match value {
        Value::Object(map) => Ok(map),
        Value::Array(items) => match items.into_iter().next() {
            Some(Value::Object(map)) => Ok(map),
            _ => Err(FetchError::UnexpectedFormat {
                provider: provider.to_string(),
            }),
        },
        _ => Err(FetchError::UnexpectedFormat {
            provider: provider.to_string(),
        }),
    }
}
