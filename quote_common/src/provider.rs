//! Upstream quote providers and the registry that holds them.
//!
//! A `Provider` is read-only configuration: where to fetch, whether to verify TLS, and
//! how long a single request may take. The `ProviderRegistry` is built once at startup,
//! either from the built-in list or from a JSON file, and is shared behind an `Arc`
//! afterwards without any synchronization.
//!
//! JSON file format:
//! ```json
//! [
//!   {"name": "quotable", "url": "https://api.quotable.io/quotes/random", "verify_tls": false},
//!   {"name": "zenquotes", "url": "https://zenquotes.io/api/random", "timeout_secs": 5}
//! ]
//! ```
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::Duration;

use rand::Rng;
use serde::Deserialize;

use crate::error::QuoteError;
use crate::result::Result;

/// Request timeout used when a provider does not specify one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration of one upstream quote source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provider {
    /// Unique key; also selects the normalizer's extraction rule.
    pub name: String,
    /// Endpoint returning one random quote per GET.
    pub url: String,
    /// Whether the TLS certificate of `url` is verified.
    pub verify_tls: bool,
    /// Total time budget of one request.
    pub timeout: Duration,
}

impl Provider {
    /// Create a provider with TLS verification on and the default timeout.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Provider {
            name: name.into(),
            url: url.into(),
            verify_tls: true,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Override TLS verification.
    pub fn with_verify_tls(mut self, verify_tls: bool) -> Self {
        self.verify_tls = verify_tls;
        self
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// On-disk shape of a provider entry.
#[derive(Debug, Deserialize)]
struct ProviderEntry {
    name: String,
    url: String,
    #[serde(default = "default_verify_tls")]
    verify_tls: bool,
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
}

fn default_verify_tls() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl From<ProviderEntry> for Provider {
    fn from(entry: ProviderEntry) -> Self {
        Provider::new(entry.name, entry.url)
            .with_verify_tls(entry.verify_tls)
            .with_timeout(Duration::from_secs(entry.timeout_secs))
    }
}

/// Non-empty, name-unique list of providers.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    providers: Vec<Provider>,
}

impl ProviderRegistry {
    /// Validate and wrap a list of providers.
    ///
    /// Fails if the list is empty, a name is blank, a name appears twice, or a timeout
    /// is zero.
    pub fn new(providers: Vec<Provider>) -> Result<Self> {
        if providers.is_empty() {
            return Err(QuoteError::Config("provider registry is empty".into()));
        }
        let mut seen = HashSet::new();
        for provider in &providers {
            if provider.name.trim().is_empty() {
                return Err(QuoteError::Config("provider name must not be blank".into()));
            }
            if !seen.insert(provider.name.as_str()) {
                return Err(QuoteError::Config(format!(
                    "duplicate provider name: {}",
                    provider.name
                )));
            }
            if provider.timeout.is_zero() {
                return Err(QuoteError::Config(format!(
                    "provider {} has a zero timeout",
                    provider.name
                )));
            }
        }
        Ok(Self { providers })
    }

    /// The providers the service ships with.
    pub fn builtin() -> Self {
        Self {
            providers: vec![
                Provider::new("quotable", "https://api.quotable.io/quotes/random")
                    .with_verify_tls(false),
                Provider::new("zenquotes", "https://zenquotes.io/api/random"),
            ],
        }
    }

    /// Parse a JSON array of provider entries.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let entries: Vec<ProviderEntry> = serde_json::from_reader(reader)?;
        Self::new(entries.into_iter().map(Provider::from).collect())
    }

    /// Load a JSON registry file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_json_reader(BufReader::new(file))
    }

    /// Iterate providers in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Provider> {
        self.providers.iter()
    }

    /// Number of providers, always at least one.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Provider names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name.as_str()).collect()
    }

    /// Look a provider up by name.
    pub fn get(&self, name: &str) -> Option<&Provider> {
        self.providers.iter().find(|p| p.name == name)
    }

    /// Pick one provider uniformly at random.
    pub fn choose_random(&self) -> &Provider {
        let index = rand::rng().random_range(0..self.providers.len());
        &self.providers[index]
    }
}
