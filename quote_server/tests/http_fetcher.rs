mod common;

use std::time::Duration;

use common::{closed_port_url, provider, spawn_stub, spawn_stub_with_delay};
use quote_common::ProviderRegistry;
use quote_server::{FetchError, Fetcher, HttpFetcher};

fn fetch(name: &str, url: &str) -> Result<quote_common::RawPayload, FetchError> {
    let provider = provider(name, url);
    let registry = ProviderRegistry::new(vec![provider.clone()]).unwrap();
    HttpFetcher::new(&registry).unwrap().fetch(&provider)
}

#[test]
fn object_body_is_returned_as_payload() {
    let url = spawn_stub(200, r#"{"content": "hello", "author": "Bob", "tags": ["x"]}"#);
    let payload = fetch("quotable", &url).unwrap();
    assert_eq!(payload["author"], "Bob");
}

#[test]
fn list_envelope_is_unwrapped() {
    let url = spawn_stub(200, r#"[{"q": "Zen1", "a": "ZenA"}]"#);
    let payload = fetch("zenquotes", &url).unwrap();
    assert_eq!(payload["q"], "Zen1");
}

#[test]
fn non_success_status_is_reported() {
    let url = spawn_stub(429, r#"{"message": "Too many requests"}"#);
    let err = fetch("quotable", &url).unwrap_err();
    assert_eq!(
        err,
        FetchError::HttpStatus {
            provider: "quotable".into(),
            status: 429
        }
    );
}

#[test]
fn non_json_body_is_a_parse_failure() {
    let url = spawn_stub(200, "<html>maintenance</html>");
    let err = fetch("quotable", &url).unwrap_err();
    assert!(matches!(err, FetchError::ParseFailure { .. }));
}

#[test]
fn empty_list_is_an_unexpected_format() {
    let url = spawn_stub(200, "[]");
    let err = fetch("zenquotes", &url).unwrap_err();
    assert!(matches!(err, FetchError::UnexpectedFormat { .. }));
}

#[test]
fn refused_connection_is_a_transport_error() {
    let err = fetch("quotable", &closed_port_url()).unwrap_err();
    assert!(matches!(err, FetchError::Transport { .. }));
}

#[test]
fn slow_provider_times_out_as_transport_error() {
    let url = spawn_stub_with_delay(200, r#"{"q": "late"}"#, Duration::from_secs(3));
    let err = fetch("zenquotes", &url).unwrap_err();
    assert!(matches!(err, FetchError::Transport { .. }));
}

#[test]
fn provider_outside_the_registry_gets_its_own_client() {
    let url = spawn_stub(200, r#"{"q": "Zen1", "a": "ZenA"}"#);
    let fetcher = HttpFetcher::new(&ProviderRegistry::builtin()).unwrap();
    let payload = fetcher.fetch(&provider("adhoc", &url)).unwrap();
    assert_eq!(payload["a"], "ZenA");
}
