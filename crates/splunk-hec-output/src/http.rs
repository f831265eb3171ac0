use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use tracing::error;

use crate::config::Config;

const USER_AGENT: &str = concat!("splunk-hec-forwarder/", env!("CARGO_PKG_VERSION"));

/// Creates the shared HTTP client used for every collector request.
///
/// The client carries the collector's fixed headers and the configured request
/// timeout, and reuses pooled connections across flushes. When TLS
/// verification is disabled, peer certificates are not validated; that mode is
/// insecure and exists for indexers with self-signed certificates.
///
/// If the builder fails, logs an error and falls back to a default client so
/// delivery can still proceed with reqwest's defaults.
#[must_use]
pub fn get_client(config: &Config) -> reqwest::Client {
    match build_client(config) {
        Ok(client) => client,
        Err(e) => {
            error!(
                "Unable to build HTTP client: {}, falling back to reqwest defaults",
                e
            );
            reqwest::Client::new()
        }
    }
}

fn build_client(config: &Config) -> Result<reqwest::Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    // Redirects are not followed; a 3xx reaches the flusher's classification
    let mut builder = reqwest::Client::builder()
        .default_headers(headers)
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::none())
        .timeout(config.request_timeout);

    if !config.verify_tls {
        builder = builder.danger_accept_invalid_certs(true);
    }

    builder.build()
}

/// Builds the collector URL for an endpoint address. Bare `host:port`
/// addresses get the `https://` scheme; an address that already carries a
/// scheme is used as the prefix verbatim, primarily for integration tests
/// against plain-HTTP mock servers.
pub fn collector_url(endpoint: &str) -> String {
    if endpoint.contains("://") {
        format!("{endpoint}/services/collectors")
    } else {
        format!("https://{endpoint}/services/collectors")
    }
}
