use std::env;
use std::time::Duration;

use crate::error::ConfigError;

const DEFAULT_SERVER: &str = "localhost:8088";
const DEFAULT_SOURCE_TEMPLATE: &str = "{TAG}";
const DEFAULT_SOURCETYPE: &str = "_json";
const DEFAULT_POST_RETRY_MAX: u32 = 5;
const DEFAULT_POST_RETRY_INTERVAL_SECS: u64 = 5;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Immutable delivery configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Indexer addresses the pool rotates over. Never empty.
    pub endpoints: Vec<String>,
    /// HEC authentication token, sent as `Authorization: Splunk {token}`.
    pub token: String,
    /// When false, peer certificate validation is disabled. Insecure; intended
    /// for indexers with self-signed certificates.
    pub verify_tls: bool,
    pub host: Option<String>,
    pub index: Option<String>,
    /// Source template. `{TAG}` resolves to the event tag.
    pub source: String,
    pub sourcetype: String,
    /// Attempts per group before a transient failure escalates to fatal.
    pub post_retry_max: u32,
    /// Fixed backoff between attempts.
    pub post_retry_interval: Duration,
    /// Per-request transport timeout. Expiry classifies as transient.
    pub request_timeout: Duration,
}

impl Config {
    /// Builds a config from `SPLUNK_HEC_*` environment variables.
    pub fn from_env() -> Result<Config, ConfigError> {
        let server =
            env::var("SPLUNK_HEC_SERVER").unwrap_or_else(|_| DEFAULT_SERVER.to_string());
        let token = env::var("SPLUNK_HEC_TOKEN").map_err(|_| ConfigError::MissingToken)?;

        let verify_tls = env::var("SPLUNK_HEC_VERIFY")
            .map(|val| val.to_lowercase() != "false")
            .unwrap_or(true);

        let post_retry_max = env::var("SPLUNK_HEC_POST_RETRY_MAX")
            .ok()
            .and_then(|val| val.parse::<u32>().ok())
            .unwrap_or(DEFAULT_POST_RETRY_MAX);
        if post_retry_max == 0 {
            return Err(ConfigError::Invalid(
                "SPLUNK_HEC_POST_RETRY_MAX must be >= 1".to_string(),
            ));
        }

        let post_retry_interval_secs = env::var("SPLUNK_HEC_POST_RETRY_INTERVAL")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(DEFAULT_POST_RETRY_INTERVAL_SECS);

        Ok(Config {
            endpoints: parse_server_list(&server)?,
            token,
            verify_tls,
            host: env::var("SPLUNK_HEC_HOST").ok(),
            index: env::var("SPLUNK_HEC_INDEX").ok(),
            source: env::var("SPLUNK_HEC_SOURCE")
                .unwrap_or_else(|_| DEFAULT_SOURCE_TEMPLATE.to_string()),
            sourcetype: env::var("SPLUNK_HEC_SOURCETYPE")
                .unwrap_or_else(|_| DEFAULT_SOURCETYPE.to_string()),
            post_retry_max,
            post_retry_interval: Duration::from_secs(post_retry_interval_secs),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        })
    }
}

/// Splits a single address or comma-separated list into endpoint addresses.
/// Elements are trimmed; an empty element (or an empty list) is rejected.
pub fn parse_server_list(server: &str) -> Result<Vec<String>, ConfigError> {
    let endpoints = server
        .split(',')
        .map(|s| s.trim().to_string())
        .collect::<Vec<String>>();
    if endpoints.is_empty() || endpoints.iter().any(String::is_empty) {
        return Err(ConfigError::EmptyEndpoints);
    }
    Ok(endpoints)
}
