use std::sync::Arc;
use std::time::Instant;

use bytes::{Bytes, BytesMut};
use reqwest::StatusCode;
use tracing::{debug, error};

use crate::chunk::{self, SourceFormat};
use crate::config::Config;
use crate::endpoint::EndpointPool;
use crate::error::{ConfigError, FlushError};
use crate::http::{collector_url, get_client};

/// Three-way classification of one delivery attempt.
#[derive(Debug)]
enum AttemptOutcome {
    Success,
    /// 4xx: caused by the request itself, retrying would not help.
    Permanent { status: StatusCode, body: String },
    /// Everything else: 5xx, unexpected 3xx, network error, timeout.
    Transient { message: String },
}

/// Classification driven by status alone. Deliberately coarse: exactly 200 is
/// success, the 4xx class is permanent, and every other status is worth
/// another attempt.
fn classify_status(status: StatusCode) -> AttemptOutcome {
    if status == StatusCode::OK {
        AttemptOutcome::Success
    } else if status.is_client_error() {
        AttemptOutcome::Permanent {
            status,
            body: String::new(),
        }
    } else {
        AttemptOutcome::Transient {
            message: status.to_string(),
        }
    }
}

async fn classify(response: Result<reqwest::Response, reqwest::Error>) -> AttemptOutcome {
    match response {
        Ok(resp) => match classify_status(resp.status()) {
            AttemptOutcome::Permanent { status, .. } => AttemptOutcome::Permanent {
                status,
                body: resp.text().await.unwrap_or_default(),
            },
            outcome => outcome,
        },
        Err(e) => AttemptOutcome::Transient {
            message: e.to_string(),
        },
    }
}

/// Delivery engine: groups a buffered chunk by source, rotates across the
/// endpoint pool, and POSTs one payload per group with bounded retry.
#[derive(Debug, Clone)]
pub struct HecFlusher {
    config: Arc<Config>,
    pool: Arc<EndpointPool>,
    client: reqwest::Client,
    source_format: SourceFormat,
}

impl HecFlusher {
    pub fn new(config: Arc<Config>) -> Result<Self, ConfigError> {
        let pool = Arc::new(EndpointPool::new(config.endpoints.clone())?);
        let client = get_client(&config);
        let source_format = SourceFormat::from_template(&config.source);
        Ok(HecFlusher {
            config,
            pool,
            client,
            source_format,
        })
    }

    /// Delivers one buffered chunk: decode, group by source, then one request
    /// per group in first-occurrence order.
    ///
    /// A permanent (4xx) failure drops its group and moves on; a group that
    /// exhausts its retry budget aborts the remaining groups with
    /// [`FlushError::Fatal`]. The host is expected to redeliver the whole
    /// chunk on fatal, which can duplicate groups that already landed.
    pub async fn flush(&self, chunk: &[u8]) -> Result<(), FlushError> {
        let groups = chunk::group(chunk, &self.source_format)?;
        for (source, lines) in groups {
            self.deliver(&source, &lines).await?;
        }
        Ok(())
    }

    async fn deliver(&self, source: &str, lines: &[Bytes]) -> Result<(), FlushError> {
        let endpoint = self.pool.next();
        let url = collector_url(endpoint);
        let body = concat_lines(lines);
        debug!("POST {url} ({} lines, source {source})", lines.len());

        let retry_max = self.config.post_retry_max;
        let mut attempts = 0;
        loop {
            attempts += 1;
            let time = Instant::now();
            let response = self
                .client
                .post(&url)
                .header(
                    reqwest::header::AUTHORIZATION,
                    format!("Splunk {}", self.config.token),
                )
                .body(body.clone())
                .send()
                .await;
            let elapsed = time.elapsed();

            match classify(response).await {
                AttemptOutcome::Success => {
                    debug!(
                        "=>({attempts}/{retry_max}) delivered {source} in {} ms",
                        elapsed.as_millis()
                    );
                    return Ok(());
                }
                AttemptOutcome::Permanent { status, body } => {
                    // The request itself is at fault; the group is dropped.
                    error!("{url}: {status}\n{body}");
                    return Ok(());
                }
                AttemptOutcome::Transient { message } => {
                    debug!("=>({attempts}/{retry_max}) {message}");
                    if attempts >= retry_max {
                        return Err(FlushError::Fatal {
                            url,
                            attempts,
                            message,
                        });
                    }
                    debug!("{url}: Retrying...");
                    tokio::time::sleep(self.config.post_retry_interval).await;
                }
            }
        }
    }
}

fn concat_lines(lines: &[Bytes]) -> Bytes {
    let mut body = BytesMut::with_capacity(lines.iter().map(Bytes::len).sum());
    for line in lines {
        body.extend_from_slice(line);
    }
    body.freeze()
}
