#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use std::{
    env,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::Mutex as TokioMutex,
    time::{interval, Duration},
};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use splunk_hec_output::{Config, EventEncoder, FlushError, HecFlusher};

const DEFAULT_FLUSH_INTERVAL_SECS: u64 = 5;
const DEFAULT_TAG: &str = "stdin";

#[tokio::main]
pub async fn main() {
    let log_level = env::var("SPLUNK_HEC_LOG_LEVEL")
        .map(|val| val.to_lowercase())
        .unwrap_or("info".to_string());

    let env_filter = format!("h2=off,hyper=off,rustls=off,{}", log_level);

    #[allow(clippy::expect_used)]
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_new(env_filter).expect("could not parse log level in configuration"),
        )
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .finish();
    #[allow(clippy::expect_used)]
    tracing::subscriber::set_global_default(subscriber).expect("failed to install subscriber");

    let config = match Config::from_env() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            error!("{e}. Shutting down forwarder.");
            return;
        }
    };
    let flusher = match HecFlusher::new(Arc::clone(&config)) {
        Ok(flusher) => flusher,
        Err(e) => {
            error!("{e}. Shutting down forwarder.");
            return;
        }
    };

    let flush_interval_secs = env::var("SPLUNK_HEC_FLUSH_INTERVAL")
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
        .unwrap_or(DEFAULT_FLUSH_INTERVAL_SECS);
    let tag = env::var("SPLUNK_HEC_TAG").unwrap_or_else(|_| DEFAULT_TAG.to_string());

    info!(
        "Starting Splunk HEC forwarder ({} endpoint(s), flushing every {flush_interval_secs}s)",
        config.endpoints.len()
    );

    let buffer = Arc::new(TokioMutex::new(Vec::<u8>::new()));
    let encoder = EventEncoder::default();

    let reader_buffer = Arc::clone(&buffer);
    let mut reader = tokio::spawn(async move {
        let stdin = BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if line.is_empty() {
                continue;
            }
            // Non-JSON lines are wrapped so nothing on stdin is lost
            let record = serde_json::from_str(&line)
                .unwrap_or_else(|_| serde_json::json!({ "message": line }));
            let timestamp = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0);
            match encoder.encode(&tag, timestamp, &record) {
                Ok(entry) => reader_buffer.lock().await.extend(entry),
                Err(e) => error!("Dropping unencodable record: {e}"),
            }
        }
    });

    // A chunk whose flush failed fatally is retained and retried next tick
    let mut pending: Option<Vec<u8>> = None;
    let mut ticker = interval(Duration::from_secs(flush_interval_secs));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                pending = flush_cycle(&flusher, &buffer, pending.take()).await;
            }
            _ = &mut reader => {
                pending = flush_cycle(&flusher, &buffer, pending.take()).await;
                if pending.is_some() {
                    error!("Exiting with undelivered events after stdin closed");
                }
                break;
            }
        }
    }
}

/// One flush cycle: redeliver a previously failed chunk first, then the
/// freshly buffered one. Returns the chunk to retry next cycle, if any.
async fn flush_cycle(
    flusher: &HecFlusher,
    buffer: &TokioMutex<Vec<u8>>,
    failed: Option<Vec<u8>>,
) -> Option<Vec<u8>> {
    if let Some(chunk) = failed {
        debug!("Retrying previously failed chunk ({} bytes)", chunk.len());
        if let Err(e) = flusher.flush(&chunk).await {
            // Still failing; keep it and leave new data buffered for now
            error!("Flush failed, will retry: {e}");
            return Some(chunk);
        }
    }

    let chunk = {
        let mut guard = buffer.lock().await;
        std::mem::take(&mut *guard)
    };
    if chunk.is_empty() {
        return None;
    }
    debug!("Flushing {} buffered bytes", chunk.len());
    match flusher.flush(&chunk).await {
        Ok(()) => None,
        Err(e @ FlushError::Decode(_)) => {
            // A corrupt chunk will never decode; retrying cannot help
            error!("Dropping undecodable chunk: {e}");
            None
        }
        Err(e) => {
            error!("Flush failed, will retry: {e}");
            Some(chunk)
        }
    }
}
