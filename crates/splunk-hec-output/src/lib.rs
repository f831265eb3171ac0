//! Buffered output engine for Splunk's HTTP Event Collector.
//!
//! The library covers the delivery half of a log-forwarding pipeline: a host
//! buffers formatted events, then hands the accumulated chunk to
//! [`flusher::HecFlusher::flush`], which groups the events by their resolved
//! source, rotates across the configured indexer pool, and POSTs one payload
//! per group with bounded retry on transient failures.
//!
//! Pipeline:
//! - [`encoder`]: one `(tag, time, record)` becomes a wire-ready line framed
//!   for buffering.
//! - [`chunk`]: an accumulated buffer is decoded and grouped by source.
//! - [`endpoint`]: round-robin rotation over the static indexer pool.
//! - [`flusher`]: request build, response classification, retry.
//!
//! Permanent (4xx) failures are logged and dropped; transient failures that
//! exhaust the retry budget surface as [`error::FlushError::Fatal`], which the
//! host is expected to answer by redelivering the whole chunk. Redelivery can
//! duplicate groups that already landed — a known limitation of at-least-once
//! chunked delivery.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod chunk;
pub mod config;
pub mod encoder;
pub mod endpoint;
pub mod error;
pub mod flusher;
pub mod http;

pub use config::Config;
pub use encoder::{EventEncoder, TimestampFormat};
pub use endpoint::EndpointPool;
pub use error::{ConfigError, EncodeError, FlushError};
pub use flusher::HecFlusher;
