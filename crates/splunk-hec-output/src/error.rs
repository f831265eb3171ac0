use thiserror::Error;

/// Errors raised while building a [`crate::Config`]. All of these are fatal at
/// startup; none are retried.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("No HEC token configured")]
    MissingToken,

    #[error("Endpoint list is empty")]
    EmptyEndpoints,
}

/// An event that could not be rendered or framed for buffering. The record is
/// dropped by the caller; well-formed JSON maps never produce this.
#[derive(Debug, Error)]
#[error("Failed to encode event: {0}")]
pub struct EncodeError(pub String);

/// Errors surfaced by a flush call. Both variants abort the flush; the host's
/// own retry layer is expected to redeliver the chunk.
#[derive(Debug, Error)]
pub enum FlushError {
    /// The buffered chunk could not be decoded. Not retried at this layer.
    #[error("Failed to decode buffered chunk: {0}")]
    Decode(String),

    /// A group exhausted its retry budget against `url`.
    #[error("{url}: {message}")]
    Fatal {
        url: String,
        attempts: u32,
        message: String,
    },
}
