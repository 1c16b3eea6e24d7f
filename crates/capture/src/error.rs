//! Error types for the capture pipeline.
//!
//! Neither type ever reaches page code: formatting errors degrade to the
//! placeholder token and transport errors are discarded by the selector.

/// Errors produced while delivering a record over a channel.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("channel unavailable")]
    Unavailable,

    #[error("send rejected: {0}")]
    Rejected(String),

    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors produced while serializing a structured argument.
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("cyclic structure")]
    Cycle,

    #[error("unsupported value: {0}")]
    Unsupported(String),

    #[error("JSON encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}
