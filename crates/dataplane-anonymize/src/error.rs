//! Error types for dataplane-anonymize.

use thiserror::Error;

/// Reasons an anonymization attempt falls back to the original payload.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("invalid JSON format: {0}")]
    InvalidFormat(#[source] serde_json::Error),

    #[error("payload is not a building record: {0}")]
    Shape(String),

    #[error("failed to serialize building record: {0}")]
    Serialize(#[source] serde_json::Error),
}
