//! Relay error definitions.

use thiserror::Error;

/// Failures that abort a relay attempt.
///
/// A destination answering with a non-success status is not an error; see
/// [`DispatchOutcome`](crate::relay::dispatch::DispatchOutcome).
#[derive(Debug, Error)]
pub enum RelayError {
    /// The inbound body could not be read.
    #[error("{0}")]
    BodyRead(String),

    /// Payload or body could not be serialized.
    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Webhook URL did not parse.
    #[error("Invalid webhook URL: {0}")]
    InvalidWebhookUrl(#[from] url::ParseError),

    /// Outbound request could not be built or sent.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

/// Result type for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;
