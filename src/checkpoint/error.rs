//! Checkpoint error types.

use thiserror::Error;

/// Errors that can occur while capturing or restoring a session.
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    #[error("Unsupported checkpoint version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// A charge is outstanding; its outcome cannot be carried over.
    #[error("Cannot checkpoint session {0} while a payment is in flight")]
    PaymentInFlight(uuid::Uuid),

    #[error("Checkpoint validation failed: {0}")]
    ValidationFailed(String),
}
