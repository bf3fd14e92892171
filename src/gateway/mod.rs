//! Payment gateway port.
//!
//! The funnel only knows the request/response contract below. A real
//! processor, or the [`SimulatedGateway`] used by demos and tests, sits
//! behind [`PaymentGateway`].

mod simulated;

pub use simulated::{SimulatedGateway, DEMO_LATENCY};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// One charge issued by a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeRequest {
    pub session_id: Uuid,
    /// Unique per attempt; completions must echo it back.
    pub attempt_id: Uuid,
    /// 1 for the first attempt, incremented on every retry.
    pub attempt: usize,
    pub track_id: String,
    pub plan_id: String,
    pub amount_cents: u32,
}

/// Resolved result of a charge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargeOutcome {
    Approved,
    Declined { reason: String },
}

impl ChargeOutcome {
    pub fn declined(reason: impl Into<String>) -> Self {
        Self::Declined {
            reason: reason.into(),
        }
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Approved)
    }

    /// Fold a transport failure into a decline; the funnel treats both alike.
    pub fn from_result(result: Result<ChargeOutcome, GatewayError>) -> Self {
        result.unwrap_or_else(|err| Self::declined(err.to_string()))
    }
}

/// Failures of the gateway itself, as opposed to a declined charge.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("gateway_unavailable: {0}")]
    Unavailable(String),

    #[error("gateway_timeout")]
    Timeout,

    #[error("gateway_rejected: {0}")]
    Rejected(String),
}

/// Broad category of a failed charge, for choosing a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    Declined,
    RateLimited,
    Other,
}

impl FailureKind {
    /// Classify a failure reason reported by the gateway.
    pub fn classify(reason: &str) -> Self {
        let reason = reason.to_ascii_lowercase();
        if reason.contains("429")
            || reason.contains("quota")
            || (reason.contains("rate") && reason.contains("limit"))
        {
            Self::RateLimited
        } else if ["card_declined", "insufficient_funds", "expired_card"]
            .iter()
            .any(|code| reason.contains(code))
        {
            Self::Declined
        } else {
            Self::Other
        }
    }
}

/// Asynchronous charge operation.
///
/// Implementations must be safe to share between sessions. The funnel
/// guarantees at most one outstanding `charge` per session.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeOutcome, GatewayError>;
}
