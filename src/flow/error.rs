//! Errors returned by the funnel machine and its builder.

use super::intent::IntentKind;
use super::step::Step;
use crate::catalog::CatalogError;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Why an intent was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
    /// The intent is not legal from the current step.
    WrongStep,
    /// A charge is outstanding; only cancel is accepted.
    PaymentInFlight,
}

impl fmt::Display for Refusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongStep => f.write_str("not allowed from this step"),
            Self::PaymentInFlight => f.write_str("a payment is in flight"),
        }
    }
}

/// Errors that can occur while driving a session.
///
/// None of these leave the session partially updated; the caller should
/// re-render the current snapshot.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FlowError {
    #[error("Illegal transition '{attempted}' from step {step}: {reason}")]
    IllegalTransition {
        step: Step,
        attempted: IntentKind,
        reason: Refusal,
    },

    #[error("Session is closed, '{attempted}' rejected")]
    SessionClosed { attempted: IntentKind },

    #[error("No outstanding payment attempt {attempt_id}")]
    StaleAttempt { attempt_id: Uuid },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl FlowError {
    pub fn is_illegal_transition(&self) -> bool {
        matches!(self, Self::IllegalTransition { .. })
    }
}

/// Errors that can occur when building a machine.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    #[error("Plan catalog not specified. Call .catalog(catalog) or .builtin_catalog() before .build()")]
    MissingCatalog,

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
