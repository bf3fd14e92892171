//! Catalog lookup and integrity errors.

use super::validation::CatalogViolation;
use thiserror::Error;

/// Errors raised by strict catalog lookups and catalog construction.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    #[error("Unknown track '{0}'")]
    UnknownTrack(String),

    #[error("Unknown plan '{plan_id}' for track '{track_id}'")]
    UnknownPlan { track_id: String, plan_id: String },

    #[error("Catalog failed validation with {} violation(s)", .0.len())]
    Invalid(Vec<CatalogViolation>),
}
