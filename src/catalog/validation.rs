//! Integrity checks for a plan catalog.
//!
//! All checks run and every violation is reported together, so a host
//! assembling its own catalog sees the full list of problems at once.

use super::PlanCatalog;
use std::collections::HashSet;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// A single integrity problem found in a catalog.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogViolation {
    #[error("Catalog defines no tracks")]
    NoTracks,

    #[error("Track '{0}' is defined more than once")]
    DuplicateTrack(String),

    #[error("Default track '{0}' is not defined")]
    MissingDefaultTrack(String),

    #[error("Track '{track_id}' offers no plans")]
    NoPlans { track_id: String },

    #[error("Plan '{plan_id}' is defined more than once for track '{track_id}'")]
    DuplicatePlan { track_id: String, plan_id: String },

    #[error("Track '{track_id}' marks more than one plan as recommended")]
    MultipleRecommended { track_id: String },

    #[error("Plan '{plan_id}' for track '{track_id}' has no price")]
    ZeroPrice { track_id: String, plan_id: String },
}

type CatalogValidation = Validation<(), NonEmptyVec<CatalogViolation>>;

fn check(ok: bool, violation: impl FnOnce() -> CatalogViolation) -> CatalogValidation {
    if ok {
        Validation::success(())
    } else {
        Validation::fail(violation())
    }
}

/// Run every integrity check, accumulating all violations.
pub(crate) fn validate_catalog(catalog: &PlanCatalog) -> CatalogValidation {
    let mut checks: Vec<CatalogValidation> = Vec::new();

    checks.push(check(!catalog.tracks.is_empty(), || {
        CatalogViolation::NoTracks
    }));

    checks.push(check(
        catalog.tracks.iter().any(|t| t.id == catalog.default_track),
        || CatalogViolation::MissingDefaultTrack(catalog.default_track.clone()),
    ));

    let mut seen_tracks = HashSet::new();
    for track in &catalog.tracks {
        checks.push(check(seen_tracks.insert(track.id.as_str()), || {
            CatalogViolation::DuplicateTrack(track.id.clone())
        }));

        checks.push(check(!track.plans.is_empty(), || CatalogViolation::NoPlans {
            track_id: track.id.clone(),
        }));

        let recommended = track.plans.iter().filter(|p| p.recommended).count();
        checks.push(check(recommended <= 1, || {
            CatalogViolation::MultipleRecommended {
                track_id: track.id.clone(),
            }
        }));

        let mut seen_plans = HashSet::new();
        for plan in &track.plans {
            checks.push(check(seen_plans.insert(plan.id.as_str()), || {
                CatalogViolation::DuplicatePlan {
                    track_id: track.id.clone(),
                    plan_id: plan.id.clone(),
                }
            }));

            checks.push(check(plan.price_cents > 0, || CatalogViolation::ZeroPrice {
                track_id: track.id.clone(),
                plan_id: plan.id.clone(),
            }));
        }
    }

    Validation::all_vec(checks).map(|_| ())
}
