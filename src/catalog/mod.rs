//! Tracks and the billing plans offered for each.
//!
//! Lookups come in two flavours. Strict lookups (`track`, `plans_for`,
//! `plan`) fail with [`CatalogError`] because they gate pricing.
//! [`PlanCatalog::resolve_track`] is permissive and falls back to the
//! default track, since a track id from a URL is only advisory.
//!
//! # Example
//!
//! ```rust
//! use enrollment_funnel::catalog::{CatalogError, PlanCatalog};
//!
//! let catalog = PlanCatalog::builtin();
//!
//! let plans = catalog.plans_for("swe").unwrap();
//! assert_eq!(plans[0].id, "monthly");
//! assert_eq!(catalog.plan("swe", "yearly").unwrap().price_cents, 29_900);
//!
//! assert!(matches!(
//!     catalog.plans_for("nonexistent"),
//!     Err(CatalogError::UnknownTrack(_))
//! ));
//! assert_eq!(catalog.resolve_track(Some("nonexistent")).id, "ai");
//! ```

mod builtin;
mod error;
mod validation;

pub use builtin::{DEFAULT_TRACK, MONTHLY, YEARLY};
pub use error::CatalogError;
pub use validation::CatalogViolation;

use serde::{Deserialize, Serialize};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// How often a plan bills.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingPeriod {
    Monthly,
    Yearly,
}

impl BillingPeriod {
    /// Suffix shown next to a price, e.g. "/ Month".
    pub fn label(self) -> &'static str {
        match self {
            Self::Monthly => "Month",
            Self::Yearly => "Year",
        }
    }
}

/// A billing option for a track.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub name: String,
    /// Price in cents, always non-zero in a validated catalog.
    pub price_cents: u32,
    pub period: BillingPeriod,
    pub features: Vec<String>,
    /// The plan pre-selected when the entry parameters name none.
    pub recommended: bool,
}

impl Plan {
    /// Price formatted in dollars, e.g. `$299.00`.
    pub fn display_price(&self) -> String {
        format!("${}.{:02}", self.price_cents / 100, self.price_cents % 100)
    }
}

/// A curriculum a user can enroll into.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    /// Hex colour used by presenters.
    pub accent: String,
    pub icon: String,
    /// Course opened once the track is unlocked.
    pub course_id: String,
    pub plans: Vec<Plan>,
}

impl Track {
    pub fn plan(&self, plan_id: &str) -> Option<&Plan> {
        self.plans.iter().find(|p| p.id == plan_id)
    }

    /// The recommended plan, or the first one when none is marked.
    pub fn default_plan(&self) -> Option<&Plan> {
        self.plans
            .iter()
            .find(|p| p.recommended)
            .or_else(|| self.plans.first())
    }
}

/// Immutable, validated lookup of tracks and their plans.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanCatalog {
    tracks: Vec<Track>,
    default_track: String,
    default_index: usize,
}

impl PlanCatalog {
    /// Build a catalog, rejecting it if any integrity check fails.
    pub fn new(tracks: Vec<Track>, default_track: impl Into<String>) -> Result<Self, CatalogError> {
        let mut catalog = Self {
            tracks,
            default_track: default_track.into(),
            default_index: 0,
        };

        if let Validation::Failure(violations) = catalog.validate() {
            return Err(CatalogError::Invalid(violations.iter().cloned().collect()));
        }

        catalog.default_index = catalog
            .tracks
            .iter()
            .position(|t| t.id == catalog.default_track)
            .ok_or_else(|| CatalogError::UnknownTrack(catalog.default_track.clone()))?;

        Ok(catalog)
    }

    /// Run every integrity check and return all violations found.
    pub fn validate(&self) -> Validation<(), NonEmptyVec<CatalogViolation>> {
        validation::validate_catalog(self)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track_ids(&self) -> impl Iterator<Item = &str> {
        self.tracks.iter().map(|t| t.id.as_str())
    }

    pub fn default_track(&self) -> &Track {
        &self.tracks[self.default_index]
    }

    /// Strict track lookup.
    pub fn track(&self, track_id: &str) -> Result<&Track, CatalogError> {
        self.tracks
            .iter()
            .find(|t| t.id == track_id)
            .ok_or_else(|| CatalogError::UnknownTrack(track_id.to_string()))
    }

    /// Plans offered for a track, in display order. Never empty.
    pub fn plans_for(&self, track_id: &str) -> Result<&[Plan], CatalogError> {
        self.track(track_id).map(|t| t.plans.as_slice())
    }

    /// Strict plan lookup within a track.
    pub fn plan(&self, track_id: &str, plan_id: &str) -> Result<&Plan, CatalogError> {
        self.track(track_id)?
            .plan(plan_id)
            .ok_or_else(|| CatalogError::UnknownPlan {
                track_id: track_id.to_string(),
                plan_id: plan_id.to_string(),
            })
    }

    pub fn default_plan(&self, track_id: &str) -> Result<&Plan, CatalogError> {
        let track = self.track(track_id)?;
        track
            .default_plan()
            .ok_or_else(|| CatalogError::UnknownTrack(track_id.to_string()))
    }

    /// Permissive lookup: unknown or missing ids yield the default track.
    pub fn resolve_track(&self, track_id: Option<&str>) -> &Track {
        track_id
            .and_then(|id| self.tracks.iter().find(|t| t.id == id))
            .unwrap_or_else(|| self.default_track())
    }
}

impl Default for PlanCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
