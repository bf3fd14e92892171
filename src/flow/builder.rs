//! Construction of funnel sessions.

use super::error::BuildError;
use super::machine::FlowMachine;
use crate::catalog::PlanCatalog;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Track and plan requested when the user entered the funnel, typically
/// taken from the route and query string. Both are advisory.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryParams {
    #[serde(default, alias = "trackId")]
    pub track_id: Option<String>,
    #[serde(default, alias = "plan")]
    pub plan_id: Option<String>,
}

impl EntryParams {
    pub fn new(track_id: impl Into<String>) -> Self {
        Self {
            track_id: Some(track_id.into()),
            plan_id: None,
        }
    }

    pub fn with_plan(mut self, plan_id: impl Into<String>) -> Self {
        self.plan_id = Some(plan_id.into());
        self
    }
}

/// Fluent builder for [`FlowMachine`].
///
/// # Example
///
/// ```rust
/// use enrollment_funnel::flow::{FlowBuilder, Step};
///
/// let machine = FlowBuilder::new()
///     .builtin_catalog()
///     .track("swe")
///     .plan("monthly")
///     .build()
///     .unwrap();
///
/// let snapshot = machine.snapshot();
/// assert_eq!(snapshot.step, Step::ConfirmTrack);
/// assert_eq!(snapshot.track_id, "swe");
/// assert_eq!(snapshot.selected_plan_id, "monthly");
/// ```
#[derive(Debug, Default)]
pub struct FlowBuilder {
    catalog: Option<Arc<PlanCatalog>>,
    entry: EntryParams,
}

impl FlowBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog the session prices against (required).
    pub fn catalog(mut self, catalog: Arc<PlanCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Use [`PlanCatalog::builtin`].
    pub fn builtin_catalog(self) -> Self {
        self.catalog(Arc::new(PlanCatalog::builtin()))
    }

    /// Replace both entry parameters at once.
    pub fn entry(mut self, entry: EntryParams) -> Self {
        self.entry = entry;
        self
    }

    pub fn track(mut self, track_id: impl Into<String>) -> Self {
        self.entry.track_id = Some(track_id.into());
        self
    }

    pub fn plan(mut self, plan_id: impl Into<String>) -> Self {
        self.entry.plan_id = Some(plan_id.into());
        self
    }

    /// Start a session at `CONFIRM_TRACK`.
    pub fn build(self) -> Result<FlowMachine, BuildError> {
        let catalog = self.catalog.ok_or(BuildError::MissingCatalog)?;
        Ok(FlowMachine::start(catalog, &self.entry)?)
    }
}
