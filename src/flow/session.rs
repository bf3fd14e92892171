//! Mutable per-user funnel state.

use super::step::Step;
use crate::gateway::FailureKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where the session's payment stands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Idle,
    Processing,
    Succeeded,
    Failed,
}

impl PaymentStatus {
    pub fn is_processing(self) -> bool {
        matches!(self, Self::Processing)
    }
}

/// Funnel progress of a single user.
///
/// Only [`FlowMachine`](super::FlowMachine) mutates a session; everyone
/// else sees it through a shared reference or a snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowSession {
    pub id: Uuid,
    pub step: Step,
    pub track_id: String,
    pub plan_id: String,
    pub payment_status: PaymentStatus,
    pub last_error: Option<String>,
    pub failure_kind: Option<FailureKind>,
    /// Charges issued so far.
    pub attempts: usize,
    /// Attempt id of the outstanding charge, if any.
    pub pending: Option<Uuid>,
    /// Set once the funnel was exited or the unlock acknowledged.
    pub closed: bool,
    /// Set when the funnel was exited with a charge outstanding; the
    /// charge's outcome is then dropped.
    pub detached: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FlowSession {
    pub(crate) fn new(track_id: String, plan_id: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            step: Step::ConfirmTrack,
            track_id,
            plan_id,
            payment_status: PaymentStatus::Idle,
            last_error: None,
            failure_kind: None,
            attempts: 0,
            pending: None,
            closed: false,
            detached: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn payment_in_flight(&self) -> bool {
        self.pending.is_some()
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
