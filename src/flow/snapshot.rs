//! Read-only views handed to presenters.

use super::session::{FlowSession, PaymentStatus};
use super::step::Step;
use crate::gateway::FailureKind;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Everything a presenter needs to render the current step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSnapshot {
    pub session_id: Uuid,
    pub step: Step,
    pub step_index: u8,
    pub progress_percent: f64,
    pub track_id: String,
    pub selected_plan_id: String,
    pub payment_status: PaymentStatus,
    pub last_error: Option<String>,
    pub failure_kind: Option<FailureKind>,
    pub closed: bool,
}

impl From<&FlowSession> for FlowSnapshot {
    fn from(session: &FlowSession) -> Self {
        Self {
            session_id: session.id,
            step: session.step,
            step_index: session.step.index(),
            progress_percent: session.step.progress_percent(),
            track_id: session.track_id.clone(),
            selected_plan_id: session.plan_id.clone(),
            payment_status: session.payment_status,
            last_error: session.last_error.clone(),
            failure_kind: session.failure_kind,
            closed: session.closed,
        }
    }
}

/// Where to send the user once the unlock is acknowledged.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockDestination {
    pub track_id: String,
    pub course_id: String,
}
