//! Capture and restore of funnel sessions.
//!
//! A checkpoint is a versioned, serializable copy of a session and its
//! step history. Where the bytes are kept is up to the host.

use crate::catalog::PlanCatalog;
use crate::core::StateHistory;
use crate::flow::{FlowMachine, FlowSession, PaymentStatus, Step};
use crate::gateway::FailureKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Serializable copy of a session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FlowCheckpoint {
    pub version: u32,
    pub session_id: Uuid,
    pub taken_at: DateTime<Utc>,
    pub step: Step,
    pub track_id: String,
    pub plan_id: String,
    pub payment_status: PaymentStatus,
    pub last_error: Option<String>,
    pub failure_kind: Option<FailureKind>,
    pub attempts: usize,
    pub closed: bool,
    pub history: StateHistory<Step>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FlowCheckpoint {
    /// Copy the machine's session. Refused while a charge is outstanding.
    pub fn capture(machine: &FlowMachine) -> Result<Self, CheckpointError> {
        let session = machine.session();
        if session.payment_in_flight() || session.payment_status.is_processing() {
            return Err(CheckpointError::PaymentInFlight(session.id));
        }

        Ok(Self {
            version: CHECKPOINT_VERSION,
            session_id: session.id,
            taken_at: Utc::now(),
            step: session.step,
            track_id: session.track_id.clone(),
            plan_id: session.plan_id.clone(),
            payment_status: session.payment_status,
            last_error: session.last_error.clone(),
            failure_kind: session.failure_kind,
            attempts: session.attempts,
            closed: session.closed,
            history: machine.history().clone(),
            created_at: session.created_at,
            updated_at: session.updated_at,
        })
    }

    /// Rebuild a machine, checking the checkpoint against `catalog`.
    pub fn restore(self, catalog: Arc<PlanCatalog>) -> Result<FlowMachine, CheckpointError> {
        self.validate(&catalog)?;

        let session = FlowSession {
            id: self.session_id,
            step: self.step,
            track_id: self.track_id,
            plan_id: self.plan_id,
            payment_status: self.payment_status,
            last_error: self.last_error,
            failure_kind: self.failure_kind,
            attempts: self.attempts,
            pending: None,
            closed: self.closed,
            detached: false,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };

        tracing::info!(session = %session.id, step = %session.step, "session restored from checkpoint");
        Ok(FlowMachine::from_parts(catalog, session, self.history))
    }

    fn validate(&self, catalog: &PlanCatalog) -> Result<(), CheckpointError> {
        if self.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            });
        }

        catalog
            .plan(&self.track_id, &self.plan_id)
            .map_err(|err| CheckpointError::ValidationFailed(err.to_string()))?;

        if self.payment_status.is_processing() {
            return Err(CheckpointError::ValidationFailed(
                "payment status PROCESSING cannot be restored".to_string(),
            ));
        }

        let unlocked = self.step == Step::Unlocked;
        let succeeded = self.payment_status == PaymentStatus::Succeeded;
        if unlocked != succeeded {
            return Err(CheckpointError::ValidationFailed(format!(
                "step {} is inconsistent with payment status {:?}",
                self.step, self.payment_status
            )));
        }

        if let Some(last) = self.history.last() {
            if last.to != self.step {
                return Err(CheckpointError::ValidationFailed(format!(
                    "history ends at {} but session is at {}",
                    last.to, self.step
                )));
            }
        }

        Ok(())
    }

    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        serde_json::from_str(json).map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CheckpointError> {
        bincode::deserialize(bytes).map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))
    }
}
