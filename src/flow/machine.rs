//! The funnel state machine.
//!
//! Every intent is checked against the rule table before anything is
//! touched, so a refused intent leaves the session exactly as it was.
//!
//! Payment is split in two phases, like a step whose effect runs outside
//! the machine: [`FlowMachine::begin_payment`] moves the session to
//! `PROCESSING` and hands out a [`ChargeRequest`];
//! [`FlowMachine::complete_payment`] applies the gateway's answer.
//! [`FlowMachine::submit_payment`] runs both around one gateway call.

use super::builder::{EntryParams, FlowBuilder};
use super::error::{FlowError, Refusal};
use super::intent::{Intent, IntentKind};
use super::rules::{funnel_rules, Rule};
use super::session::{FlowSession, PaymentStatus};
use super::snapshot::{FlowSnapshot, UnlockDestination};
use super::step::Step;
use crate::catalog::{CatalogError, Plan, PlanCatalog, Track};
use crate::core::{StateHistory, StateTransition};
use crate::gateway::{ChargeOutcome, ChargeRequest, FailureKind, PaymentGateway};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Decline reason recorded when a charge is dropped before it resolves.
pub const ABANDONED_CHARGE: &str = "payment_abandoned";

/// Controller of one funnel session.
///
/// # Example
///
/// ```rust
/// use enrollment_funnel::flow::{FlowBuilder, PaymentStatus, Step};
/// use enrollment_funnel::gateway::SimulatedGateway;
///
/// # tokio_test_block(async {
/// let mut machine = FlowBuilder::new().builtin_catalog().track("swe").build().unwrap();
/// machine.advance().unwrap();
/// machine.advance().unwrap();
///
/// let snapshot = machine.submit_payment(&SimulatedGateway::approving()).await.unwrap();
/// assert_eq!(snapshot.step, Step::Unlocked);
/// assert_eq!(snapshot.payment_status, PaymentStatus::Succeeded);
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug)]
pub struct FlowMachine {
    catalog: Arc<PlanCatalog>,
    rules: Vec<Rule>,
    session: FlowSession,
    history: StateHistory<Step>,
}

impl FlowMachine {
    pub fn builder() -> FlowBuilder {
        FlowBuilder::new()
    }

    /// Open a session from entry parameters, falling back to the catalog
    /// defaults for unknown track or plan ids.
    pub(crate) fn start(
        catalog: Arc<PlanCatalog>,
        entry: &EntryParams,
    ) -> Result<Self, CatalogError> {
        let track = catalog.resolve_track(entry.track_id.as_deref());
        if let Some(requested) = entry.track_id.as_deref().filter(|id| *id != track.id) {
            warn!(requested, fallback = %track.id, "unknown track requested, using default");
        }

        let plan_id = match entry.plan_id.as_deref() {
            Some(requested) if track.plan(requested).is_some() => requested.to_string(),
            requested => {
                let fallback = catalog.default_plan(&track.id)?;
                if let Some(requested) = requested {
                    warn!(
                        requested,
                        track = %track.id,
                        fallback = %fallback.id,
                        "plan not offered for track, using default"
                    );
                }
                fallback.id.clone()
            }
        };

        let session = FlowSession::new(track.id.clone(), plan_id);
        info!(
            session = %session.id,
            track = %session.track_id,
            plan = %session.plan_id,
            "enrollment session opened"
        );

        Ok(Self::from_parts(catalog, session, StateHistory::new()))
    }

    pub(crate) fn from_parts(
        catalog: Arc<PlanCatalog>,
        session: FlowSession,
        history: StateHistory<Step>,
    ) -> Self {
        Self {
            catalog,
            rules: funnel_rules(),
            session,
            history,
        }
    }

    pub fn snapshot(&self) -> FlowSnapshot {
        FlowSnapshot::from(&self.session)
    }

    pub fn session(&self) -> &FlowSession {
        &self.session
    }

    pub fn step(&self) -> Step {
        self.session.step
    }

    pub fn history(&self) -> &StateHistory<Step> {
        &self.history
    }

    pub fn catalog(&self) -> &PlanCatalog {
        &self.catalog
    }

    pub fn is_closed(&self) -> bool {
        self.session.closed
    }

    pub fn track(&self) -> Result<&Track, FlowError> {
        Ok(self.catalog.track(&self.session.track_id)?)
    }

    pub fn selected_plan(&self) -> Result<&Plan, FlowError> {
        Ok(self
            .catalog
            .plan(&self.session.track_id, &self.session.plan_id)?)
    }

    /// CONFIRM_TRACK → SELECT_PLAN → PAYMENT. From PAYMENT only a
    /// successful charge moves on.
    pub fn advance(&mut self) -> Result<FlowSnapshot, FlowError> {
        let to = self.authorize(IntentKind::Advance)?;
        self.move_to(to, 1);
        Ok(self.snapshot())
    }

    /// One step backwards from SELECT_PLAN or PAYMENT.
    pub fn back(&mut self) -> Result<FlowSnapshot, FlowError> {
        let to = self.authorize(IntentKind::Back)?;
        self.move_to(to, 1);
        Ok(self.snapshot())
    }

    /// Choose a plan of the session's track. Does not change the step.
    pub fn select_plan(&mut self, plan_id: &str) -> Result<FlowSnapshot, FlowError> {
        self.authorize(IntentKind::SelectPlan)?;
        let plan = self.catalog.plan(&self.session.track_id, plan_id)?;

        debug!(session = %self.session.id, plan = %plan.id, "plan selected");
        self.session.plan_id = plan.id.clone();
        self.session.touch();
        Ok(self.snapshot())
    }

    /// Swap the track before it is confirmed. Unknown ids select the
    /// catalog's default track; a plan the new track does not offer is
    /// replaced by that track's default plan.
    pub fn select_track(&mut self, track_id: &str) -> Result<FlowSnapshot, FlowError> {
        self.authorize(IntentKind::SelectTrack)?;

        let track = self.catalog.resolve_track(Some(track_id));
        if track.id != track_id {
            warn!(
                session = %self.session.id,
                requested = track_id,
                fallback = %track.id,
                "unknown track selected, using default"
            );
        }

        let plan_id = match track.plan(&self.session.plan_id) {
            Some(plan) => plan.id.clone(),
            None => self.catalog.default_plan(&track.id)?.id.clone(),
        };

        debug!(session = %self.session.id, track = %track.id, plan = %plan_id, "track selected");
        self.session.track_id = track.id.clone();
        self.session.plan_id = plan_id;
        self.session.touch();
        Ok(self.snapshot())
    }

    /// Start a charge for the selected plan.
    ///
    /// Legal only at PAYMENT with no charge outstanding, which makes
    /// this the single place a charge can be issued.
    pub fn begin_payment(&mut self) -> Result<ChargeRequest, FlowError> {
        self.authorize(IntentKind::SubmitPayment)?;
        let amount_cents = self.selected_plan()?.price_cents;

        let attempt_id = Uuid::new_v4();
        self.session.attempts += 1;
        self.session.pending = Some(attempt_id);
        self.session.payment_status = PaymentStatus::Processing;
        self.session.last_error = None;
        self.session.failure_kind = None;
        self.session.touch();

        info!(
            session = %self.session.id,
            attempt = self.session.attempts,
            plan = %self.session.plan_id,
            amount_cents,
            "payment started"
        );

        Ok(ChargeRequest {
            session_id: self.session.id,
            attempt_id,
            attempt: self.session.attempts,
            track_id: self.session.track_id.clone(),
            plan_id: self.session.plan_id.clone(),
            amount_cents,
        })
    }

    /// Apply the resolved outcome of the outstanding charge.
    ///
    /// Approval unlocks the track. A decline keeps the session at PAYMENT
    /// with the reason recorded, ready for a retry or `back`. When the
    /// funnel was exited meanwhile the outcome is consumed but ignored.
    pub fn complete_payment(
        &mut self,
        attempt_id: Uuid,
        outcome: ChargeOutcome,
    ) -> Result<FlowSnapshot, FlowError> {
        if self.session.pending != Some(attempt_id) {
            debug!(session = %self.session.id, %attempt_id, "completion for unknown attempt");
            return Err(FlowError::StaleAttempt { attempt_id });
        }
        self.session.pending = None;

        if self.session.detached {
            self.session.detached = false;
            info!(
                session = %self.session.id,
                approved = outcome.is_approved(),
                "payment resolved after the funnel was exited, outcome ignored"
            );
            return Ok(self.snapshot());
        }

        match outcome {
            ChargeOutcome::Approved => {
                self.session.payment_status = PaymentStatus::Succeeded;
                self.move_to(Step::Unlocked, self.session.attempts);
                info!(
                    session = %self.session.id,
                    track = %self.session.track_id,
                    "payment succeeded, track unlocked"
                );
            }
            ChargeOutcome::Declined { reason } => {
                let kind = FailureKind::classify(&reason);
                warn!(session = %self.session.id, %reason, ?kind, "payment failed");
                self.session.payment_status = PaymentStatus::Failed;
                self.session.failure_kind = Some(kind);
                self.session.last_error = Some(reason);
                self.session.touch();
            }
        }

        Ok(self.snapshot())
    }

    /// Charge the selected plan through `gateway` and apply the result.
    /// Gateway errors count as declines.
    ///
    /// If this future is dropped before the gateway answers, the attempt is
    /// failed with [`ABANDONED_CHARGE`] so the session can be retried.
    /// Whether the gateway went on to charge is the host's to reconcile.
    pub async fn submit_payment<G>(&mut self, gateway: &G) -> Result<FlowSnapshot, FlowError>
    where
        G: PaymentGateway + ?Sized,
    {
        let request = self.begin_payment()?;
        let pending = PendingCharge {
            machine: self,
            attempt_id: request.attempt_id,
        };
        let outcome = ChargeOutcome::from_result(gateway.charge(&request).await);
        pending.finish(outcome)
    }

    /// Exit the funnel from any step.
    ///
    /// An outstanding charge is left to resolve; its outcome will be
    /// dropped by [`complete_payment`](Self::complete_payment).
    pub fn cancel(&mut self) -> Result<FlowSnapshot, FlowError> {
        if self.session.closed {
            return Err(FlowError::SessionClosed {
                attempted: IntentKind::Cancel,
            });
        }

        self.session.closed = true;
        self.session.detached = self.session.payment_in_flight();
        self.session.touch();
        info!(
            session = %self.session.id,
            step = %self.session.step,
            detached = self.session.detached,
            "enrollment session exited"
        );
        Ok(self.snapshot())
    }

    /// Acknowledge the unlock screen, closing the session.
    pub fn acknowledge_unlock(&mut self) -> Result<UnlockDestination, FlowError> {
        self.authorize(IntentKind::AcknowledgeUnlock)?;
        let course_id = self.track()?.course_id.clone();

        self.session.closed = true;
        self.session.touch();
        info!(session = %self.session.id, course = %course_id, "unlock acknowledged");

        Ok(UnlockDestination {
            track_id: self.session.track_id.clone(),
            course_id,
        })
    }

    /// Apply any presenter intent.
    pub async fn dispatch<G>(&mut self, intent: Intent, gateway: &G) -> Result<FlowSnapshot, FlowError>
    where
        G: PaymentGateway + ?Sized,
    {
        match intent {
            Intent::Advance => self.advance(),
            Intent::Back => self.back(),
            Intent::SelectPlan(plan_id) => self.select_plan(&plan_id),
            Intent::SelectTrack(track_id) => self.select_track(&track_id),
            Intent::SubmitPayment => self.submit_payment(gateway).await,
            Intent::Cancel => self.cancel(),
            Intent::AcknowledgeUnlock => self.acknowledge_unlock().map(|_| self.snapshot()),
        }
    }

    /// Find the rule answering `intent`, returning its target step.
    fn authorize(&self, intent: IntentKind) -> Result<Step, FlowError> {
        if self.session.closed {
            debug!(session = %self.session.id, attempted = %intent, "intent on closed session");
            return Err(FlowError::SessionClosed { attempted: intent });
        }

        if let Some(rule) = self
            .rules
            .iter()
            .find(|rule| rule.intent == intent && rule.can_execute(&self.session))
        {
            return Ok(rule.to);
        }

        let reason = if self.session.payment_in_flight() {
            Refusal::PaymentInFlight
        } else {
            Refusal::WrongStep
        };
        debug!(
            session = %self.session.id,
            step = %self.session.step,
            attempted = %intent,
            %reason,
            "transition refused"
        );
        Err(FlowError::IllegalTransition {
            step: self.session.step,
            attempted: intent,
            reason,
        })
    }

    fn move_to(&mut self, to: Step, attempt: usize) {
        let from = self.session.step;
        if from != to {
            self.history = self.history.record(StateTransition {
                from,
                to,
                timestamp: Utc::now(),
                attempt,
            });
            self.session.step = to;
            debug!(session = %self.session.id, %from, %to, "step changed");
        }
        self.session.touch();
    }
}

/// Outstanding attempt owned by [`FlowMachine::submit_payment`].
struct PendingCharge<'a> {
    machine: &'a mut FlowMachine,
    attempt_id: Uuid,
}

impl PendingCharge<'_> {
    fn finish(self, outcome: ChargeOutcome) -> Result<FlowSnapshot, FlowError> {
        self.machine.complete_payment(self.attempt_id, outcome)
    }
}

impl Drop for PendingCharge<'_> {
    fn drop(&mut self) {
        if self.machine.session.pending != Some(self.attempt_id) {
            return;
        }
        warn!(
            session = %self.machine.session.id,
            attempt_id = %self.attempt_id,
            "charge dropped before it resolved"
        );
        let _ = self
            .machine
            .complete_payment(self.attempt_id, ChargeOutcome::declined(ABANDONED_CHARGE));
    }
}
