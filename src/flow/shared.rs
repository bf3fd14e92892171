//! Serialized access to one session from several tasks.

use super::error::FlowError;
use super::intent::Intent;
use super::machine::{FlowMachine, ABANDONED_CHARGE};
use super::snapshot::{FlowSnapshot, UnlockDestination};
use crate::gateway::{ChargeOutcome, PaymentGateway};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, error};
use uuid::Uuid;

/// A session shared between a presenter and whatever drives it.
///
/// Intents are applied one at a time under a lock. The lock is released
/// while the gateway works, so a second `submit_payment` sees the charge
/// in flight and is refused instead of charging twice, and `cancel` still
/// gets through. Every accepted intent publishes a fresh snapshot to the
/// receivers handed out by [`subscribe`](Self::subscribe).
#[derive(Clone)]
pub struct SharedFlow {
    machine: Arc<Mutex<FlowMachine>>,
    updates: Arc<watch::Sender<FlowSnapshot>>,
}

impl SharedFlow {
    pub fn new(machine: FlowMachine) -> Self {
        let (updates, _) = watch::channel(machine.snapshot());
        Self {
            machine: Arc::new(Mutex::new(machine)),
            updates: Arc::new(updates),
        }
    }

    /// Receiver that always holds the latest snapshot.
    pub fn subscribe(&self) -> watch::Receiver<FlowSnapshot> {
        self.updates.subscribe()
    }

    pub async fn snapshot(&self) -> FlowSnapshot {
        self.machine.lock().await.snapshot()
    }

    pub async fn advance(&self) -> Result<FlowSnapshot, FlowError> {
        self.apply(FlowMachine::advance).await
    }

    pub async fn back(&self) -> Result<FlowSnapshot, FlowError> {
        self.apply(FlowMachine::back).await
    }

    pub async fn select_plan(&self, plan_id: &str) -> Result<FlowSnapshot, FlowError> {
        self.apply(|machine| machine.select_plan(plan_id)).await
    }

    pub async fn select_track(&self, track_id: &str) -> Result<FlowSnapshot, FlowError> {
        self.apply(|machine| machine.select_track(track_id)).await
    }

    pub async fn cancel(&self) -> Result<FlowSnapshot, FlowError> {
        self.apply(FlowMachine::cancel).await
    }

    pub async fn acknowledge_unlock(&self) -> Result<UnlockDestination, FlowError> {
        let mut machine = self.machine.lock().await;
        let destination = machine.acknowledge_unlock()?;
        self.publish(machine.snapshot());
        Ok(destination)
    }

    /// Charge through `gateway` without holding the session lock while
    /// the charge is outstanding.
    ///
    /// The charge and its completion run on a spawned task, so dropping
    /// this future (a timeout, a disconnected caller) does not strand the
    /// session in PROCESSING: the outcome is still applied and published.
    pub async fn submit_payment<G>(&self, gateway: Arc<G>) -> Result<FlowSnapshot, FlowError>
    where
        G: PaymentGateway + ?Sized + 'static,
    {
        let request = {
            let mut machine = self.machine.lock().await;
            let request = machine.begin_payment()?;
            self.publish(machine.snapshot());
            request
        };
        let attempt_id = request.attempt_id;

        let shared = self.clone();
        let charge = tokio::spawn(async move {
            let outcome = ChargeOutcome::from_result(gateway.charge(&request).await);
            shared.complete(request.attempt_id, outcome).await
        });

        match charge.await {
            Ok(result) => result,
            Err(join_error) => {
                error!(%attempt_id, %join_error, "charge task did not finish");
                self.complete(attempt_id, ChargeOutcome::declined(ABANDONED_CHARGE))
                    .await
            }
        }
    }

    pub async fn dispatch<G>(
        &self,
        intent: Intent,
        gateway: &Arc<G>,
    ) -> Result<FlowSnapshot, FlowError>
    where
        G: PaymentGateway + ?Sized + 'static,
    {
        match intent {
            Intent::Advance => self.advance().await,
            Intent::Back => self.back().await,
            Intent::SelectPlan(plan_id) => self.select_plan(&plan_id).await,
            Intent::SelectTrack(track_id) => self.select_track(&track_id).await,
            Intent::SubmitPayment => self.submit_payment(Arc::clone(gateway)).await,
            Intent::Cancel => self.cancel().await,
            Intent::AcknowledgeUnlock => {
                self.acknowledge_unlock().await?;
                Ok(self.snapshot().await)
            }
        }
    }

    async fn apply<F>(&self, f: F) -> Result<FlowSnapshot, FlowError>
    where
        F: FnOnce(&mut FlowMachine) -> Result<FlowSnapshot, FlowError>,
    {
        let mut machine = self.machine.lock().await;
        let snapshot = f(&mut *machine)?;
        self.publish(snapshot.clone());
        Ok(snapshot)
    }

    async fn complete(
        &self,
        attempt_id: Uuid,
        outcome: ChargeOutcome,
    ) -> Result<FlowSnapshot, FlowError> {
        let mut machine = self.machine.lock().await;
        let snapshot = machine.complete_payment(attempt_id, outcome)?;
        self.publish(snapshot.clone());
        Ok(snapshot)
    }

    fn publish(&self, snapshot: FlowSnapshot) {
        debug!(session = %snapshot.session_id, step = %snapshot.step, "snapshot published");
        self.updates.send_replace(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::{FlowBuilder, PaymentStatus, Refusal, Step};
    use crate::gateway::SimulatedGateway;
    use std::time::Duration;

    fn shared_at_payment() -> SharedFlow {
        let mut machine = FlowBuilder::new()
            .builtin_catalog()
            .track("swe")
            .plan("yearly")
            .build()
            .unwrap();
        machine.advance().unwrap();
        machine.advance().unwrap();
        SharedFlow::new(machine)
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_submits_charge_once() {
        let flow = shared_at_payment();
        let gateway = Arc::new(SimulatedGateway::approving().with_latency(Duration::from_millis(100)));

        let (first, second) = tokio::join!(
            flow.submit_payment(Arc::clone(&gateway)),
            flow.submit_payment(Arc::clone(&gateway))
        );

        assert_eq!(gateway.calls(), 1);
        assert_eq!(first.unwrap().step, Step::Unlocked);
        assert!(matches!(
            second,
            Err(FlowError::IllegalTransition {
                reason: Refusal::PaymentInFlight,
                ..
            })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_while_processing_detaches() {
        let flow = shared_at_payment();
        let gateway = Arc::new(SimulatedGateway::approving().with_latency(Duration::from_millis(100)));

        let (paid, cancelled) = tokio::join!(flow.submit_payment(Arc::clone(&gateway)), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            flow.cancel().await
        });

        assert!(cancelled.unwrap().closed);
        let snapshot = paid.unwrap();
        assert_eq!(snapshot.step, Step::Payment);
        assert!(snapshot.closed);
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_submit_still_applies_the_charge() {
        let flow = shared_at_payment();
        let mut updates = flow.subscribe();
        let gateway = Arc::new(SimulatedGateway::approving().with_latency(Duration::from_millis(100)));

        let timed_out = tokio::time::timeout(
            Duration::from_millis(10),
            flow.submit_payment(Arc::clone(&gateway)),
        )
        .await;
        assert!(timed_out.is_err());
        assert_eq!(
            flow.snapshot().await.payment_status,
            PaymentStatus::Processing
        );

        tokio::time::sleep(Duration::from_millis(200)).await;

        let snapshot = flow.snapshot().await;
        assert_eq!(snapshot.step, Step::Unlocked);
        assert_eq!(snapshot.payment_status, PaymentStatus::Succeeded);
        assert_eq!(updates.borrow_and_update().step, Step::Unlocked);
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_declined_submit_can_be_retried() {
        let flow = shared_at_payment();
        let gateway = Arc::new(
            SimulatedGateway::approving()
                .with_latency(Duration::from_millis(100))
                .then(Ok(ChargeOutcome::declined("card_declined"))),
        );

        let timed_out = tokio::time::timeout(
            Duration::from_millis(10),
            flow.submit_payment(Arc::clone(&gateway)),
        )
        .await;
        assert!(timed_out.is_err());
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(flow.snapshot().await.payment_status, PaymentStatus::Failed);
        assert_eq!(flow.back().await.unwrap().step, Step::SelectPlan);
        flow.advance().await.unwrap();
        let snapshot = flow.submit_payment(Arc::clone(&gateway)).await.unwrap();
        assert_eq!(snapshot.step, Step::Unlocked);
        assert_eq!(gateway.calls(), 2);
    }

    #[tokio::test]
    async fn subscribers_see_every_transition() {
        let flow = shared_at_payment();
        let mut updates = flow.subscribe();
        assert_eq!(updates.borrow_and_update().step, Step::Payment);

        flow.back().await.unwrap();
        assert!(updates.has_changed().unwrap());
        assert_eq!(updates.borrow_and_update().step, Step::SelectPlan);

        flow.advance().await.unwrap();
        flow.submit_payment(Arc::new(SimulatedGateway::declining("card_declined")))
            .await
            .unwrap();
        let latest = updates.borrow_and_update().clone();
        assert_eq!(latest.payment_status, PaymentStatus::Failed);
        assert_eq!(latest.last_error.as_deref(), Some("card_declined"));
    }

    #[tokio::test]
    async fn refused_intent_publishes_nothing() {
        let flow = shared_at_payment();
        let mut updates = flow.subscribe();
        let _ = updates.borrow_and_update();

        assert!(flow.advance().await.is_err());
        assert!(!updates.has_changed().unwrap());
    }

    #[tokio::test]
    async fn dispatch_reaches_unlock() {
        let flow = shared_at_payment();
        let gateway = Arc::new(SimulatedGateway::approving());

        flow.dispatch(Intent::SubmitPayment, &gateway).await.unwrap();
        let snapshot = flow
            .dispatch(Intent::AcknowledgeUnlock, &gateway)
            .await
            .unwrap();

        assert_eq!(snapshot.step, Step::Unlocked);
        assert!(snapshot.closed);
    }
}
