//! In-process gateway with scripted outcomes.

use super::{ChargeOutcome, ChargeRequest, GatewayError, PaymentGateway};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

/// Latency of the checkout demo's fake processor.
pub const DEMO_LATENCY: Duration = Duration::from_millis(2500);

/// Gateway that answers from a script, then falls back to a fixed outcome.
///
/// # Example
///
/// ```rust
/// use enrollment_funnel::gateway::{ChargeOutcome, SimulatedGateway};
///
/// let gateway = SimulatedGateway::approving()
///     .then(Ok(ChargeOutcome::declined("card_declined")));
/// assert_eq!(gateway.calls(), 0);
/// ```
#[derive(Debug)]
pub struct SimulatedGateway {
    latency: Duration,
    fallback: ChargeOutcome,
    script: Mutex<VecDeque<Result<ChargeOutcome, GatewayError>>>,
    requests: Mutex<Vec<ChargeRequest>>,
    calls: AtomicUsize,
}

impl SimulatedGateway {
    fn with_fallback(fallback: ChargeOutcome) -> Self {
        Self {
            latency: Duration::ZERO,
            fallback,
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Approves every charge.
    pub fn approving() -> Self {
        Self::with_fallback(ChargeOutcome::Approved)
    }

    /// Declines every charge with `reason`.
    pub fn declining(reason: impl Into<String>) -> Self {
        Self::with_fallback(ChargeOutcome::declined(reason))
    }

    /// Approves after [`DEMO_LATENCY`], like the marketing checkout.
    pub fn demo() -> Self {
        Self::approving().with_latency(DEMO_LATENCY)
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Queue a result for the next unanswered charge.
    pub fn then(mut self, result: Result<ChargeOutcome, GatewayError>) -> Self {
        self.script.get_mut().push_back(result);
        self
    }

    /// Number of `charge` invocations so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn requests(&self) -> Vec<ChargeRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeOutcome, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().await.push(request.clone());

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let scripted = self.script.lock().await.pop_front();
        scripted.unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}
