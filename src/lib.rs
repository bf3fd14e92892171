//! Enrollment funnel: a guarded state machine for track enrollment and the
//! purchase-state action resolver used by course surfaces.
//!
//! The crate keeps a pure core with the side effect pushed to the edge.
//! Transitions are checked against a rule table and return snapshots; the
//! only suspending operation, the payment charge, goes through an injected
//! [`PaymentGateway`](gateway::PaymentGateway).
//!
//! # Core Concepts
//!
//! - **Catalog**: tracks and the plans each one offers ([`catalog`])
//! - **Funnel**: CONFIRM_TRACK → SELECT_PLAN → PAYMENT → UNLOCKED ([`flow`])
//! - **Resolver**: purchase state to call-to-action ([`resolver`])
//! - **Checkpoint**: serializable copies of a session ([`checkpoint`])
//!
//! # Example
//!
//! ```rust
//! use enrollment_funnel::flow::{FlowBuilder, FlowError, PaymentStatus, Step};
//! use enrollment_funnel::gateway::ChargeOutcome;
//!
//! let mut machine = FlowBuilder::new()
//!     .builtin_catalog()
//!     .track("swe")
//!     .plan("yearly")
//!     .build()
//!     .unwrap();
//!
//! machine.advance().unwrap();
//! machine.advance().unwrap();
//! assert!(matches!(machine.advance(), Err(FlowError::IllegalTransition { .. })));
//!
//! let request = machine.begin_payment().unwrap();
//! assert_eq!(request.amount_cents, 29_900);
//!
//! let snapshot = machine
//!     .complete_payment(request.attempt_id, ChargeOutcome::Approved)
//!     .unwrap();
//! assert_eq!(snapshot.step, Step::Unlocked);
//! assert_eq!(snapshot.payment_status, PaymentStatus::Succeeded);
//! ```

pub mod catalog;
pub mod checkpoint;
pub mod core;
pub mod flow;
pub mod gateway;
pub mod macros;
pub mod resolver;

// Re-export commonly used types
pub use crate::catalog::{CatalogError, Plan, PlanCatalog, Track};
pub use crate::core::{Guard, State, StateHistory, StateTransition};
pub use crate::flow::{FlowBuilder, FlowError, FlowMachine, FlowSnapshot, SharedFlow, Step};
pub use crate::gateway::{ChargeOutcome, ChargeRequest, PaymentGateway};
pub use crate::resolver::{resolve, ActionView, InvalidStateError, PurchaseState, ResolvedAction};
