//! Pure building blocks shared by the funnel machine.
//!
//! - The `State` trait every step enum implements
//! - `Guard` predicates that gate transition rules
//! - Append-only, timestamped step history
//!
//! Nothing in here performs I/O; the payment side effect lives behind
//! [`crate::gateway::PaymentGateway`].

mod guard;
mod history;
mod state;

pub use guard::Guard;
pub use history::{StateHistory, StateTransition};
pub use state::State;
