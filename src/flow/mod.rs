//! The enrollment funnel: track confirmation, plan selection, payment and
//! unlock.
//!
//! [`FlowMachine`] owns one [`FlowSession`] and changes it only through
//! intents checked against [`funnel_rules`]. Presenters read
//! [`FlowSnapshot`]s and send [`Intent`]s; [`SharedFlow`] serializes
//! intents from several tasks and publishes snapshots.

mod builder;
mod error;
mod intent;
mod machine;
mod rules;
mod session;
mod shared;
mod snapshot;
mod step;

pub use builder::{EntryParams, FlowBuilder};
pub use error::{BuildError, FlowError, Refusal};
pub use intent::{Intent, IntentKind};
pub use machine::{FlowMachine, ABANDONED_CHARGE};
pub use rules::{funnel_rules, Rule};
pub use session::{FlowSession, PaymentStatus};
pub use shared::SharedFlow;
pub use snapshot::{FlowSnapshot, UnlockDestination};
pub use step::{Step, TOTAL_STEPS};
