//! The `State` trait implemented by funnel steps.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A position in a state machine.
///
/// Implementations are plain values: cheap to clone, comparable and
/// serializable so they can appear in snapshots and checkpoints.
///
/// Most implementors are produced by [`step_enum!`](crate::step_enum), which
/// also wires up the ordering helpers the funnel relies on.
///
/// # Example
///
/// ```rust
/// use enrollment_funnel::core::State;
/// use enrollment_funnel::flow::Step;
///
/// assert_eq!(Step::Payment.name(), "PAYMENT");
/// assert!(Step::Unlocked.is_final());
/// ```
pub trait State:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
    /// Stable display name, used in logs and refusal messages.
    fn name(&self) -> &str;

    /// Terminal states accept no further step changes.
    fn is_final(&self) -> bool {
        false
    }
}
