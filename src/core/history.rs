//! Timestamped history of step changes.
//!
//! The funnel records every step change here. Recording never mutates an
//! existing history; it returns a new one, so a snapshot taken earlier keeps
//! describing the session as it was.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One step change.
///
/// # Example
///
/// ```rust
/// use enrollment_funnel::core::StateTransition;
/// use enrollment_funnel::flow::Step;
/// use chrono::Utc;
///
/// let transition = StateTransition {
///     from: Step::ConfirmTrack,
///     to: Step::SelectPlan,
///     timestamp: Utc::now(),
///     attempt: 1,
/// };
/// assert!(transition.is_forward());
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateTransition<S: State> {
    pub from: S,
    pub to: S,
    pub timestamp: DateTime<Utc>,
    /// Which attempt produced the change. Only payment can take more than one.
    pub attempt: usize,
}

impl<S: State + Ord> StateTransition<S> {
    /// True when the transition moved further into the machine.
    pub fn is_forward(&self) -> bool {
        self.to > self.from
    }
}

/// Ordered, append-only list of transitions.
///
/// # Example
///
/// ```rust
/// use enrollment_funnel::core::{StateHistory, StateTransition};
/// use enrollment_funnel::flow::Step;
/// use chrono::Utc;
///
/// let history = StateHistory::new()
///     .record(StateTransition {
///         from: Step::ConfirmTrack,
///         to: Step::SelectPlan,
///         timestamp: Utc::now(),
///         attempt: 1,
///     })
///     .record(StateTransition {
///         from: Step::SelectPlan,
///         to: Step::Payment,
///         timestamp: Utc::now(),
///         attempt: 1,
///     });
///
/// assert_eq!(
///     history.get_path(),
///     vec![&Step::ConfirmTrack, &Step::SelectPlan, &Step::Payment]
/// );
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State> {
    transitions: Vec<StateTransition<S>>,
}

impl<S: State> Default for StateHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> StateHistory<S> {
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Return a new history with `transition` appended.
    pub fn record(&self, transition: StateTransition<S>) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        Self { transitions }
    }

    /// States visited in order: the first `from`, then every `to`.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    pub fn last(&self) -> Option<&StateTransition<S>> {
        self.transitions.last()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn transitions(&self) -> &[StateTransition<S>] {
        &self.transitions
    }
}
