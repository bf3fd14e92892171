//! Guard predicates for transition rules.

use std::fmt;
use std::sync::Arc;

/// Pure predicate over a context value that decides whether a rule may fire.
///
/// Guards are cheap to clone (the predicate is shared) so a rule table can
/// be built once and handed to every session.
///
/// # Example
///
/// ```rust
/// use enrollment_funnel::core::Guard;
///
/// let has_plan = Guard::new(|plan: &Option<String>| plan.is_some());
///
/// assert!(has_plan.check(&Some("yearly".to_string())));
/// assert!(!has_plan.check(&None));
/// ```
pub struct Guard<C> {
    predicate: Arc<dyn Fn(&C) -> bool + Send + Sync>,
}

impl<C> Guard<C> {
    /// Wrap a predicate. It must be deterministic and side-effect free.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Arc::new(predicate),
        }
    }

    pub fn check(&self, context: &C) -> bool {
        (self.predicate)(context)
    }

    /// Both guards must pass.
    pub fn and(self, other: Guard<C>) -> Self
    where
        C: 'static,
    {
        Guard::new(move |ctx| self.check(ctx) && other.check(ctx))
    }
}

impl<C> Clone for Guard<C> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<C> fmt::Debug for Guard<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Guard(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Attempt {
        in_flight: bool,
        closed: bool,
    }

    #[test]
    fn guard_reflects_predicate() {
        let idle = Guard::new(|a: &Attempt| !a.in_flight);

        assert!(idle.check(&Attempt {
            in_flight: false,
            closed: false
        }));
        assert!(!idle.check(&Attempt {
            in_flight: true,
            closed: false
        }));
    }

    #[test]
    fn and_requires_both() {
        let guard = Guard::new(|a: &Attempt| !a.in_flight).and(Guard::new(|a: &Attempt| !a.closed));

        assert!(guard.check(&Attempt {
            in_flight: false,
            closed: false
        }));
        assert!(!guard.check(&Attempt {
            in_flight: false,
            closed: true
        }));
        assert!(!guard.check(&Attempt {
            in_flight: true,
            closed: false
        }));
    }

    #[test]
    fn clones_share_the_predicate() {
        let guard = Guard::new(|n: &u32| *n > 2);
        let cloned = guard.clone();

        assert_eq!(guard.check(&3), cloned.check(&3));
        assert_eq!(guard.check(&1), cloned.check(&1));
    }
}
