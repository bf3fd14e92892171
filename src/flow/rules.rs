//! Transition rules of the funnel.
//!
//! Each rule names the intent it answers, the step it fires from, the step
//! it leads to, and a guard over the session. An intent is legal exactly
//! when some rule for it matches.

use super::intent::IntentKind;
use super::session::FlowSession;
use super::step::Step;
use crate::core::Guard;

/// One legal move of the funnel.
#[derive(Clone, Debug)]
pub struct Rule {
    pub intent: IntentKind,
    pub from: Step,
    pub to: Step,
    pub guard: Guard<FlowSession>,
}

impl Rule {
    fn new(intent: IntentKind, from: Step, to: Step) -> Self {
        Self {
            intent,
            from,
            to,
            guard: no_charge_outstanding(),
        }
    }

    /// Whether the rule fires for this session (pure).
    pub fn can_execute(&self, session: &FlowSession) -> bool {
        session.step == self.from && self.guard.check(session)
    }
}

/// Blocks while an attempt awaits completion or the status is PROCESSING.
fn no_charge_outstanding() -> Guard<FlowSession> {
    let no_pending_attempt = Guard::new(|session: &FlowSession| !session.payment_in_flight());
    let not_processing =
        Guard::new(|session: &FlowSession| !session.payment_status.is_processing());
    no_pending_attempt.and(not_processing)
}

/// Rule table of the enrollment funnel.
///
/// `SubmitPayment` stays on `Payment`: the move to `Unlocked` happens only
/// when the charge resolves as approved. `Cancel` is not listed; exiting
/// is always possible while the session is open.
pub fn funnel_rules() -> Vec<Rule> {
    use IntentKind as I;

    vec![
        Rule::new(I::SelectTrack, Step::ConfirmTrack, Step::ConfirmTrack),
        Rule::new(I::Advance, Step::ConfirmTrack, Step::SelectPlan),
        Rule::new(I::Advance, Step::SelectPlan, Step::Payment),
        Rule::new(I::Back, Step::SelectPlan, Step::ConfirmTrack),
        Rule::new(I::Back, Step::Payment, Step::SelectPlan),
        Rule::new(I::SelectPlan, Step::SelectPlan, Step::SelectPlan),
        Rule::new(I::SubmitPayment, Step::Payment, Step::Payment),
        Rule::new(I::AcknowledgeUnlock, Step::Unlocked, Step::Unlocked),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::PaymentStatus;
    use uuid::Uuid;

    fn session_at(step: Step) -> FlowSession {
        let mut session = FlowSession::new("ai".to_string(), "yearly".to_string());
        session.step = step;
        session
    }

    fn legal(intent: IntentKind, session: &FlowSession) -> Vec<Step> {
        funnel_rules()
            .into_iter()
            .filter(|r| r.intent == intent && r.can_execute(session))
            .map(|r| r.to)
            .collect()
    }

    #[test]
    fn advance_moves_one_step_until_payment() {
        assert_eq!(
            legal(IntentKind::Advance, &session_at(Step::ConfirmTrack)),
            vec![Step::SelectPlan]
        );
        assert_eq!(
            legal(IntentKind::Advance, &session_at(Step::SelectPlan)),
            vec![Step::Payment]
        );
        assert!(legal(IntentKind::Advance, &session_at(Step::Payment)).is_empty());
        assert!(legal(IntentKind::Advance, &session_at(Step::Unlocked)).is_empty());
    }

    #[test]
    fn back_only_from_middle_steps() {
        assert!(legal(IntentKind::Back, &session_at(Step::ConfirmTrack)).is_empty());
        assert_eq!(
            legal(IntentKind::Back, &session_at(Step::SelectPlan)),
            vec![Step::ConfirmTrack]
        );
        assert_eq!(
            legal(IntentKind::Back, &session_at(Step::Payment)),
            vec![Step::SelectPlan]
        );
        assert!(legal(IntentKind::Back, &session_at(Step::Unlocked)).is_empty());
    }

    #[test]
    fn outstanding_charge_blocks_every_rule() {
        let mut session = session_at(Step::Payment);
        session.pending = Some(Uuid::new_v4());

        for rule in funnel_rules() {
            assert!(!rule.can_execute(&session), "{:?} fired", rule.intent);
        }
    }

    #[test]
    fn processing_status_alone_blocks_every_rule() {
        let mut session = session_at(Step::Payment);
        session.payment_status = PaymentStatus::Processing;
        assert!(session.pending.is_none());

        for rule in funnel_rules() {
            assert!(!rule.can_execute(&session), "{:?} fired", rule.intent);
        }
    }

    #[test]
    fn rules_never_skip_a_step() {
        for rule in funnel_rules() {
            let (from, to) = (i16::from(rule.from.index()), i16::from(rule.to.index()));
            assert!((to - from).abs() <= 1);
        }
    }
}
