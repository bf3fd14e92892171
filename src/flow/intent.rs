//! Intents a presenter can send to a session.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A user intent, as dispatched by a presenter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    Advance,
    Back,
    SelectPlan(String),
    SelectTrack(String),
    SubmitPayment,
    Cancel,
    AcknowledgeUnlock,
}

impl Intent {
    pub fn kind(&self) -> IntentKind {
        match self {
            Self::Advance => IntentKind::Advance,
            Self::Back => IntentKind::Back,
            Self::SelectPlan(_) => IntentKind::SelectPlan,
            Self::SelectTrack(_) => IntentKind::SelectTrack,
            Self::SubmitPayment => IntentKind::SubmitPayment,
            Self::Cancel => IntentKind::Cancel,
            Self::AcknowledgeUnlock => IntentKind::AcknowledgeUnlock,
        }
    }
}

/// Intent without its payload, used in rules and refusals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentKind {
    Advance,
    Back,
    SelectPlan,
    SelectTrack,
    SubmitPayment,
    Cancel,
    AcknowledgeUnlock,
}

impl IntentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Advance => "advance",
            Self::Back => "back",
            Self::SelectPlan => "select_plan",
            Self::SelectTrack => "select_track",
            Self::SubmitPayment => "submit_payment",
            Self::Cancel => "cancel",
            Self::AcknowledgeUnlock => "acknowledge_unlock",
        }
    }
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intents_deserialize_from_presenter_json() {
        let intent: Intent = serde_json::from_str(r#"{"type":"SELECT_PLAN","id":"monthly"}"#).unwrap();
        assert_eq!(intent, Intent::SelectPlan("monthly".to_string()));
        assert_eq!(intent.kind(), IntentKind::SelectPlan);

        let intent: Intent = serde_json::from_str(r#"{"type":"ADVANCE"}"#).unwrap();
        assert_eq!(intent, Intent::Advance);
    }

    #[test]
    fn kinds_display_as_snake_case() {
        assert_eq!(IntentKind::SubmitPayment.to_string(), "submit_payment");
        assert_eq!(Intent::Back.kind().to_string(), "back");
    }
}
