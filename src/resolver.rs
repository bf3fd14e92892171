//! Purchase state to call-to-action resolution.
//!
//! Course cards, the hover panel and the course page all show one button
//! whose meaning depends on the user's relationship with the course. The
//! mapping is total: every [`PurchaseState`] yields exactly one
//! [`ResolvedAction`].
//!
//! # Example
//!
//! ```rust
//! use enrollment_funnel::resolver::{resolve, resolve_raw, PurchaseState, ResolvedAction};
//!
//! let view = resolve(PurchaseState::NotPurchased, true);
//! assert_eq!(view.action, ResolvedAction::AddToCart);
//! assert_eq!(view.label, "Adding...");
//! assert!(view.disabled);
//!
//! assert_eq!(resolve_raw("ENROLLED", false).unwrap().action, ResolvedAction::GoToCourse);
//! assert!(resolve_raw("REFUNDED", false).is_err());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Relationship between a user and a catalog item, owned by the host.
///
/// Deserialization goes through [`FromStr`], so an out-of-set value fails
/// with [`InvalidStateError`] whichever way it enters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum PurchaseState {
    NotPurchased,
    InCart,
    Enrolled,
}

impl PurchaseState {
    pub const ALL: [PurchaseState; 3] = [Self::NotPurchased, Self::InCart, Self::Enrolled];

    /// Derive the state from the host's enrollment and cart lookups.
    /// Enrollment wins when an item is somehow in both.
    pub fn from_membership(enrolled: bool, in_cart: bool) -> Self {
        match (enrolled, in_cart) {
            (true, _) => Self::Enrolled,
            (false, true) => Self::InCart,
            (false, false) => Self::NotPurchased,
        }
    }

    /// Wire name used by the host's cart store.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotPurchased => "NOT_PURCHASED",
            Self::InCart => "IN_CART",
            Self::Enrolled => "ENROLLED",
        }
    }

    /// Short status line shown on course cards.
    pub fn badge(self) -> &'static str {
        match self {
            Self::NotPurchased => "Tap to preview",
            Self::InCart => "🛒 In Cart",
            Self::Enrolled => "✓ Enrolled",
        }
    }
}

impl fmt::Display for PurchaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value outside the closed set of purchase states.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid purchase state '{value}', expected NOT_PURCHASED, IN_CART or ENROLLED")]
pub struct InvalidStateError {
    pub value: String,
}

impl FromStr for PurchaseState {
    type Err = InvalidStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| InvalidStateError {
                value: s.to_string(),
            })
    }
}

impl TryFrom<String> for PurchaseState {
    type Error = InvalidStateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// The single legal action for a purchase state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolvedAction {
    AddToCart,
    GoToCart,
    GoToCourse,
}

/// What a presenter needs to draw the call-to-action button.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ActionView {
    pub action: ResolvedAction,
    pub label: &'static str,
    pub disabled: bool,
}

/// Map a purchase state to its action.
///
/// `loading` only affects `ADD_TO_CART`: while the host's add-to-cart call
/// is in flight the button is disabled and relabelled.
pub fn resolve(state: PurchaseState, loading: bool) -> ActionView {
    match state {
        PurchaseState::NotPurchased => ActionView {
            action: ResolvedAction::AddToCart,
            label: if loading { "Adding..." } else { "Add to Cart" },
            disabled: loading,
        },
        PurchaseState::InCart => ActionView {
            action: ResolvedAction::GoToCart,
            label: "Go to Cart",
            disabled: false,
        },
        PurchaseState::Enrolled => ActionView {
            action: ResolvedAction::GoToCourse,
            label: "Go to Course",
            disabled: false,
        },
    }
}

/// Parse a wire value and resolve it. Unknown values are a caller bug and
/// are reported, never defaulted.
pub fn resolve_raw(raw: &str, loading: bool) -> Result<ActionView, InvalidStateError> {
    let state = raw.parse::<PurchaseState>().inspect_err(|err| {
        tracing::error!(value = %err.value, "purchase state outside the closed set");
    })?;
    Ok(resolve(state, loading))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_purchased_adds_to_cart() {
        let view = resolve(PurchaseState::NotPurchased, false);
        assert_eq!(view.action, ResolvedAction::AddToCart);
        assert_eq!(view.label, "Add to Cart");
        assert!(!view.disabled);
    }

    #[test]
    fn loading_disables_add_to_cart_only() {
        let adding = resolve(PurchaseState::NotPurchased, true);
        assert!(adding.disabled);
        assert_eq!(adding.label, "Adding...");

        assert!(!resolve(PurchaseState::InCart, true).disabled);
        assert!(!resolve(PurchaseState::Enrolled, true).disabled);
    }

    #[test]
    fn in_cart_and_enrolled_navigate() {
        assert_eq!(
            resolve(PurchaseState::InCart, false),
            ActionView {
                action: ResolvedAction::GoToCart,
                label: "Go to Cart",
                disabled: false,
            }
        );
        assert_eq!(
            resolve(PurchaseState::Enrolled, false),
            ActionView {
                action: ResolvedAction::GoToCourse,
                label: "Go to Course",
                disabled: false,
            }
        );
    }

    #[test]
    fn actions_are_distinct_per_state() {
        let actions: Vec<ResolvedAction> = PurchaseState::ALL
            .into_iter()
            .map(|s| resolve(s, false).action)
            .collect();
        assert_eq!(
            actions,
            vec![
                ResolvedAction::AddToCart,
                ResolvedAction::GoToCart,
                ResolvedAction::GoToCourse
            ]
        );
    }

    #[test]
    fn raw_values_parse_exactly() {
        assert_eq!(
            "IN_CART".parse::<PurchaseState>(),
            Ok(PurchaseState::InCart)
        );
        assert_eq!(
            "in_cart".parse::<PurchaseState>(),
            Err(InvalidStateError {
                value: "in_cart".to_string()
            })
        );
        assert!(resolve_raw("", false).is_err());
    }

    #[test]
    fn membership_prefers_enrollment() {
        assert_eq!(
            PurchaseState::from_membership(true, true),
            PurchaseState::Enrolled
        );
        assert_eq!(
            PurchaseState::from_membership(false, true),
            PurchaseState::InCart
        );
        assert_eq!(
            PurchaseState::from_membership(false, false),
            PurchaseState::NotPurchased
        );
    }

    #[test]
    fn serde_uses_wire_names() {
        for state in PurchaseState::ALL {
            let json = serde_json::to_string(&state).unwrap();
            assert_eq!(json, format!("\"{}\"", state.as_str()));
        }
        let view = serde_json::to_value(resolve(PurchaseState::InCart, false)).unwrap();
        assert_eq!(view["action"], "GO_TO_CART");
    }

    #[test]
    fn deserializing_unknown_state_reports_invalid_state() {
        let state: PurchaseState = serde_json::from_str("\"ENROLLED\"").unwrap();
        assert_eq!(state, PurchaseState::Enrolled);

        let err = serde_json::from_str::<PurchaseState>("\"WISHLISTED\"").unwrap_err();
        let expected = InvalidStateError {
            value: "WISHLISTED".to_string(),
        };
        assert!(err.to_string().contains(&expected.to_string()));
    }

    #[test]
    fn badges_match_cards() {
        assert_eq!(PurchaseState::Enrolled.badge(), "✓ Enrolled");
        assert_eq!(PurchaseState::InCart.badge(), "🛒 In Cart");
        assert_eq!(PurchaseState::NotPurchased.badge(), "Tap to preview");
    }
}
