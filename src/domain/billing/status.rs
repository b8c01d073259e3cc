//! Subscription status state machine.
//!
//! Mirrors the `status` field of a Stripe subscription. The named variants
//! are the values Stripe documents today; anything else is carried through
//! verbatim so a new provider status never breaks reconciliation.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a mirrored Stripe subscription.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SubscriptionStatus {
    /// First payment has not completed yet.
    Incomplete,

    /// First payment never completed. Terminal.
    IncompleteExpired,

    /// Free trial period.
    Trialing,

    /// Paid and in good standing.
    Active,

    /// Latest renewal payment failed; Stripe is retrying.
    PastDue,

    /// Retries exhausted without cancelling.
    Unpaid,

    /// Trial ended without a payment method.
    Paused,

    /// Subscription ended. Terminal; the row is retained.
    Canceled,

    /// Any status not listed above, stored as received.
    Other(String),
}

impl SubscriptionStatus {
    /// Returns the Stripe wire name of this status.
    pub fn as_str(&self) -> &str {
        match self {
            SubscriptionStatus::Incomplete => "incomplete",
            SubscriptionStatus::IncompleteExpired => "incomplete_expired",
            SubscriptionStatus::Trialing => "trialing",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Unpaid => "unpaid",
            SubscriptionStatus::Paused => "paused",
            SubscriptionStatus::Canceled => "canceled",
            SubscriptionStatus::Other(raw) => raw,
        }
    }

    /// Returns true if this status grants premium access.
    pub fn has_access(&self) -> bool {
        matches!(self, SubscriptionStatus::Active | SubscriptionStatus::Trialing)
    }

    fn known() -> Vec<Self> {
        use SubscriptionStatus::*;
        vec![
            Incomplete,
            IncompleteExpired,
            Trialing,
            Active,
            PastDue,
            Unpaid,
            Paused,
            Canceled,
        ]
    }
}

impl From<String> for SubscriptionStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "incomplete" => SubscriptionStatus::Incomplete,
            "incomplete_expired" => SubscriptionStatus::IncompleteExpired,
            "trialing" => SubscriptionStatus::Trialing,
            "active" => SubscriptionStatus::Active,
            "past_due" => SubscriptionStatus::PastDue,
            "unpaid" => SubscriptionStatus::Unpaid,
            "paused" => SubscriptionStatus::Paused,
            "canceled" => SubscriptionStatus::Canceled,
            _ => SubscriptionStatus::Other(raw),
        }
    }
}

impl From<&str> for SubscriptionStatus {
    fn from(raw: &str) -> Self {
        SubscriptionStatus::from(raw.to_string())
    }
}

impl From<SubscriptionStatus> for String {
    fn from(status: SubscriptionStatus) -> Self {
        match status {
            SubscriptionStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StateMachine for SubscriptionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SubscriptionStatus::*;
        match (self, target) {
            (Canceled | IncompleteExpired, _) => false,
            // Unknown statuses are opaque; only terminal states constrain them
            (Other(_), _) | (_, Other(_)) => true,
            _ => matches!(
                (self, target),
                // From INCOMPLETE
                (Incomplete, Trialing)
                    | (Incomplete, Active)
                    | (Incomplete, IncompleteExpired)
                    | (Incomplete, Canceled)
                // From TRIALING
                    | (Trialing, Active)
                    | (Trialing, PastDue)
                    | (Trialing, Unpaid)
                    | (Trialing, Paused)
                    | (Trialing, Canceled)
                // From ACTIVE
                    | (Active, PastDue)
                    | (Active, Unpaid)
                    | (Active, Paused)
                    | (Active, Canceled)
                // From PAST_DUE
                    | (PastDue, Active) // Recovered
                    | (PastDue, Unpaid)
                    | (PastDue, Canceled)
                // From UNPAID
                    | (Unpaid, Active)
                    | (Unpaid, Canceled)
                // From PAUSED
                    | (Paused, Active)
                    | (Paused, Canceled)
            ),
        }
    }

    fn valid_transitions(&self) -> Vec<Self> {
        Self::known()
            .into_iter()
            .filter(|target| self.can_transition_to(target))
            .collect()
    }
}
