//! The mirrored subscription row and the patches applied to it.

use serde::{Deserialize, Serialize};

use super::{StripeSubscription, SubscriptionStatus};
use crate::domain::foundation::{StateMachine, Timestamp, ValidationError};

/// One row of the subscription table, keyed by `stripe_subscription_id`.
///
/// `user_id`, the Stripe identifiers and `subscription_tier` are fixed at
/// creation. Everything else is overwritten from Stripe on reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    pub user_id: String,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: String,
    pub stripe_price_id: Option<String>,
    pub subscription_tier: Option<String>,
    pub status: SubscriptionStatus,
    pub trial_end: Option<Timestamp>,
    pub current_period_start: Option<Timestamp>,
    pub current_period_end: Option<Timestamp>,
    #[serde(default)]
    pub cancel_at_period_end: bool,
}

impl SubscriptionRecord {
    /// Builds the row written when a checkout completes.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyField` if `user_id` is blank.
    pub fn from_checkout(
        user_id: impl Into<String>,
        tier: Option<String>,
        customer_id: Option<String>,
        subscription: &StripeSubscription,
    ) -> Result<Self, ValidationError> {
        let user_id = user_id.into();
        if user_id.trim().is_empty() {
            return Err(ValidationError::empty_field("user_id"));
        }

        let snapshot = SubscriptionSnapshot::from_subscription(subscription);
        Ok(Self {
            user_id,
            stripe_customer_id: customer_id.or_else(|| subscription.customer.clone()),
            stripe_subscription_id: subscription.id.clone(),
            stripe_price_id: snapshot.stripe_price_id,
            subscription_tier: tier,
            status: snapshot.status,
            trial_end: snapshot.trial_end,
            current_period_start: snapshot.current_period_start,
            current_period_end: snapshot.current_period_end,
            cancel_at_period_end: snapshot.cancel_at_period_end,
        })
    }

    /// Overwrites the fields a patch carries.
    ///
    /// Stripe is authoritative, so a transition the state machine does not
    /// know is still applied. It is logged so that drift shows up.
    pub fn apply(&mut self, patch: &SubscriptionPatch) {
        let target = patch.status();
        if &self.status != target && !self.status.can_transition_to(target) {
            tracing::warn!(
                stripe_subscription_id = %self.stripe_subscription_id,
                from = %self.status,
                to = %target,
                "Subscription status transition outside lifecycle"
            );
        }

        match patch {
            SubscriptionPatch::Sync(snapshot) => {
                self.status = snapshot.status.clone();
                if let Some(price_id) = &snapshot.stripe_price_id {
                    self.stripe_price_id = Some(price_id.clone());
                }
                self.trial_end = snapshot.trial_end;
                self.current_period_start = snapshot.current_period_start;
                self.current_period_end = snapshot.current_period_end;
                self.cancel_at_period_end = snapshot.cancel_at_period_end;
            }
            SubscriptionPatch::Status { status } => {
                self.status = status.clone();
            }
        }
    }

    /// Returns true if the row grants premium access at `now`.
    ///
    /// Requires an active or trialing status. When the relevant end date is
    /// known (trial end while trialing, else period end) it must be in the future.
    pub fn is_premium(&self, now: Timestamp) -> bool {
        if !self.status.has_access() {
            return false;
        }

        let ends_at = match self.status {
            SubscriptionStatus::Trialing => self.trial_end.or(self.current_period_end),
            _ => self.current_period_end,
        };

        ends_at.map_or(true, |end| end.is_after(&now))
    }
}

/// Provider-owned fields of a subscription at one moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionSnapshot {
    pub status: SubscriptionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stripe_price_id: Option<String>,
    pub trial_end: Option<Timestamp>,
    pub current_period_start: Option<Timestamp>,
    pub current_period_end: Option<Timestamp>,
    pub cancel_at_period_end: bool,
}

impl SubscriptionSnapshot {
    /// Extracts the mirrored fields, converting epoch seconds to timestamps.
    pub fn from_subscription(subscription: &StripeSubscription) -> Self {
        Self {
            status: subscription.status.clone(),
            stripe_price_id: subscription.price_id().map(str::to_string),
            trial_end: subscription.trial_end.and_then(Timestamp::from_unix_secs),
            current_period_start: subscription
                .period_start()
                .and_then(Timestamp::from_unix_secs),
            current_period_end: subscription.period_end().and_then(Timestamp::from_unix_secs),
            cancel_at_period_end: subscription.cancel_at_period_end,
        }
    }
}

/// Partial update of an existing row.
///
/// Serializes to exactly the JSON body sent to the storage API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SubscriptionPatch {
    /// Full provider field set (`customer.subscription.updated`).
    Sync(SubscriptionSnapshot),

    /// Status only (`customer.subscription.deleted`, `invoice.payment_failed`).
    Status { status: SubscriptionStatus },
}

impl SubscriptionPatch {
    pub fn status_only(status: SubscriptionStatus) -> Self {
        SubscriptionPatch::Status { status }
    }

    /// Status this patch writes.
    pub fn status(&self) -> &SubscriptionStatus {
        match self {
            SubscriptionPatch::Sync(snapshot) => &snapshot.status,
            SubscriptionPatch::Status { status } => status,
        }
    }
}
