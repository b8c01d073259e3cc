//! WebhookDispatcher - routes a verified Stripe event to its reconciliation.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use super::reconciler::SubscriptionReconciler;
use crate::domain::billing::{
    CheckoutSession, Invoice, ObjectRef, StripeEvent, StripeEventType, StripeSubscription,
    SubscriptionPatch, SubscriptionRecord, SubscriptionSnapshot, SubscriptionStatus, WebhookError,
};
use crate::ports::SubscriptionProvider;

/// What dispatching one event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A checkout produced (or refreshed) a subscription row.
    Inserted { stripe_subscription_id: String },

    /// An existing row was patched. `rows` is the store's affected count, if reported.
    Patched {
        stripe_subscription_id: String,
        rows: Option<u64>,
    },

    /// A recognised event that needs no write.
    Skipped(&'static str),

    /// An event type we do not handle.
    Ignored(String),
}

/// Routes events by `type` to exactly one handler.
///
/// | Type | Action |
/// |---|---|
/// | `checkout.session.completed` | fetch subscription, upsert row |
/// | `customer.subscription.updated` | patch full field set |
/// | `customer.subscription.deleted` | patch `status = canceled` |
/// | `invoice.payment_failed` | patch `status = past_due` if the invoice has a subscription |
/// | anything else | acknowledge |
pub struct WebhookDispatcher {
    provider: Arc<dyn SubscriptionProvider>,
    reconciler: SubscriptionReconciler,
}

impl WebhookDispatcher {
    pub fn new(provider: Arc<dyn SubscriptionProvider>, reconciler: SubscriptionReconciler) -> Self {
        Self {
            provider,
            reconciler,
        }
    }

    /// Dispatch a verified event.
    ///
    /// # Errors
    ///
    /// - `Upstream` if the subscription fetch for a checkout fails
    /// - `Storage` if the reconciliation write fails
    pub async fn dispatch(&self, event: &StripeEvent) -> Result<DispatchOutcome, WebhookError> {
        match event.parsed_type() {
            StripeEventType::CheckoutSessionCompleted => self.checkout_completed(event).await,
            StripeEventType::CustomerSubscriptionUpdated => self.subscription_updated(event).await,
            StripeEventType::CustomerSubscriptionDeleted => self.subscription_deleted(event).await,
            StripeEventType::InvoicePaymentFailed => self.invoice_payment_failed(event).await,
            StripeEventType::Unknown(event_type) => {
                tracing::info!(event_type = %event_type, "Ignoring unhandled event type");
                Ok(DispatchOutcome::Ignored(event_type))
            }
        }
    }

    async fn checkout_completed(&self, event: &StripeEvent) -> Result<DispatchOutcome, WebhookError> {
        let Some(session) = decode::<CheckoutSession>(event) else {
            return Ok(DispatchOutcome::Skipped("undecodable checkout session"));
        };

        let Some(subscription_id) = session.subscription.as_deref() else {
            tracing::info!(checkout_session_id = %session.id, "Checkout without subscription; nothing to persist");
            return Ok(DispatchOutcome::Skipped("checkout has no subscription"));
        };

        let Some(user_id) = session.user_id() else {
            tracing::warn!(
                checkout_session_id = %session.id,
                stripe_subscription_id = %subscription_id,
                "Checkout metadata has no user_id; cannot attribute subscription"
            );
            return Ok(DispatchOutcome::Skipped("checkout has no user_id"));
        };

        let subscription = self
            .provider
            .get_subscription(subscription_id)
            .await
            .map_err(|e| {
                tracing::error!(
                    stripe_subscription_id = %subscription_id,
                    error = %e,
                    "Failed to fetch subscription from Stripe"
                );
                WebhookError::from(e)
            })?;

        let record = SubscriptionRecord::from_checkout(
            user_id,
            session.tier().map(str::to_string),
            session.customer.clone(),
            &subscription,
        )
        .map_err(|e| WebhookError::ParseError(e.to_string()))?;

        self.reconciler.create(&record).await?;
        Ok(DispatchOutcome::Inserted {
            stripe_subscription_id: record.stripe_subscription_id,
        })
    }

    async fn subscription_updated(&self, event: &StripeEvent) -> Result<DispatchOutcome, WebhookError> {
        let Some(subscription) = decode::<StripeSubscription>(event) else {
            return Ok(DispatchOutcome::Skipped("undecodable subscription"));
        };

        let patch = SubscriptionPatch::Sync(SubscriptionSnapshot::from_subscription(&subscription));
        self.patch(subscription.id, patch).await
    }

    async fn subscription_deleted(&self, event: &StripeEvent) -> Result<DispatchOutcome, WebhookError> {
        let Some(subscription) = decode::<ObjectRef>(event) else {
            return Ok(DispatchOutcome::Skipped("undecodable subscription"));
        };

        let patch = SubscriptionPatch::status_only(SubscriptionStatus::Canceled);
        self.patch(subscription.id, patch).await
    }

    async fn invoice_payment_failed(&self, event: &StripeEvent) -> Result<DispatchOutcome, WebhookError> {
        let Some(invoice) = decode::<Invoice>(event) else {
            return Ok(DispatchOutcome::Skipped("undecodable invoice"));
        };

        let Some(subscription_id) = invoice.subscription_id() else {
            tracing::info!(invoice_id = ?invoice.id, "Invoice has no subscription; nothing to patch");
            return Ok(DispatchOutcome::Skipped("invoice has no subscription"));
        };

        let patch = SubscriptionPatch::status_only(SubscriptionStatus::PastDue);
        self.patch(subscription_id.to_string(), patch).await
    }

    async fn patch(
        &self,
        subscription_id: String,
        patch: SubscriptionPatch,
    ) -> Result<DispatchOutcome, WebhookError> {
        let rows = self.reconciler.patch(&subscription_id, &patch).await?;
        Ok(DispatchOutcome::Patched {
            stripe_subscription_id: subscription_id,
            rows,
        })
    }
}

/// Decode `data.object`, logging and returning `None` on mismatch.
///
/// Redelivering a malformed provider object cannot fix it, so callers
/// acknowledge instead of failing.
fn decode<T: DeserializeOwned>(event: &StripeEvent) -> Option<T> {
    match event.deserialize_object::<T>() {
        Ok(object) => Some(object),
        Err(e) => {
            tracing::warn!(
                event_type = %event.event_type,
                error = %e,
                "Event object does not match expected shape"
            );
            None
        }
    }
}
