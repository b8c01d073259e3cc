//! Billing handlers.
//!
//! Stripe webhook ingestion:
//! - `HandleStripeWebhookHandler` verifies, parses and applies the failure policy
//! - `WebhookDispatcher` routes each event type to its reconciliation
//! - `SubscriptionReconciler` performs the store writes

mod dispatcher;
mod handle_stripe_webhook;
mod reconciler;

pub use dispatcher::{DispatchOutcome, WebhookDispatcher};
pub use handle_stripe_webhook::{
    HandleStripeWebhookCommand, HandleStripeWebhookHandler, HandleStripeWebhookResult,
};
pub use reconciler::SubscriptionReconciler;
