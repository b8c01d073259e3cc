//! Application handlers.
//!
//! Command handlers that orchestrate domain operations.

pub mod billing;

pub use billing::{
    DispatchOutcome, HandleStripeWebhookCommand, HandleStripeWebhookHandler,
    HandleStripeWebhookResult, SubscriptionReconciler, WebhookDispatcher,
};
