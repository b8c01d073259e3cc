//! Billing domain - Stripe webhooks and mirrored subscription state.
//!
//! Stripe is the source of truth for subscription state. This module holds
//! the pure pieces of keeping a local copy in step with it:
//!
//! - `webhook_verifier`: `Stripe-Signature` parsing and HMAC-SHA256 checks
//! - `stripe_event` / `stripe_objects`: the event envelope and the objects we read
//! - `status`: the subscription status state machine
//! - `subscription`: the persisted row and the patches applied to it
//! - `failure_policy`: what to answer Stripe when processing fails

mod failure_policy;
mod status;
mod stripe_event;
mod stripe_objects;
mod subscription;
mod webhook_errors;
mod webhook_verifier;

pub use failure_policy::FailurePolicy;
pub use status::SubscriptionStatus;
pub use stripe_event::{StripeEvent, StripeEventData, StripeEventType};
pub use stripe_objects::{
    CheckoutSession, Invoice, InvoiceParent, InvoiceSubscriptionDetails, ObjectRef, StripePrice,
    StripeSubscription, StripeSubscriptionItem, StripeSubscriptionItems,
};
pub use subscription::{SubscriptionPatch, SubscriptionRecord, SubscriptionSnapshot};
pub use webhook_errors::WebhookError;
pub use webhook_verifier::{sign_payload, SignatureHeader, StripeWebhookVerifier};

#[cfg(test)]
pub use stripe_event::StripeEventBuilder;
