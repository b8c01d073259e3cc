//! Stripe adapter.
//!
//! Reads subscriptions from the Stripe REST API.

mod subscription_client;

pub use subscription_client::StripeSubscriptionClient;
