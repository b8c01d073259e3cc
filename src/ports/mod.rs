//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `SubscriptionStore` - the table mirroring Stripe subscriptions
//! - `SubscriptionProvider` - read access to Stripe's subscription resource

mod subscription_provider;
mod subscription_store;

pub use subscription_provider::{ProviderError, SubscriptionProvider};
pub use subscription_store::{StoreError, SubscriptionStore};
