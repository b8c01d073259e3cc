//! In-memory adapters for tests and local development.

mod subscription_provider;
mod subscription_store;

pub use subscription_provider::StaticSubscriptionProvider;
pub use subscription_store::InMemorySubscriptionStore;
