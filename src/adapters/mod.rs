//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `stripe` - Stripe REST API (`SubscriptionProvider`)
//! - `supabase` - PostgREST subscription table (`SubscriptionStore`)
//! - `memory` - In-memory implementations for tests and local runs
//! - `http` - Axum webhook endpoint

pub mod http;
pub mod memory;
pub mod stripe;
pub mod supabase;

pub use memory::{InMemorySubscriptionStore, StaticSubscriptionProvider};
pub use stripe::StripeSubscriptionClient;
pub use supabase::PostgrestSubscriptionStore;
