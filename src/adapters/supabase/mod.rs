//! Supabase adapter.
//!
//! Persists subscription rows through the project's PostgREST API.

mod postgrest_store;

pub use postgrest_store::PostgrestSubscriptionStore;
