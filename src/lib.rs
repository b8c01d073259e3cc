//! Subscription Sync - Stripe webhook ingestion and subscription reconciliation
//!
//! Verifies Stripe webhook deliveries and keeps a PostgREST-backed
//! subscription table consistent with Stripe's view of each subscription.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
