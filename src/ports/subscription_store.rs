//! Subscription store port.
//!
//! Defines the contract for the table that mirrors Stripe subscriptions.
//! Rows are keyed by `stripe_subscription_id` and never hard-deleted.
//!
//! # Design
//!
//! - **Upsert on create**: a redelivered checkout converges on the same row
//! - **Blind patches**: updates match by subscription id; zero matches is not an error
//! - **Last write wins**: no ordering between concurrent deliveries is enforced

use crate::domain::billing::{SubscriptionPatch, SubscriptionRecord};
use async_trait::async_trait;
use thiserror::Error;

/// Port for subscription row persistence.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Insert a row, or overwrite the row with the same `stripe_subscription_id`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write is rejected or the store is unreachable.
    async fn upsert(&self, record: &SubscriptionRecord) -> Result<(), StoreError>;

    /// Overwrite the patch's fields on the row matching `subscription_id`.
    ///
    /// Returns the number of rows affected when the store reports it.
    /// `Some(0)` means no row matched.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write is rejected or the store is unreachable.
    async fn patch_by_subscription_id(
        &self,
        subscription_id: &str,
        patch: &SubscriptionPatch,
    ) -> Result<Option<u64>, StoreError>;

    /// Look up a row by `stripe_subscription_id`.
    async fn find_by_subscription_id(
        &self,
        subscription_id: &str,
    ) -> Result<Option<SubscriptionRecord>, StoreError>;
}

/// Errors from the subscription store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Transport failure (connect, timeout, reset).
    #[error("storage unreachable: {0}")]
    Network(String),

    /// Store answered with a non-success status.
    #[error("storage returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Store answered with a body we could not read.
    #[error("storage response could not be decoded: {0}")]
    Decode(String),
}

impl From<StoreError> for crate::domain::billing::WebhookError {
    fn from(err: StoreError) -> Self {
        crate::domain::billing::WebhookError::Storage(err.to_string())
    }
}
