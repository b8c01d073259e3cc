//! Subscription provider port.
//!
//! Read-only access to the payment provider's subscription resource. Used
//! when a webhook carries only an id and the full object is needed.

use crate::domain::billing::{StripeSubscription, WebhookError};
use async_trait::async_trait;
use thiserror::Error;

/// Port for fetching subscriptions from the payment provider.
#[async_trait]
pub trait SubscriptionProvider: Send + Sync {
    /// Fetch the full subscription object.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the provider does not know the id
    /// - `Status` for any other non-2xx answer
    /// - `Network` / `Decode` for transport and body failures
    async fn get_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<StripeSubscription, ProviderError>;
}

/// Errors from the payment provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("provider unreachable: {0}")]
    Network(String),

    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("provider response could not be decoded: {0}")]
    Decode(String),

    #[error("subscription not found: {0}")]
    NotFound(String),
}

impl From<ProviderError> for WebhookError {
    fn from(err: ProviderError) -> Self {
        WebhookError::Upstream(err.to_string())
    }
}
