//! Static subscription provider for testing.
//!
//! Serves pre-registered Stripe subscriptions and records every lookup.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::billing::StripeSubscription;
use crate::ports::{ProviderError, SubscriptionProvider};

#[derive(Debug, Default)]
struct ProviderState {
    subscriptions: HashMap<String, StripeSubscription>,
    failure: Option<ProviderError>,
    calls: Vec<String>,
}

/// `SubscriptionProvider` answering from a fixed set of subscriptions.
#[derive(Debug, Clone, Default)]
pub struct StaticSubscriptionProvider {
    inner: Arc<RwLock<ProviderState>>,
}

impl StaticSubscriptionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscription to be returned by id.
    pub async fn insert(&self, subscription: StripeSubscription) {
        let mut state = self.inner.write().await;
        state
            .subscriptions
            .insert(subscription.id.clone(), subscription);
    }

    /// Make every lookup fail with `error` (`None` to recover).
    pub async fn set_failure(&self, error: Option<ProviderError>) {
        self.inner.write().await.failure = error;
    }

    /// Ids requested so far, in order.
    pub async fn calls(&self) -> Vec<String> {
        self.inner.read().await.calls.clone()
    }
}

#[async_trait]
impl SubscriptionProvider for StaticSubscriptionProvider {
    async fn get_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<StripeSubscription, ProviderError> {
        let mut state = self.inner.write().await;
        state.calls.push(subscription_id.to_string());

        if let Some(error) = state.failure.clone() {
            return Err(error);
        }

        state
            .subscriptions
            .get(subscription_id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(subscription_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscription(id: &str) -> StripeSubscription {
        serde_json::from_value(serde_json::json!({"id": id, "status": "active"})).unwrap()
    }

    #[tokio::test]
    async fn returns_registered_subscription() {
        let provider = StaticSubscriptionProvider::new();
        provider.insert(subscription("sub_1")).await;

        let sub = provider.get_subscription("sub_1").await.unwrap();

        assert_eq!(sub.id, "sub_1");
        assert_eq!(provider.calls().await, vec!["sub_1".to_string()]);
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let provider = StaticSubscriptionProvider::new();

        let result = provider.get_subscription("sub_x").await;

        assert_eq!(result.unwrap_err(), ProviderError::NotFound("sub_x".to_string()));
    }

    #[tokio::test]
    async fn injected_failure_wins() {
        let provider = StaticSubscriptionProvider::new();
        provider.insert(subscription("sub_1")).await;
        provider
            .set_failure(Some(ProviderError::Network("timeout".to_string())))
            .await;

        let result = provider.get_subscription("sub_1").await;

        assert!(matches!(result, Err(ProviderError::Network(_))));
    }
}
