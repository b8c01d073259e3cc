//! Stripe subscription client.
//!
//! Implements `SubscriptionProvider` against `GET /v1/subscriptions/{id}`.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

use crate::config::PaymentConfig;
use crate::domain::billing::StripeSubscription;
use crate::ports::{ProviderError, SubscriptionProvider};

/// Reqwest-backed reader for Stripe subscriptions.
pub struct StripeSubscriptionClient {
    api_key: SecretString,
    api_base_url: String,
    http_client: reqwest::Client,
}

impl StripeSubscriptionClient {
    /// Create a client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns the reqwest error if the HTTP client cannot be built
    /// (e.g. TLS backend initialisation fails).
    pub fn new(
        api_key: impl Into<String>,
        api_base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_key: SecretString::new(api_key.into()),
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            http_client,
        })
    }

    /// Create a client from validated payment configuration.
    pub fn from_config(config: &PaymentConfig) -> Result<Self, reqwest::Error> {
        Self::new(
            config.stripe_api_key.clone(),
            config.stripe_api_base_url.clone(),
            config.http_timeout(),
        )
    }
}

#[async_trait]
impl SubscriptionProvider for StripeSubscriptionClient {
    async fn get_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<StripeSubscription, ProviderError> {
        let url = format!("{}/v1/subscriptions/{}", self.api_base_url, subscription_id);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(self.api_key.expose_secret())
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound(subscription_id.to_string()));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                stripe_subscription_id = %subscription_id,
                status = status.as_u16(),
                error = %body,
                "Stripe get_subscription failed"
            );
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<StripeSubscription>()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))
    }
}
