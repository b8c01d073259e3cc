//! PostgREST-backed subscription store.
//!
//! Talks to a Supabase project's REST endpoint with the service role key.
//! Upserts use `on_conflict` on `stripe_subscription_id`; patches filter on
//! the same column and ask PostgREST for an exact affected-row count.

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

use crate::config::StorageConfig;
use crate::domain::billing::{SubscriptionPatch, SubscriptionRecord};
use crate::ports::{StoreError, SubscriptionStore};

const KEY_COLUMN: &str = "stripe_subscription_id";

/// Reqwest-backed implementation of `SubscriptionStore`.
pub struct PostgrestSubscriptionStore {
    table_url: String,
    service_role_key: SecretString,
    http_client: reqwest::Client,
}

impl PostgrestSubscriptionStore {
    /// Create a store for `{base_url}/rest/v1/{table}`.
    ///
    /// # Errors
    ///
    /// Returns the reqwest error if the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        service_role_key: impl Into<String>,
        table: &str,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            table_url: format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), table),
            service_role_key: SecretString::new(service_role_key.into()),
            http_client,
        })
    }

    /// Create a store from validated storage configuration.
    pub fn from_config(config: &StorageConfig) -> Result<Self, reqwest::Error> {
        Self::new(
            &config.url,
            config.service_role_key.clone(),
            &config.table,
            config.http_timeout(),
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let key = self.service_role_key.expose_secret();
        request.header("apikey", key).bearer_auth(key)
    }

    async fn send(&self, request: RequestBuilder, operation: &'static str) -> Result<Response, StoreError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                operation,
                status = status.as_u16(),
                error = %body,
                "Subscription store request failed"
            );
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl SubscriptionStore for PostgrestSubscriptionStore {
    async fn upsert(&self, record: &SubscriptionRecord) -> Result<(), StoreError> {
        let request = self
            .http_client
            .post(&self.table_url)
            .query(&[("on_conflict", KEY_COLUMN)])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(record);

        self.send(request, "upsert").await?;
        Ok(())
    }

    async fn patch_by_subscription_id(
        &self,
        subscription_id: &str,
        patch: &SubscriptionPatch,
    ) -> Result<Option<u64>, StoreError> {
        let request = self
            .http_client
            .patch(&self.table_url)
            .query(&[(KEY_COLUMN, format!("eq.{}", subscription_id))])
            .header("Prefer", "return=minimal,count=exact")
            .json(patch);

        let response = self.send(request, "patch").await?;

        Ok(response
            .headers()
            .get(reqwest::header::CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range))
    }

    async fn find_by_subscription_id(
        &self,
        subscription_id: &str,
    ) -> Result<Option<SubscriptionRecord>, StoreError> {
        let request = self.http_client.get(&self.table_url).query(&[
            (KEY_COLUMN, format!("eq.{}", subscription_id)),
            ("select", "*".to_string()),
            ("limit", "1".to_string()),
        ]);

        let response = self.send(request, "find").await?;
        let rows: Vec<SubscriptionRecord> = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        Ok(rows.into_iter().next())
    }
}

/// Affected-row count from a PostgREST `Content-Range` header.
///
/// Accepts `*/N` and `a-b/N`; when the total is `*` the range width is used.
fn parse_content_range(value: &str) -> Option<u64> {
    let (range, total) = value.trim().split_once('/')?;

    if let Ok(total) = total.parse::<u64>() {
        return Some(total);
    }

    match range.split_once('-') {
        Some((start, end)) => {
            let start: u64 = start.parse().ok()?;
            let end: u64 = end.parse().ok()?;
            end.checked_sub(start).and_then(|width| width.checked_add(1))
        }
        None if range == "*" => Some(0),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::{SubscriptionStatus, SubscriptionSnapshot};
    use crate::domain::foundation::Timestamp;
    use mockito::{Matcher, ServerGuard};
    use serde_json::json;

    const SERVICE_KEY: &str = "service-role-test";

    fn store_for(server: &ServerGuard) -> PostgrestSubscriptionStore {
        PostgrestSubscriptionStore::new(
            &server.url(),
            SERVICE_KEY,
            "subscriptions",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn record() -> SubscriptionRecord {
        SubscriptionRecord {
            user_id: "user-1".to_string(),
            stripe_customer_id: Some("cus_123".to_string()),
            stripe_subscription_id: "sub_123".to_string(),
            stripe_price_id: Some("price_pro".to_string()),
            subscription_tier: Some("pro".to_string()),
            status: SubscriptionStatus::Active,
            trial_end: None,
            current_period_start: Timestamp::from_unix_secs(1700000000),
            current_period_end: Timestamp::from_unix_secs(1702592000),
            cancel_at_period_end: false,
        }
    }

    // ══════════════════════════════════════════════════════════════
    // Upsert Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn upsert_posts_with_conflict_target_and_auth() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/rest/v1/subscriptions")
            .match_query(Matcher::UrlEncoded(
                "on_conflict".into(),
                "stripe_subscription_id".into(),
            ))
            .match_header("apikey", SERVICE_KEY)
            .match_header("authorization", Matcher::Exact(format!("Bearer {}", SERVICE_KEY)))
            .match_header("prefer", "resolution=merge-duplicates,return=minimal")
            .match_body(Matcher::PartialJson(json!({
                "user_id": "user-1",
                "stripe_subscription_id": "sub_123",
                "status": "active",
                "subscription_tier": "pro",
                "current_period_start": "2023-11-14T22:13:20Z",
                "trial_end": null
            })))
            .with_status(201)
            .create_async()
            .await;

        store_for(&server).upsert(&record()).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn upsert_surfaces_rejection() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/rest/v1/subscriptions")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"message":"Invalid API key"}"#)
            .create_async()
            .await;

        let result = store_for(&server).upsert(&record()).await;

        assert!(matches!(result, Err(StoreError::Status { status: 401, .. })));
    }

    // ══════════════════════════════════════════════════════════════
    // Patch Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn patch_filters_by_subscription_id_and_reads_count() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PATCH", "/rest/v1/subscriptions")
            .match_query(Matcher::UrlEncoded(
                "stripe_subscription_id".into(),
                "eq.sub_123".into(),
            ))
            .match_header("prefer", "return=minimal,count=exact")
            .match_body(Matcher::Json(json!({"status": "canceled"})))
            .with_status(204)
            .with_header("content-range", "*/1")
            .create_async()
            .await;

        let rows = store_for(&server)
            .patch_by_subscription_id(
                "sub_123",
                &SubscriptionPatch::status_only(SubscriptionStatus::Canceled),
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(rows, Some(1));
    }

    #[tokio::test]
    async fn patch_with_no_matching_row_reports_zero() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PATCH", "/rest/v1/subscriptions")
            .match_query(Matcher::Any)
            .with_status(204)
            .with_header("content-range", "*/0")
            .create_async()
            .await;

        let rows = store_for(&server)
            .patch_by_subscription_id(
                "sub_unknown",
                &SubscriptionPatch::status_only(SubscriptionStatus::Canceled),
            )
            .await
            .unwrap();

        assert_eq!(rows, Some(0));
    }

    #[tokio::test]
    async fn patch_with_unrepresentable_range_width_reports_unknown_count() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PATCH", "/rest/v1/subscriptions")
            .match_query(Matcher::Any)
            .with_status(204)
            .with_header("content-range", "0-18446744073709551615/*")
            .create_async()
            .await;

        let rows = store_for(&server)
            .patch_by_subscription_id(
                "sub_123",
                &SubscriptionPatch::status_only(SubscriptionStatus::Canceled),
            )
            .await
            .unwrap();

        assert_eq!(rows, None);
    }

    #[tokio::test]
    async fn patch_sends_full_snapshot() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PATCH", "/rest/v1/subscriptions")
            .match_query(Matcher::Any)
            .match_body(Matcher::Json(json!({
                "status": "past_due",
                "trial_end": null,
                "current_period_start": null,
                "current_period_end": null,
                "cancel_at_period_end": true
            })))
            .with_status(204)
            .create_async()
            .await;

        let snapshot = SubscriptionSnapshot {
            status: SubscriptionStatus::PastDue,
            stripe_price_id: None,
            trial_end: None,
            current_period_start: None,
            current_period_end: None,
            cancel_at_period_end: true,
        };
        let rows = store_for(&server)
            .patch_by_subscription_id("sub_123", &SubscriptionPatch::Sync(snapshot))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(rows, None);
    }

    // ══════════════════════════════════════════════════════════════
    // Find Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn find_decodes_first_row() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/v1/subscriptions")
            .match_query(Matcher::UrlEncoded(
                "stripe_subscription_id".into(),
                "eq.sub_123".into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!([{
                    "id": 7,
                    "user_id": "user-1",
                    "stripe_customer_id": "cus_123",
                    "stripe_subscription_id": "sub_123",
                    "stripe_price_id": "price_pro",
                    "subscription_tier": "pro",
                    "status": "active",
                    "trial_end": null,
                    "current_period_start": "2023-11-14T22:13:20+00:00",
                    "current_period_end": "2023-12-14T22:13:20+00:00",
                    "cancel_at_period_end": false,
                    "created_at": "2023-11-14T22:13:21.123456+00:00"
                }])
                .to_string(),
            )
            .create_async()
            .await;

        let found = store_for(&server).find_by_subscription_id("sub_123").await.unwrap();

        assert_eq!(found, Some(record()));
    }

    #[tokio::test]
    async fn find_returns_none_for_empty_result() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/v1/subscriptions")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let found = store_for(&server).find_by_subscription_id("sub_none").await.unwrap();

        assert!(found.is_none());
    }

    // ══════════════════════════════════════════════════════════════
    // Content-Range Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn content_range_reads_total() {
        assert_eq!(parse_content_range("*/3"), Some(3));
        assert_eq!(parse_content_range("0-2/3"), Some(3));
        assert_eq!(parse_content_range("*/0"), Some(0));
    }

    #[test]
    fn content_range_falls_back_to_width() {
        assert_eq!(parse_content_range("0-4/*"), Some(5));
        assert_eq!(parse_content_range("*/*"), Some(0));
    }

    #[test]
    fn content_range_width_overflow_is_none() {
        assert_eq!(parse_content_range("0-18446744073709551615/*"), None);
        assert_eq!(parse_content_range("1-18446744073709551615/*"), Some(u64::MAX));
    }

    #[test]
    fn content_range_rejects_garbage() {
        assert_eq!(parse_content_range("bytes"), None);
        assert_eq!(parse_content_range("x-y/*"), None);
    }
}
