//! SubscriptionReconciler - writes mirrored Stripe state to the subscription table.

use std::sync::Arc;

use crate::domain::billing::{SubscriptionPatch, SubscriptionRecord, WebhookError};
use crate::ports::SubscriptionStore;

/// Applies one reconciliation write per event.
///
/// Creates go through an upsert so a redelivered checkout lands on the
/// existing row. Patches match by `stripe_subscription_id` and are blind
/// overwrites: the last delivery processed wins.
pub struct SubscriptionReconciler {
    store: Arc<dyn SubscriptionStore>,
}

impl SubscriptionReconciler {
    pub fn new(store: Arc<dyn SubscriptionStore>) -> Self {
        Self { store }
    }

    /// Insert the row for a completed checkout, or overwrite it on redelivery.
    ///
    /// # Errors
    ///
    /// Returns `WebhookError::Storage` if the store rejects the write.
    pub async fn create(&self, record: &SubscriptionRecord) -> Result<(), WebhookError> {
        self.store.upsert(record).await.map_err(|e| {
            tracing::error!(
                stripe_subscription_id = %record.stripe_subscription_id,
                error = %e,
                "Failed to upsert subscription"
            );
            WebhookError::from(e)
        })?;

        tracing::info!(
            stripe_subscription_id = %record.stripe_subscription_id,
            user_id = %record.user_id,
            status = %record.status,
            "Subscription row upserted"
        );
        Ok(())
    }

    /// Overwrite the patch's fields on the row for `subscription_id`.
    ///
    /// Returns the affected-row count when the store reports one. A patch
    /// that matches nothing is logged and treated as success.
    ///
    /// # Errors
    ///
    /// Returns `WebhookError::Storage` if the store rejects the write.
    pub async fn patch(
        &self,
        subscription_id: &str,
        patch: &SubscriptionPatch,
    ) -> Result<Option<u64>, WebhookError> {
        let rows = self
            .store
            .patch_by_subscription_id(subscription_id, patch)
            .await
            .map_err(|e| {
                tracing::error!(
                    stripe_subscription_id = %subscription_id,
                    error = %e,
                    "Failed to patch subscription"
                );
                WebhookError::from(e)
            })?;

        match rows {
            Some(0) => tracing::info!(
                stripe_subscription_id = %subscription_id,
                rows = 0,
                "No subscription row matched; nothing to patch"
            ),
            _ => tracing::info!(
                stripe_subscription_id = %subscription_id,
                rows = ?rows,
                status = %patch.status(),
                "Subscription row patched"
            ),
        }

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemorySubscriptionStore;
    use crate::domain::billing::SubscriptionStatus;
    use crate::ports::StoreError;

    fn record(status: SubscriptionStatus) -> SubscriptionRecord {
        SubscriptionRecord {
            user_id: "user-1".to_string(),
            stripe_customer_id: Some("cus_1".to_string()),
            stripe_subscription_id: "sub_1".to_string(),
            stripe_price_id: Some("price_pro".to_string()),
            subscription_tier: Some("pro".to_string()),
            status,
            trial_end: None,
            current_period_start: None,
            current_period_end: None,
            cancel_at_period_end: false,
        }
    }

    #[tokio::test]
    async fn create_writes_row() {
        let store = InMemorySubscriptionStore::new();
        let reconciler = SubscriptionReconciler::new(Arc::new(store.clone()));

        reconciler.create(&record(SubscriptionStatus::Active)).await.unwrap();

        assert_eq!(store.all().await, vec![record(SubscriptionStatus::Active)]);
    }

    #[tokio::test]
    async fn patch_without_row_is_success_with_zero_rows() {
        let store = InMemorySubscriptionStore::new();
        let reconciler = SubscriptionReconciler::new(Arc::new(store.clone()));

        let rows = reconciler
            .patch("sub_1", &SubscriptionPatch::status_only(SubscriptionStatus::Canceled))
            .await
            .unwrap();

        assert_eq!(rows, Some(0));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn store_failure_becomes_storage_error() {
        let store = InMemorySubscriptionStore::new();
        store
            .set_failure(Some(StoreError::Status {
                status: 500,
                body: "boom".to_string(),
            }))
            .await;
        let reconciler = SubscriptionReconciler::new(Arc::new(store));

        let result = reconciler.create(&record(SubscriptionStatus::Active)).await;

        assert!(matches!(result, Err(WebhookError::Storage(_))));
    }
}
