//! In-memory subscription store.
//!
//! Behaves like the PostgREST table: upsert keyed on
//! `stripe_subscription_id`, patches that report the affected-row count.
//! Useful for testing and local development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::billing::{SubscriptionPatch, SubscriptionRecord};
use crate::ports::{StoreError, SubscriptionStore};

/// In-memory storage for subscription rows
#[derive(Debug, Clone, Default)]
pub struct InMemorySubscriptionStore {
    rows: Arc<RwLock<HashMap<String, SubscriptionRecord>>>,
    write_count: Arc<RwLock<usize>>,
    failure: Arc<RwLock<Option<StoreError>>>,
}

impl InMemorySubscriptionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with rows
    pub async fn with_records(records: impl IntoIterator<Item = SubscriptionRecord>) -> Self {
        let store = Self::new();
        {
            let mut rows = store.rows.write().await;
            for record in records {
                rows.insert(record.stripe_subscription_id.clone(), record);
            }
        }
        store
    }

    /// Make every subsequent write fail with `error` (`None` to recover)
    pub async fn set_failure(&self, error: Option<StoreError>) {
        *self.failure.write().await = error;
    }

    /// Number of stored rows
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    /// Number of write requests accepted (upserts and patches, matched or not)
    pub async fn write_count(&self) -> usize {
        *self.write_count.read().await
    }

    /// Snapshot of all rows
    pub async fn all(&self) -> Vec<SubscriptionRecord> {
        self.rows.read().await.values().cloned().collect()
    }

    async fn begin_write(&self) -> Result<(), StoreError> {
        if let Some(error) = self.failure.read().await.clone() {
            return Err(error);
        }
        *self.write_count.write().await += 1;
        Ok(())
    }
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptionStore {
    async fn upsert(&self, record: &SubscriptionRecord) -> Result<(), StoreError> {
        self.begin_write().await?;
        let mut rows = self.rows.write().await;
        rows.insert(record.stripe_subscription_id.clone(), record.clone());
        Ok(())
    }

    async fn patch_by_subscription_id(
        &self,
        subscription_id: &str,
        patch: &SubscriptionPatch,
    ) -> Result<Option<u64>, StoreError> {
        self.begin_write().await?;
        let mut rows = self.rows.write().await;
        match rows.get_mut(subscription_id) {
            Some(row) => {
                row.apply(patch);
                Ok(Some(1))
            }
            None => Ok(Some(0)),
        }
    }

    async fn find_by_subscription_id(
        &self,
        subscription_id: &str,
    ) -> Result<Option<SubscriptionRecord>, StoreError> {
        Ok(self.rows.read().await.get(subscription_id).cloned())
    }
}
