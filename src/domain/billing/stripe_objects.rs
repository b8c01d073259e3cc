//! Stripe API objects as they arrive in `data.object` or from the REST API.
//!
//! Only the fields reconciliation reads are modelled. Unknown fields are
//! ignored so newer API versions keep parsing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::SubscriptionStatus;

// ════════════════════════════════════════════════════════════════════════════════
// Checkout
// ════════════════════════════════════════════════════════════════════════════════

/// Stripe Checkout Session object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CheckoutSession {
    /// Unique session identifier (cs_...).
    pub id: String,

    /// Customer ID if customer was created/attached.
    #[serde(default)]
    pub customer: Option<String>,

    /// Subscription ID if checkout created a subscription.
    #[serde(default)]
    pub subscription: Option<String>,

    /// Custom metadata attached to the session at creation.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl CheckoutSession {
    /// Owning account, set by the portal when it created the session.
    pub fn user_id(&self) -> Option<&str> {
        self.metadata_value("user_id")
    }

    /// Tier label chosen at checkout (e.g. "pro").
    pub fn tier(&self) -> Option<&str> {
        self.metadata_value("tier")
    }

    fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Subscription
// ════════════════════════════════════════════════════════════════════════════════

/// Stripe Subscription object.
///
/// Used both for `customer.subscription.*` payloads and for the
/// `GET /v1/subscriptions/{id}` response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeSubscription {
    /// Unique subscription identifier (sub_...).
    pub id: String,

    /// Customer ID owning this subscription.
    #[serde(default)]
    pub customer: Option<String>,

    /// Subscription status.
    pub status: SubscriptionStatus,

    /// End of the trial (Unix timestamp).
    #[serde(default)]
    pub trial_end: Option<i64>,

    /// Current period start (Unix timestamp).
    #[serde(default)]
    pub current_period_start: Option<i64>,

    /// Current period end (Unix timestamp).
    #[serde(default)]
    pub current_period_end: Option<i64>,

    /// Whether subscription cancels at period end.
    #[serde(default)]
    pub cancel_at_period_end: bool,

    /// Subscription items (price/quantity pairs).
    #[serde(default)]
    pub items: StripeSubscriptionItems,
}

impl StripeSubscription {
    fn first_item(&self) -> Option<&StripeSubscriptionItem> {
        self.items.data.first()
    }

    /// Price of the first subscription item.
    pub fn price_id(&self) -> Option<&str> {
        self.first_item().map(|item| item.price.id.as_str())
    }

    /// Period start, falling back to the first item.
    ///
    /// API versions from 2025 on report billing periods per item only.
    pub fn period_start(&self) -> Option<i64> {
        self.current_period_start
            .or_else(|| self.first_item().and_then(|item| item.current_period_start))
    }

    /// Period end, falling back to the first item.
    pub fn period_end(&self) -> Option<i64> {
        self.current_period_end
            .or_else(|| self.first_item().and_then(|item| item.current_period_end))
    }
}

/// Subscription items container.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StripeSubscriptionItems {
    /// List of subscription items.
    #[serde(default)]
    pub data: Vec<StripeSubscriptionItem>,
}

/// Single subscription item.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeSubscriptionItem {
    /// Price object.
    pub price: StripePrice,

    #[serde(default)]
    pub current_period_start: Option<i64>,

    #[serde(default)]
    pub current_period_end: Option<i64>,
}

/// Stripe Price object (only the identifier is needed).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripePrice {
    /// Unique price identifier (price_...).
    pub id: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Invoice
// ════════════════════════════════════════════════════════════════════════════════

/// Stripe Invoice object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Invoice {
    #[serde(default)]
    pub id: Option<String>,

    /// Subscription reference. Null for one-off invoices, an object when expanded.
    #[serde(default)]
    pub subscription: Option<serde_json::Value>,

    /// Newer API versions move the reference under `parent`.
    #[serde(default)]
    pub parent: Option<InvoiceParent>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InvoiceParent {
    #[serde(default)]
    pub subscription_details: Option<InvoiceSubscriptionDetails>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InvoiceSubscriptionDetails {
    #[serde(default)]
    pub subscription: Option<String>,
}

impl Invoice {
    /// Subscription this invoice bills, if it is a non-empty string id.
    pub fn subscription_id(&self) -> Option<&str> {
        let top_level = self.subscription.as_ref().and_then(|v| v.as_str());
        let nested = || {
            self.parent
                .as_ref()
                .and_then(|p| p.subscription_details.as_ref())
                .and_then(|d| d.subscription.as_deref())
        };

        top_level.or_else(nested).filter(|id| !id.is_empty())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// References
// ════════════════════════════════════════════════════════════════════════════════

/// Any Stripe object reduced to its identifier.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObjectRef {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ══════════════════════════════════════════════════════════════
    // Checkout Session Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn checkout_session_reads_metadata() {
        let session: CheckoutSession = serde_json::from_value(json!({
            "id": "cs_test_123",
            "object": "checkout.session",
            "customer": "cus_123",
            "subscription": "sub_123",
            "mode": "subscription",
            "metadata": {"user_id": "user-1", "tier": "pro"}
        }))
        .unwrap();

        assert_eq!(session.user_id(), Some("user-1"));
        assert_eq!(session.tier(), Some("pro"));
        assert_eq!(session.subscription.as_deref(), Some("sub_123"));
    }

    #[test]
    fn checkout_session_blank_metadata_is_absent() {
        let session: CheckoutSession = serde_json::from_value(json!({
            "id": "cs_test_123",
            "customer": null,
            "subscription": null,
            "metadata": {"user_id": "  "}
        }))
        .unwrap();

        assert!(session.user_id().is_none());
        assert!(session.tier().is_none());
        assert!(session.subscription.is_none());
    }

    // ══════════════════════════════════════════════════════════════
    // Subscription Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn subscription_reads_top_level_period() {
        let sub: StripeSubscription = serde_json::from_value(json!({
            "id": "sub_123",
            "customer": "cus_123",
            "status": "trialing",
            "trial_end": 1700600000,
            "current_period_start": 1700000000,
            "current_period_end": 1702592000,
            "cancel_at_period_end": false,
            "items": {"object": "list", "data": [{"id": "si_1", "price": {"id": "price_pro"}}]}
        }))
        .unwrap();

        assert_eq!(sub.status, SubscriptionStatus::Trialing);
        assert_eq!(sub.price_id(), Some("price_pro"));
        assert_eq!(sub.period_start(), Some(1700000000));
        assert_eq!(sub.period_end(), Some(1702592000));
    }

    #[test]
    fn subscription_falls_back_to_item_period() {
        let sub: StripeSubscription = serde_json::from_value(json!({
            "id": "sub_123",
            "status": "active",
            "items": {"data": [{
                "price": {"id": "price_pro"},
                "current_period_start": 1700000000,
                "current_period_end": 1702592000
            }]}
        }))
        .unwrap();

        assert_eq!(sub.period_start(), Some(1700000000));
        assert_eq!(sub.period_end(), Some(1702592000));
        assert!(sub.customer.is_none());
    }

    #[test]
    fn subscription_without_items_has_no_price() {
        let sub: StripeSubscription =
            serde_json::from_value(json!({"id": "sub_123", "status": "active"})).unwrap();

        assert!(sub.price_id().is_none());
        assert!(sub.period_end().is_none());
        assert!(!sub.cancel_at_period_end);
    }

    // ══════════════════════════════════════════════════════════════
    // Invoice Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn invoice_reads_subscription_string() {
        let invoice: Invoice =
            serde_json::from_value(json!({"id": "in_1", "subscription": "sub_123"})).unwrap();

        assert_eq!(invoice.subscription_id(), Some("sub_123"));
    }

    #[test]
    fn invoice_with_null_subscription_has_none() {
        let invoice: Invoice =
            serde_json::from_value(json!({"id": "in_1", "subscription": null})).unwrap();

        assert!(invoice.subscription_id().is_none());
    }

    #[test]
    fn invoice_with_expanded_subscription_object_has_none() {
        let invoice: Invoice =
            serde_json::from_value(json!({"subscription": {"id": "sub_123"}})).unwrap();

        assert!(invoice.subscription_id().is_none());
    }

    #[test]
    fn invoice_reads_parent_subscription_details() {
        let invoice: Invoice = serde_json::from_value(json!({
            "id": "in_1",
            "parent": {"type": "subscription_details", "subscription_details": {"subscription": "sub_456"}}
        }))
        .unwrap();

        assert_eq!(invoice.subscription_id(), Some("sub_456"));
    }
}
