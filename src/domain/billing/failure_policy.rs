//! What to answer Stripe when processing a verified event fails.

use serde::Deserialize;

use super::WebhookError;

/// Response policy for failed collaborator calls during webhook processing.
///
/// Stripe redelivers any event that does not get a 2xx answer, for up to
/// three days. `Acknowledge` trades lost updates for a quiet retry queue;
/// `Retry` hands recovery to Stripe's redelivery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Log the failure and answer 200.
    #[default]
    Acknowledge,

    /// Answer 500 so Stripe redelivers.
    Retry,
}

impl FailurePolicy {
    /// Returns true if the error should be swallowed and the event acknowledged.
    ///
    /// Only retryable errors are ever swallowed: authentication and
    /// configuration failures keep their own status codes under both policies.
    pub fn acknowledges(&self, error: &WebhookError) -> bool {
        matches!(self, FailurePolicy::Acknowledge) && error.is_retryable()
    }
}
