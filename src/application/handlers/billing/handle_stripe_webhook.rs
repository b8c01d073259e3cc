//! HandleStripeWebhookHandler - Command handler for Stripe webhook deliveries.

use tracing::Instrument;

use super::dispatcher::{DispatchOutcome, WebhookDispatcher};
use crate::domain::billing::{FailurePolicy, StripeWebhookVerifier, WebhookError};

/// Command to handle a Stripe webhook.
#[derive(Debug, Clone)]
pub struct HandleStripeWebhookCommand {
    /// Raw request body, exactly as received.
    pub payload: Vec<u8>,
    /// `Stripe-Signature` header, if present.
    pub signature: Option<String>,
}

/// Result of webhook processing. Every variant is acknowledged with 200.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleStripeWebhookResult {
    /// The event was dispatched.
    Processed(DispatchOutcome),
    /// Processing failed but the failure policy acknowledges it.
    FailureAcknowledged(WebhookError),
}

/// Handler for processing Stripe webhooks.
///
/// Verifies the signature, parses the event, dispatches it and applies the
/// failure policy to collaborator errors.
pub struct HandleStripeWebhookHandler {
    verifier: StripeWebhookVerifier,
    dispatcher: WebhookDispatcher,
    failure_policy: FailurePolicy,
}

impl HandleStripeWebhookHandler {
    pub fn new(
        verifier: StripeWebhookVerifier,
        dispatcher: WebhookDispatcher,
        failure_policy: FailurePolicy,
    ) -> Self {
        Self {
            verifier,
            dispatcher,
            failure_policy,
        }
    }

    /// # Errors
    ///
    /// - Authentication and parse failures, always
    /// - `Upstream` / `Storage` when the failure policy is `Retry`
    /// - `Configuration` if the verifier cannot compute a signature
    pub async fn handle(
        &self,
        cmd: HandleStripeWebhookCommand,
    ) -> Result<HandleStripeWebhookResult, WebhookError> {
        // 1. Verify signature, then parse. Nothing is read from an unverified body.
        let event = self
            .verifier
            .verify_and_parse(&cmd.payload, cmd.signature.as_deref())
            .map_err(|e| {
                if e.is_authentication_failure() {
                    tracing::warn!(error = %e, "Rejected unauthenticated Stripe webhook");
                } else {
                    tracing::warn!(error = %e, "Rejected unparseable Stripe webhook");
                }
                e
            })?;

        let span = tracing::info_span!(
            "stripe_webhook",
            event_id = %event.id,
            event_type = %event.event_type,
            livemode = event.is_live(),
        );

        // 2. Dispatch and apply the failure policy
        async {
            match self.dispatcher.dispatch(&event).await {
                Ok(outcome) => {
                    tracing::debug!(outcome = ?outcome, "Webhook processed");
                    Ok(HandleStripeWebhookResult::Processed(outcome))
                }
                Err(e) if self.failure_policy.acknowledges(&e) => {
                    tracing::error!(
                        error = %e,
                        "Webhook processing failed; acknowledging per failure policy"
                    );
                    Ok(HandleStripeWebhookResult::FailureAcknowledged(e))
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        retryable = e.is_retryable(),
                        "Webhook processing failed"
                    );
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }
}
