//! HTTP handlers for the Stripe webhook endpoint.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};

use super::dto::{ErrorResponse, HealthResponse, WebhookReceivedResponse};
use crate::application::handlers::billing::{HandleStripeWebhookCommand, HandleStripeWebhookHandler};
use crate::domain::billing::WebhookError;

/// Header Stripe signs deliveries with.
pub const STRIPE_SIGNATURE_HEADER: &str = "stripe-signature";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for webhook handlers.
#[derive(Clone)]
pub struct WebhookAppState {
    pub webhook_handler: Arc<HandleStripeWebhookHandler>,
}

impl WebhookAppState {
    pub fn new(webhook_handler: HandleStripeWebhookHandler) -> Self {
        Self {
            webhook_handler: Arc::new(webhook_handler),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/webhooks/stripe - Handle Stripe webhook events
///
/// The body is taken as raw bytes: the signature covers the exact byte
/// sequence, so it must not be re-serialized before verification.
pub async fn handle_stripe_webhook(
    State(state): State<WebhookAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, WebhookApiError> {
    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let cmd = HandleStripeWebhookCommand {
        payload: body.to_vec(),
        signature,
    };

    state.webhook_handler.handle(cmd).await?;

    Ok((StatusCode::OK, Json(WebhookReceivedResponse::received())))
}

/// GET /health - Liveness probe
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts webhook errors to HTTP responses.
#[derive(Debug)]
pub struct WebhookApiError(WebhookError);

impl From<WebhookError> for WebhookApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.0.status_code();
        (status, Json(ErrorResponse::new(self.0.to_string()))).into_response()
    }
}
