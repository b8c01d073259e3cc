//! Top-level router with shared middleware.

use std::time::Duration;

use axum::Router;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use super::billing::{billing_router, WebhookAppState};

/// Build the service router.
///
/// Every request gets a `tower-http` trace span and is cut off with
/// `408 Request Timeout` after `request_timeout`.
pub fn app_router(state: WebhookAppState, request_timeout: Duration) -> Router {
    billing_router()
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
}
