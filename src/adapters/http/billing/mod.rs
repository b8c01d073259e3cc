//! HTTP adapter for Stripe billing webhooks.

mod dto;
mod handlers;
mod routes;

pub use dto::{ErrorResponse, HealthResponse, WebhookReceivedResponse};
pub use handlers::{WebhookApiError, WebhookAppState, STRIPE_SIGNATURE_HEADER};
pub use routes::{billing_router, webhook_routes};
