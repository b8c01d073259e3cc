//! Webhook error types for Stripe webhook handling.
//!
//! Defines all error conditions that can occur during webhook processing,
//! with HTTP status code mapping and retryability semantics.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors that occur during webhook processing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WebhookError {
    /// The `Stripe-Signature` header is absent or empty.
    #[error("Missing Stripe-Signature header")]
    MissingSignature,

    /// The `Stripe-Signature` header could not be parsed.
    #[error("Malformed Stripe-Signature header: {0}")]
    MalformedSignature(String),

    /// No `v1` signature matched the payload.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Signature timestamp is outside the accepted tolerance window.
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Verified payload is not a valid event envelope.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Stripe API call failed.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Subscription table write failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Handler is misconfigured (e.g. unusable secret).
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl WebhookError {
    /// Returns true if Stripe redelivering the event could succeed.
    ///
    /// Only failures of our collaborators qualify. A bad signature or
    /// payload will be exactly as bad on the next attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WebhookError::Upstream(_) | WebhookError::Storage(_))
    }

    /// Returns true for failures that reject the request before any processing.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            WebhookError::MissingSignature
                | WebhookError::MalformedSignature(_)
                | WebhookError::InvalidSignature
                | WebhookError::TimestampOutOfRange
        )
    }

    /// Maps the error to an appropriate HTTP status code.
    ///
    /// Status codes determine Stripe's retry behavior:
    /// - 2xx: Event acknowledged, no retry
    /// - 4xx: Client error, no retry
    /// - 5xx: Server error, will retry
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::MissingSignature
            | WebhookError::MalformedSignature(_)
            | WebhookError::InvalidSignature
            | WebhookError::TimestampOutOfRange
            | WebhookError::ParseError(_) => StatusCode::BAD_REQUEST,

            WebhookError::Upstream(_)
            | WebhookError::Storage(_)
            | WebhookError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
