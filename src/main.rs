//! subscription-sync binary.
//!
//! Loads configuration once, wires the Stripe and PostgREST adapters into
//! the webhook handler and serves the router until Ctrl-C or SIGTERM.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use subscription_sync::adapters::http::{app_router, shutdown_signal, WebhookAppState};
use subscription_sync::adapters::{PostgrestSubscriptionStore, StripeSubscriptionClient};
use subscription_sync::application::{
    HandleStripeWebhookHandler, SubscriptionReconciler, WebhookDispatcher,
};
use subscription_sync::config::AppConfig;
use subscription_sync::domain::billing::StripeWebhookVerifier;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;

    init_tracing(&config);

    config.validate().context("invalid configuration")?;
    tracing::info!(
        environment = ?config.server.environment,
        stripe_live_mode = config.payment.is_live_mode(),
        failure_policy = ?config.webhook.failure_policy,
        "Starting subscription-sync v{}",
        env!("CARGO_PKG_VERSION")
    );

    let provider = StripeSubscriptionClient::from_config(&config.payment)
        .context("failed to build Stripe client")?;
    let store = PostgrestSubscriptionStore::from_config(&config.storage)
        .context("failed to build storage client")?;

    let verifier = StripeWebhookVerifier::new(config.payment.stripe_webhook_secret.clone())
        .with_tolerance(config.webhook.signature_tolerance());
    let dispatcher = WebhookDispatcher::new(
        Arc::new(provider),
        SubscriptionReconciler::new(Arc::new(store)),
    );
    let handler =
        HandleStripeWebhookHandler::new(verifier, dispatcher, config.webhook.failure_policy);

    let app = app_router(
        WebhookAppState::new(handler),
        config.server.request_timeout(),
    );

    let addr = config.server.socket_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// `RUST_LOG` wins over `server.log_level`; production logs are JSON.
fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.server.log_level.clone().into());
    let json = config.is_production();

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .init();
}
