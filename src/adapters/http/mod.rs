//! HTTP adapters - REST API implementations.

pub mod billing;
mod router;
mod shutdown;

pub use billing::WebhookAppState;
pub use router::app_router;
pub use shutdown::{shutdown_signal, ShutdownSignal};
