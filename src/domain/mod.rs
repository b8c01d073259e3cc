//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (timestamps, errors, state machine)
//! - `billing` - Stripe webhooks and mirrored subscription state

pub mod billing;
pub mod foundation;
